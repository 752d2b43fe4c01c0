//! A module consists of the LALR(1) item-set and syntax-table data model.
//!
//! An item addresses one position inside one production body; an item set
//! maps items to their lookahead symbols, remembers which items are kernel
//! items, and owns exactly one syntax-table entry. Entries record one
//! [Action] per terminal lookahead plus a goto target per non-terminal.
//! Before merging, entries and item sets correspond one to one; after
//! merging several item sets may share one surviving entry.

use crate::index::{
    HandlerId, NextWordToShiftIndex, ProductionBodyId, ProductionNodeId, SyntaxAnalysisTableEntryId,
};
use std::collections::{HashMap, HashSet};

/// One LR(1) item: a production body position of the form `A -> α · β`.
pub type ProductionItem = (ProductionNodeId, ProductionBodyId, NextWordToShiftIndex);

/// Lookahead symbols of one item.
pub type ForwardNodesContainer = HashSet<ProductionNodeId>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Data required to perform one reduction.
///
/// The persisted artifact stores the body length; the full body is kept in
/// memory so diagnostics and drivers working off the in-memory table can
/// align popped values with the production shape when nullable non-terminals
/// were reduced from nothing.
pub struct ReduceAttachedData {
    pub handler_id: HandlerId,
    pub body: Vec<ProductionNodeId>,
    pub reduced_node_id: ProductionNodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Response of one syntax-table entry to one terminal lookahead.
pub enum Action {
    Shift {
        target: SyntaxAnalysisTableEntryId,
    },
    Reduce(ReduceAttachedData),
    Accept,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One row of the syntax analysis table.
pub struct SyntaxAnalysisTableEntry {
    actions: HashMap<ProductionNodeId, Action>,
    gotos: HashMap<ProductionNodeId, SyntaxAnalysisTableEntryId>,
}

static ERROR_ACTION: Action = Action::Error;

impl SyntaxAnalysisTableEntry {
    /// Action under a terminal (or operator, or end) lookahead. A missing
    /// record is the error response.
    pub fn action(&self, word_node_id: ProductionNodeId) -> &Action {
        self.actions.get(&word_node_id).unwrap_or(&ERROR_ACTION)
    }

    pub fn recorded_action(&self, word_node_id: ProductionNodeId) -> Option<&Action> {
        self.actions.get(&word_node_id)
    }

    pub fn set_action(&mut self, word_node_id: ProductionNodeId, action: Action) {
        self.actions.insert(word_node_id, action);
    }

    pub fn actions(&self) -> &HashMap<ProductionNodeId, Action> {
        &self.actions
    }

    /// Target entry after reducing to the given non-terminal.
    pub fn goto(&self, nonterminal_node_id: ProductionNodeId) -> Option<SyntaxAnalysisTableEntryId> {
        self.gotos.get(&nonterminal_node_id).copied()
    }

    pub fn set_goto(
        &mut self,
        nonterminal_node_id: ProductionNodeId,
        target: SyntaxAnalysisTableEntryId,
    ) {
        self.gotos.insert(nonterminal_node_id, target);
    }

    pub fn gotos(&self) -> &HashMap<ProductionNodeId, SyntaxAnalysisTableEntryId> {
        &self.gotos
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.gotos.clear();
    }

    /// Rewrite every shift and goto target after table rows moved.
    ///
    /// `old_to_new` holds a record for every surviving and merged row.
    pub fn remap_entry_ids(
        &mut self,
        old_to_new: &HashMap<SyntaxAnalysisTableEntryId, SyntaxAnalysisTableEntryId>,
    ) {
        for action in self.actions.values_mut() {
            if let Action::Shift { target } = action {
                *target = old_to_new[target];
            }
        }
        for target in self.gotos.values_mut() {
            *target = old_to_new[target];
        }
    }
}

#[derive(Debug)]
/// One LALR(1) item set.
pub struct ProductionItemSet {
    items_and_forward_nodes: HashMap<ProductionItem, ForwardNodesContainer>,
    main_items: HashSet<ProductionItem>,
    closure_available: bool,
    entry_id: SyntaxAnalysisTableEntryId,
}

impl ProductionItemSet {
    pub fn new(entry_id: SyntaxAnalysisTableEntryId) -> Self {
        Self {
            items_and_forward_nodes: HashMap::new(),
            main_items: HashSet::new(),
            closure_available: false,
            entry_id,
        }
    }

    pub fn entry_id(&self) -> SyntaxAnalysisTableEntryId {
        self.entry_id
    }

    pub fn set_entry_id(&mut self, entry_id: SyntaxAnalysisTableEntryId) {
        self.entry_id = entry_id;
    }

    pub fn is_closure_available(&self) -> bool {
        self.closure_available
    }

    pub fn set_closure_available(&mut self) {
        self.closure_available = true;
    }

    pub fn items_and_forward_nodes(&self) -> &HashMap<ProductionItem, ForwardNodesContainer> {
        &self.items_and_forward_nodes
    }

    pub fn main_items(&self) -> &HashSet<ProductionItem> {
        &self.main_items
    }

    pub fn forward_nodes(&self, item: &ProductionItem) -> &ForwardNodesContainer {
        &self.items_and_forward_nodes[item]
    }

    /// Add an item with lookahead symbols, or extend the lookaheads of an
    /// existing item. Returns whether a new item was inserted and whether
    /// anything changed; any change invalidates the closure.
    pub fn add_item_and_forward_nodes(
        &mut self,
        item: ProductionItem,
        forward_node_ids: impl IntoIterator<Item = ProductionNodeId>,
    ) -> (bool, bool) {
        let inserted = !self.items_and_forward_nodes.contains_key(&item);
        let lookaheads = self
            .items_and_forward_nodes
            .entry(item)
            .or_insert_with(HashSet::new);
        let mut changed = inserted;
        for forward_node_id in forward_node_ids {
            changed |= lookaheads.insert(forward_node_id);
        }
        if changed {
            self.closure_available = false;
        }
        (inserted, changed)
    }

    /// Add a kernel item. Kernel items survive closure recomputation.
    ///
    /// Returns whether the item is newly a kernel item here and whether the
    /// item or its lookaheads changed.
    pub fn add_main_item_and_forward_nodes(
        &mut self,
        item: ProductionItem,
        forward_node_ids: impl IntoIterator<Item = ProductionNodeId>,
    ) -> (bool, bool) {
        let (_, changed) = self.add_item_and_forward_nodes(item, forward_node_ids);
        let newly_main = self.main_items.insert(item);
        (newly_main, changed)
    }

    /// Drop every non-kernel item before the closure is recomputed.
    pub fn clear_non_main_items(&mut self) {
        let main_items = &self.main_items;
        self.items_and_forward_nodes
            .retain(|item, _| main_items.contains(item));
    }
}
