//! LALR(1) item-set construction.
//!
//! The engine keeps one item set per syntax-table entry. Recomputing the
//! closure of a set clears its non-kernel items and its table entry, expands
//! non-terminal dot positions with first()-derived lookaheads, and writes
//! the Reduce (or Accept) responses of its final items. Spreading then
//! groups the set's items by their next symbol, routes every group into the
//! successor set owning those kernel items, and records the Shift or goto
//! response. Kernel additions invalidate the successor's closure, so the
//! construction loops until every set's closure is valid again; lookahead
//! sets only grow, which bounds the loop.

use super::SyntaxGenerator;
use crate::index::{
    NextWordToShiftIndex, ProductionBodyId, ProductionItemSetId, ProductionNodeId,
    SyntaxAnalysisTableEntryId,
};
use crate::production::{OperatorAssociativity, ProductionNode};
use crate::syntax::{
    Action, ForwardNodesContainer, ProductionItem, ProductionItemSet, ReduceAttachedData,
    SyntaxAnalysisTableEntry,
};
use crate::util::{advisory, fatal};
use std::collections::{BTreeMap, HashSet, VecDeque};

impl SyntaxGenerator {
    pub(crate) fn syntax_analysis_table_construct(&mut self) {
        let root_item_set_id = self.emplace_production_item_set();
        let root_item: ProductionItem = (
            self.inner_root_node_id(),
            ProductionBodyId::new(0),
            NextWordToShiftIndex::origin(),
        );
        let end_node_id = self.end_node_id();
        self.add_main_item_and_forward_nodes(root_item_set_id, root_item, [end_node_id]);
        self.root_entry_id = self.production_item_sets[root_item_set_id.to_usize()].entry_id();
        loop {
            let Some(item_set_id) = self
                .production_item_sets
                .iter()
                .position(|item_set| !item_set.is_closure_available())
                .map(ProductionItemSetId::new)
            else {
                break;
            };
            self.spread_lookahead_and_construct_entry(item_set_id);
        }
    }

    fn emplace_production_item_set(&mut self) -> ProductionItemSetId {
        let entry_id = SyntaxAnalysisTableEntryId::new(self.syntax_analysis_table.len());
        self.syntax_analysis_table
            .push(SyntaxAnalysisTableEntry::default());
        let item_set_id = ProductionItemSetId::new(self.production_item_sets.len());
        self.production_item_sets
            .push(ProductionItemSet::new(entry_id));
        self.entry_id_to_item_set_id.insert(entry_id, item_set_id);
        item_set_id
    }

    /// Add a kernel item, tracking which sets own the item as kernel so
    /// successor sets can be found by their kernel signature.
    fn add_main_item_and_forward_nodes(
        &mut self,
        item_set_id: ProductionItemSetId,
        item: ProductionItem,
        forward_node_ids: impl IntoIterator<Item = ProductionNodeId>,
    ) {
        let (inserted, _) = self.production_item_sets[item_set_id.to_usize()]
            .add_main_item_and_forward_nodes(item, forward_node_ids);
        if inserted {
            let owners = self.item_to_main_item_sets.entry(item).or_insert_with(Vec::new);
            if !owners.contains(&item_set_id) {
                owners.push(item_set_id);
            }
        }
    }

    /// Recompute the closure of `item_set_id` unless it is still valid.
    ///
    /// Returns whether the closure was recomputed.
    pub(crate) fn production_item_set_closure(&mut self, item_set_id: ProductionItemSetId) -> bool {
        if self.production_item_sets[item_set_id.to_usize()].is_closure_available() {
            return false;
        }
        let entry_id = {
            let item_set = &mut self.production_item_sets[item_set_id.to_usize()];
            item_set.clear_non_main_items();
            item_set.entry_id()
        };
        self.syntax_analysis_table[entry_id.to_usize()].clear();
        let mut items_waiting_process: VecDeque<ProductionItem> = self.production_item_sets
            [item_set_id.to_usize()]
        .items_and_forward_nodes()
        .keys()
        .copied()
        .collect();
        while let Some(item_now) = items_waiting_process.pop_front() {
            let (production_node_id, production_body_id, next_word_to_shift_index) = item_now;
            let forward_nodes: ForwardNodesContainer = self.production_item_sets
                [item_set_id.to_usize()]
            .forward_nodes(&item_now)
            .clone();
            let next_production_node_id = self.production_node_id_in_body(
                production_node_id,
                production_body_id,
                next_word_to_shift_index,
            );
            if !next_production_node_id.is_valid() {
                self.set_reduce_actions(
                    entry_id,
                    production_node_id,
                    production_body_id,
                    &forward_nodes,
                );
                continue;
            }
            let ProductionNode::NonTerminal(next_node) =
                self.production_node(next_production_node_id)
            else {
                continue;
            };
            let body_ids: Vec<ProductionBodyId> = next_node.body_ids().collect();
            let next_may_empty_reduct = next_node.may_empty_reduct();
            let spread_forward_nodes = self.first(
                production_node_id,
                production_body_id,
                next_word_to_shift_index + 1,
                &forward_nodes,
            );
            for body_id in body_ids {
                let expanded_item: ProductionItem = (
                    next_production_node_id,
                    body_id,
                    NextWordToShiftIndex::origin(),
                );
                let (_, changed) = self.production_item_sets[item_set_id.to_usize()]
                    .add_item_and_forward_nodes(
                        expanded_item,
                        spread_forward_nodes.iter().copied(),
                    );
                if changed {
                    items_waiting_process.push_back(expanded_item);
                }
            }
            if next_may_empty_reduct {
                // The nullable non-terminal may match nothing; continue the
                // body behind it under the unchanged lookaheads.
                let skipped_item: ProductionItem = (
                    production_node_id,
                    production_body_id,
                    next_word_to_shift_index + 1,
                );
                let (_, changed) = self.production_item_sets[item_set_id.to_usize()]
                    .add_item_and_forward_nodes(skipped_item, forward_nodes.iter().copied());
                if changed {
                    items_waiting_process.push_back(skipped_item);
                }
            }
        }
        self.production_item_sets[item_set_id.to_usize()].set_closure_available();
        self.log_item_set(item_set_id);
        true
    }

    /// first(β, L): terminals able to begin a string derived from the body
    /// suffix starting at `next_word_to_shift_index`, extended by
    /// `next_node_ids` when the whole suffix is nullable.
    pub(crate) fn first(
        &self,
        production_node_id: ProductionNodeId,
        production_body_id: ProductionBodyId,
        next_word_to_shift_index: NextWordToShiftIndex,
        next_node_ids: &ForwardNodesContainer,
    ) -> ForwardNodesContainer {
        let mut result = ForwardNodesContainer::new();
        let mut index = next_word_to_shift_index;
        loop {
            let symbol_id =
                self.production_node_id_in_body(production_node_id, production_body_id, index);
            if !symbol_id.is_valid() {
                result.extend(next_node_ids.iter().copied());
                break;
            }
            match self.production_node(symbol_id) {
                ProductionNode::NonTerminal(node) => {
                    let mut processed_nodes = HashSet::new();
                    self.non_terminal_node_first_nodes(symbol_id, &mut result, &mut processed_nodes);
                    if node.may_empty_reduct() {
                        index = index + 1;
                    } else {
                        break;
                    }
                }
                _ => {
                    result.insert(symbol_id);
                    break;
                }
            }
        }
        result
    }

    /// Terminals able to begin any body of the given non-terminal.
    fn non_terminal_node_first_nodes(
        &self,
        production_node_id: ProductionNodeId,
        result: &mut ForwardNodesContainer,
        processed_nodes: &mut HashSet<ProductionNodeId>,
    ) {
        if !processed_nodes.insert(production_node_id) {
            return;
        }
        let node = self.production_node(production_node_id).as_non_terminal();
        for body in node.bodies() {
            for &symbol_id in &body.symbols {
                match self.production_node(symbol_id) {
                    ProductionNode::NonTerminal(inner) => {
                        self.non_terminal_node_first_nodes(symbol_id, result, processed_nodes);
                        if inner.may_empty_reduct() {
                            continue;
                        }
                        break;
                    }
                    _ => {
                        result.insert(symbol_id);
                        break;
                    }
                }
            }
        }
    }

    /// Write the Reduce (or Accept) response of a final item under each of
    /// its lookahead symbols.
    fn set_reduce_actions(
        &mut self,
        entry_id: SyntaxAnalysisTableEntryId,
        production_node_id: ProductionNodeId,
        production_body_id: ProductionBodyId,
        forward_nodes: &ForwardNodesContainer,
    ) {
        if production_node_id == self.inner_root_node_id() {
            let end_node_id = self.end_node_id();
            debug_assert!(forward_nodes.contains(&end_node_id));
            self.syntax_analysis_table[entry_id.to_usize()]
                .set_action(end_node_id, Action::Accept);
            return;
        }
        let body = self
            .production_node(production_node_id)
            .as_non_terminal()
            .body(production_body_id);
        let reduce_attached_data = ReduceAttachedData {
            handler_id: body.handler_id,
            body: body.symbols.clone(),
            reduced_node_id: production_node_id,
        };
        let mut lookaheads: Vec<ProductionNodeId> = forward_nodes.iter().copied().collect();
        lookaheads.sort();
        for lookahead in lookaheads {
            self.set_terminal_reduce_action(entry_id, lookahead, reduce_attached_data.clone());
        }
    }

    fn set_terminal_reduce_action(
        &mut self,
        entry_id: SyntaxAnalysisTableEntryId,
        lookahead: ProductionNodeId,
        reduce_attached_data: ReduceAttachedData,
    ) {
        let existing = self.syntax_analysis_table[entry_id.to_usize()]
            .recorded_action(lookahead)
            .cloned();
        match existing {
            None | Some(Action::Error) => {
                self.syntax_analysis_table[entry_id.to_usize()]
                    .set_action(lookahead, Action::Reduce(reduce_attached_data));
            }
            Some(Action::Reduce(existing_reduce)) => {
                if existing_reduce != reduce_attached_data {
                    fatal(format!(
                        "reduce/reduce conflict under lookahead {}:\n{}\n{}",
                        self.node_symbol_string(lookahead),
                        self.format_reduce_production(&existing_reduce),
                        self.format_reduce_production(&reduce_attached_data),
                    ));
                }
            }
            Some(Action::Shift { .. }) => {
                match self.resolve_shift_reduce(lookahead, &reduce_attached_data.body) {
                    Some(true) => {
                        self.syntax_analysis_table[entry_id.to_usize()]
                            .set_action(lookahead, Action::Reduce(reduce_attached_data));
                    }
                    Some(false) => {}
                    None => {
                        self.log_unresolved_conflict(lookahead, &reduce_attached_data);
                    }
                }
            }
            Some(Action::Accept) => {
                fatal(format!(
                    "reduction of {} conflicts with accepting the input",
                    self.format_reduce_production(&reduce_attached_data)
                ));
            }
        }
    }

    fn set_shift_action(
        &mut self,
        entry_id: SyntaxAnalysisTableEntryId,
        word_node_id: ProductionNodeId,
        target: SyntaxAnalysisTableEntryId,
    ) {
        let existing = self.syntax_analysis_table[entry_id.to_usize()]
            .recorded_action(word_node_id)
            .cloned();
        match existing {
            None | Some(Action::Error) => {
                self.syntax_analysis_table[entry_id.to_usize()]
                    .set_action(word_node_id, Action::Shift { target });
            }
            Some(Action::Shift { target: existing_target }) => {
                assert_eq!(existing_target, target, "one symbol cannot shift to two entries");
            }
            Some(Action::Reduce(reduce_attached_data)) => {
                match self.resolve_shift_reduce(word_node_id, &reduce_attached_data.body) {
                    Some(true) => {}
                    Some(false) => {
                        self.syntax_analysis_table[entry_id.to_usize()]
                            .set_action(word_node_id, Action::Shift { target });
                    }
                    None => {
                        self.log_unresolved_conflict(word_node_id, &reduce_attached_data);
                        self.syntax_analysis_table[entry_id.to_usize()]
                            .set_action(word_node_id, Action::Shift { target });
                    }
                }
            }
            Some(Action::Accept) => unreachable!("the end sentinel is never shifted"),
        }
    }

    /// Operator-based shift/reduce resolution.
    ///
    /// `Some(true)` prefers the reduction, `Some(false)` the shift; [None]
    /// when the operator rule does not apply, in which case the caller
    /// shifts and reports an advisory.
    fn resolve_shift_reduce(
        &self,
        lookahead: ProductionNodeId,
        reduce_body: &[ProductionNodeId],
    ) -> Option<bool> {
        let incoming_role = self.production_node(lookahead).as_operator()?.preferred_role();
        let (last_word_position, last_word_id) = reduce_body
            .iter()
            .copied()
            .enumerate()
            .rev()
            .find(|&(_, symbol_id)| self.production_node(symbol_id).is_word())?;
        let reducing_operator = self.production_node(last_word_id).as_operator()?;
        // An operator opening its body is in prefix position, so its unary
        // role binds the reduction.
        let reducing_role = if last_word_position == 0 {
            reducing_operator
                .unary
                .unwrap_or_else(|| reducing_operator.preferred_role())
        } else {
            reducing_operator.preferred_role()
        };
        if incoming_role.priority < reducing_role.priority {
            Some(true)
        } else if incoming_role.priority == reducing_role.priority
            && incoming_role.associativity == OperatorAssociativity::LeftToRight
        {
            Some(true)
        } else {
            Some(false)
        }
    }

    fn log_unresolved_conflict(
        &self,
        lookahead: ProductionNodeId,
        reduce_attached_data: &ReduceAttachedData,
    ) {
        advisory(format!(
            "shift/reduce conflict under lookahead {} with {}; shift is preferred",
            self.node_symbol_string(lookahead),
            self.format_reduce_production(reduce_attached_data),
        ));
        if let Some(log) = self.debugger() {
            if log.logs_conflicts() {
                println!(
                    "[{}; Conflict]: shift preferred over {} under {}",
                    log,
                    self.format_reduce_production(reduce_attached_data),
                    self.node_symbol_string(lookahead),
                );
            }
        }
    }

    /// Close `item_set_id`, then route every advanced item group into its
    /// successor set and record the Shift or goto response.
    fn spread_lookahead_and_construct_entry(&mut self, item_set_id: ProductionItemSetId) {
        self.production_item_set_closure(item_set_id);
        let entry_id = self.production_item_sets[item_set_id.to_usize()].entry_id();
        let mut groups: BTreeMap<ProductionNodeId, Vec<ProductionItem>> = BTreeMap::new();
        for (&item, _) in self.production_item_sets[item_set_id.to_usize()]
            .items_and_forward_nodes()
        {
            let (production_node_id, production_body_id, next_word_to_shift_index) = item;
            let next_production_node_id = self.production_node_id_in_body(
                production_node_id,
                production_body_id,
                next_word_to_shift_index,
            );
            if next_production_node_id.is_valid() {
                groups.entry(next_production_node_id).or_default().push(item);
            }
        }
        for (next_production_node_id, items) in groups {
            let mut advanced_items: Vec<(ProductionItem, ForwardNodesContainer)> = items
                .iter()
                .map(|&(node_id, body_id, index)| {
                    let forward_nodes = self.production_item_sets[item_set_id.to_usize()]
                        .forward_nodes(&(node_id, body_id, index))
                        .clone();
                    ((node_id, body_id, index + 1), forward_nodes)
                })
                .collect();
            advanced_items.sort_by_key(|(item, _)| *item);
            let target_item_set_id =
                self.target_item_set(entry_id, next_production_node_id, &advanced_items);
            for (advanced_item, forward_nodes) in advanced_items {
                self.add_main_item_and_forward_nodes(
                    target_item_set_id,
                    advanced_item,
                    forward_nodes,
                );
            }
            let target_entry_id =
                self.production_item_sets[target_item_set_id.to_usize()].entry_id();
            if self.production_node(next_production_node_id).is_word() {
                self.set_shift_action(entry_id, next_production_node_id, target_entry_id);
            } else {
                self.syntax_analysis_table[entry_id.to_usize()]
                    .set_goto(next_production_node_id, target_entry_id);
            }
        }
    }

    /// Successor set for one shifted symbol: the set the entry already
    /// routes to, else the set owning exactly these kernel items, else a
    /// fresh one.
    fn target_item_set(
        &mut self,
        entry_id: SyntaxAnalysisTableEntryId,
        next_production_node_id: ProductionNodeId,
        advanced_items: &[(ProductionItem, ForwardNodesContainer)],
    ) -> ProductionItemSetId {
        let entry = &self.syntax_analysis_table[entry_id.to_usize()];
        let recorded_target = if self.production_node(next_production_node_id).is_word() {
            match entry.recorded_action(next_production_node_id) {
                Some(Action::Shift { target }) => Some(*target),
                _ => None,
            }
        } else {
            entry.goto(next_production_node_id)
        };
        if let Some(target_entry_id) = recorded_target {
            return self.entry_id_to_item_set_id[&target_entry_id];
        }
        if let Some(existing) = self.item_set_from_main_items(advanced_items) {
            return existing;
        }
        self.emplace_production_item_set()
    }

    /// Set whose kernel items are exactly `advanced_items`, if any.
    fn item_set_from_main_items(
        &self,
        advanced_items: &[(ProductionItem, ForwardNodesContainer)],
    ) -> Option<ProductionItemSetId> {
        let (first_item, _) = advanced_items.first()?;
        let candidates = self.item_to_main_item_sets.get(first_item)?;
        for &candidate_id in candidates {
            let main_items = self.production_item_sets[candidate_id.to_usize()].main_items();
            if main_items.len() == advanced_items.len()
                && advanced_items
                    .iter()
                    .all(|(item, _)| main_items.contains(item))
            {
                return Some(candidate_id);
            }
        }
        None
    }

    fn log_item_set(&self, item_set_id: ProductionItemSetId) {
        if let Some(log) = self.debugger() {
            if log.logs_item_sets() {
                println!(
                    "[{}; Closure]:\n{}",
                    log,
                    self.format_production_items(item_set_id, "\n")
                );
            }
        }
    }
}
