//! Diagnostic formatting of productions, items and item sets.

use super::SyntaxGenerator;
use crate::index::{ProductionItemSetId, ProductionNodeId};
use crate::production::ProductionNode;
use crate::syntax::{ForwardNodesContainer, ProductionItem, ReduceAttachedData};
use ptree::TreeItem;
use std::borrow::Cow;

#[derive(Clone)]
/// Printable tree of the constructed item sets.
struct ItemSetTree {
    label: String,
    children: Vec<ItemSetTree>,
}

impl TreeItem for ItemSetTree {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}

impl SyntaxGenerator {
    /// Display name of a production node; the end sentinel prints as `$`.
    pub(crate) fn node_symbol_string(&self, production_node_id: ProductionNodeId) -> &str {
        match self.production_node(production_node_id) {
            ProductionNode::End => "$",
            node => self.manager_node_symbol.lookup(node.node_symbol_id()),
        }
    }

    /// One production body, e.g. `E -> E + E`.
    pub(crate) fn format_production_body(
        &self,
        production_node_id: ProductionNodeId,
        body_symbols: &[ProductionNodeId],
    ) -> String {
        let mut formatted = format!("{} ->", self.node_symbol_string(production_node_id));
        for &symbol_id in body_symbols {
            formatted.push(' ');
            formatted.push_str(self.node_symbol_string(symbol_id));
        }
        formatted
    }

    pub(crate) fn format_reduce_production(
        &self,
        reduce_attached_data: &ReduceAttachedData,
    ) -> String {
        self.format_production_body(
            reduce_attached_data.reduced_node_id,
            &reduce_attached_data.body,
        )
    }

    /// One item with the dot marking the next symbol to shift, e.g.
    /// `E -> E · + E`.
    pub(crate) fn format_production_item(&self, production_item: &ProductionItem) -> String {
        let (production_node_id, production_body_id, next_word_to_shift_index) = *production_item;
        let body = &self
            .production_node(production_node_id)
            .as_non_terminal()
            .body(production_body_id)
            .symbols;
        let mut formatted = format!("{} ->", self.node_symbol_string(production_node_id));
        for (position, &symbol_id) in body.iter().enumerate() {
            if position == next_word_to_shift_index.to_usize() {
                formatted.push_str(" ·");
            }
            formatted.push(' ');
            formatted.push_str(self.node_symbol_string(symbol_id));
        }
        if next_word_to_shift_index.to_usize() == body.len() {
            formatted.push_str(" ·");
        }
        formatted
    }

    /// Space-separated lookahead symbols, sorted for stable output.
    pub(crate) fn format_lookahead_symbols(
        &self,
        forward_nodes: &ForwardNodesContainer,
    ) -> String {
        let mut names: Vec<&str> = forward_nodes
            .iter()
            .map(|&node_id| self.node_symbol_string(node_id))
            .collect();
        names.sort();
        names.join(" ")
    }

    /// Every item of one item set with its lookaheads, one per line.
    pub(crate) fn format_production_items(
        &self,
        production_item_set_id: ProductionItemSetId,
        line_feed: &str,
    ) -> String {
        let item_set = &self.production_item_sets[production_item_set_id.to_usize()];
        let mut lines: Vec<String> = item_set
            .items_and_forward_nodes()
            .iter()
            .map(|(item, forward_nodes)| {
                format!(
                    "{} [{}]",
                    self.format_production_item(item),
                    self.format_lookahead_symbols(forward_nodes)
                )
            })
            .collect();
        lines.sort();
        lines.join(line_feed)
    }

    /// Print every constructed item set as a tree.
    ///
    /// Only meaningful after
    /// [construct_syntax_config](Self::construct_syntax_config).
    pub fn print_item_sets(&self) -> std::io::Result<()> {
        let children = (0..self.production_item_sets.len())
            .map(|item_set_index| {
                let item_set_id = ProductionItemSetId::new(item_set_index);
                let item_set = &self.production_item_sets[item_set_index];
                let formatted_items = self.format_production_items(item_set_id, "\n");
                let items = formatted_items
                    .split('\n')
                    .map(|line| ItemSetTree {
                        label: line.to_string(),
                        children: Vec::new(),
                    })
                    .collect();
                ItemSetTree {
                    label: format!("I{} # entry {}", item_set_index, item_set.entry_id()),
                    children: items,
                }
            })
            .collect();
        ptree::print_tree(&ItemSetTree {
            label: "item sets".to_string(),
            children,
        })
    }
}
