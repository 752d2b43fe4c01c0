//! Merging of behaviourally equivalent syntax-table rows.
//!
//! Two rows are equivalent when they agree on the action under every word
//! (terminal, operator and the end sentinel) and on the goto target under
//! every non-terminal. Rows are classified radix-style, one symbol at a
//! time, so only rows still agreeing on every symbol seen so far are
//! compared against the next one. Every group keeps its first row; the rest
//! are dropped, the table is compacted in place and all shift and goto
//! targets plus the root entry id are rewritten.

use super::SyntaxGenerator;
use crate::index::{ProductionItemSetId, ProductionNodeId, SyntaxAnalysisTableEntryId};
use crate::syntax::Action;
use std::collections::HashMap;

impl SyntaxGenerator {
    pub(crate) fn syntax_analysis_table_merge_optimize(&mut self) {
        let mut word_node_ids = Vec::new();
        let mut nonterminal_node_ids = Vec::new();
        for node_index in 0..self.manager_nodes.len() {
            let node_id = ProductionNodeId::new(node_index);
            if self.production_node(node_id).is_word() {
                word_node_ids.push(node_id);
            } else {
                nonterminal_node_ids.push(node_id);
            }
        }
        let equivalent_groups = self.classify_entries(&word_node_ids, &nonterminal_node_ids);

        let mut merged_to_kept: HashMap<SyntaxAnalysisTableEntryId, SyntaxAnalysisTableEntryId> =
            HashMap::new();
        for group in &equivalent_groups {
            let kept_entry_id = group[0];
            for &merged_entry_id in &group[1..] {
                merged_to_kept.insert(merged_entry_id, kept_entry_id);
            }
        }
        // Compact the surviving rows towards the low indices, keeping their
        // relative order.
        let mut old_to_new: HashMap<SyntaxAnalysisTableEntryId, SyntaxAnalysisTableEntryId> =
            HashMap::new();
        let mut next_insert_position = 0usize;
        for next_process_index in 0..self.syntax_analysis_table.len() {
            let old_entry_id = SyntaxAnalysisTableEntryId::new(next_process_index);
            if merged_to_kept.contains_key(&old_entry_id) {
                continue;
            }
            if next_insert_position != next_process_index {
                self.syntax_analysis_table
                    .swap(next_insert_position, next_process_index);
            }
            old_to_new.insert(
                old_entry_id,
                SyntaxAnalysisTableEntryId::new(next_insert_position),
            );
            next_insert_position += 1;
        }
        self.syntax_analysis_table.truncate(next_insert_position);
        for (merged_entry_id, kept_entry_id) in &merged_to_kept {
            let new_entry_id = old_to_new[kept_entry_id];
            old_to_new.insert(*merged_entry_id, new_entry_id);
        }
        for entry in &mut self.syntax_analysis_table {
            entry.remap_entry_ids(&old_to_new);
        }
        self.root_entry_id = old_to_new[&self.root_entry_id];
        // Item sets survive for diagnostics; point them at the rows their
        // entries ended up in.
        let mut new_entry_id_to_item_set_id = HashMap::new();
        for item_set_index in 0..self.production_item_sets.len() {
            let item_set = &mut self.production_item_sets[item_set_index];
            let new_entry_id = old_to_new[&item_set.entry_id()];
            item_set.set_entry_id(new_entry_id);
            new_entry_id_to_item_set_id
                .entry(new_entry_id)
                .or_insert(ProductionItemSetId::new(item_set_index));
        }
        self.entry_id_to_item_set_id = new_entry_id_to_item_set_id;
    }

    /// Groups of two or more rows agreeing on every word action and every
    /// non-terminal goto.
    fn classify_entries(
        &self,
        word_node_ids: &[ProductionNodeId],
        nonterminal_node_ids: &[ProductionNodeId],
    ) -> Vec<Vec<SyntaxAnalysisTableEntryId>> {
        let all_entry_ids: Vec<SyntaxAnalysisTableEntryId> = (0..self.syntax_analysis_table.len())
            .map(SyntaxAnalysisTableEntryId::new)
            .collect();
        let mut word_groups = Vec::new();
        self.classify_entries_by_word(word_node_ids, 0, all_entry_ids, &mut word_groups);
        let mut final_groups = Vec::new();
        for group in word_groups {
            self.classify_entries_by_goto(nonterminal_node_ids, 0, group, &mut final_groups);
        }
        final_groups
    }

    fn classify_entries_by_word(
        &self,
        word_node_ids: &[ProductionNodeId],
        index: usize,
        entry_ids: Vec<SyntaxAnalysisTableEntryId>,
        equivalent_groups: &mut Vec<Vec<SyntaxAnalysisTableEntryId>>,
    ) {
        if entry_ids.len() < 2 {
            return;
        }
        if index >= word_node_ids.len() {
            equivalent_groups.push(entry_ids);
            return;
        }
        for group in self.group_entries(entry_ids, |entry_id| {
            self.syntax_analysis_table[entry_id.to_usize()]
                .action(word_node_ids[index])
                .clone()
        }) {
            self.classify_entries_by_word(word_node_ids, index + 1, group, equivalent_groups);
        }
    }

    fn classify_entries_by_goto(
        &self,
        nonterminal_node_ids: &[ProductionNodeId],
        index: usize,
        entry_ids: Vec<SyntaxAnalysisTableEntryId>,
        equivalent_groups: &mut Vec<Vec<SyntaxAnalysisTableEntryId>>,
    ) {
        if entry_ids.len() < 2 {
            return;
        }
        if index >= nonterminal_node_ids.len() {
            equivalent_groups.push(entry_ids);
            return;
        }
        for group in self.group_entries(entry_ids, |entry_id| {
            self.syntax_analysis_table[entry_id.to_usize()].goto(nonterminal_node_ids[index])
        }) {
            self.classify_entries_by_goto(nonterminal_node_ids, index + 1, group, equivalent_groups);
        }
    }

    /// Partition `entry_ids` by a classification key, preserving first-seen
    /// order of the groups.
    fn group_entries<TKey: std::hash::Hash + Eq>(
        &self,
        entry_ids: Vec<SyntaxAnalysisTableEntryId>,
        key_of: impl Fn(SyntaxAnalysisTableEntryId) -> TKey,
    ) -> Vec<Vec<SyntaxAnalysisTableEntryId>> {
        let mut group_indices: HashMap<TKey, usize> = HashMap::new();
        let mut groups: Vec<Vec<SyntaxAnalysisTableEntryId>> = Vec::new();
        for entry_id in entry_ids {
            let key = key_of(entry_id);
            match group_indices.get(&key) {
                Some(&group_index) => groups[group_index].push(entry_id),
                None => {
                    group_indices.insert(key, groups.len());
                    groups.push(vec![entry_id]);
                }
            }
        }
        groups
    }
}
