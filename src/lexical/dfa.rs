use super::{
    DfaConfig, DfaGenerator, DfaRow, IntermediateDfaNode, NfaGenerator, TailNodeData, WordData,
    WordPriority, CHARACTER_SET_SIZE,
};
use crate::index::{DfaStateId, NfaNodeId, TransformArrayId};
use crate::util::fatal;
use std::collections::{BTreeSet, HashMap, VecDeque};

impl IntermediateDfaNode {
    fn new(word_data: WordData, members: Vec<NfaNodeId>) -> Self {
        Self {
            forward: vec![DfaStateId::INVALID; CHARACTER_SET_SIZE],
            word_data,
            members,
        }
    }
}

impl DfaGenerator {
    pub fn new() -> Self {
        Self {
            nfa: NfaGenerator::new(),
            intermediate_nodes: Vec::new(),
            set_to_state: HashMap::new(),
            root_state_id: DfaStateId::INVALID,
            eof_word_data: WordData::default(),
            dfa_config: None,
        }
    }

    /// Register the pattern of one word, given as a regular expression.
    pub fn add_regex(&mut self, regex: &str, word_data: WordData, priority: WordPriority) {
        self.nfa.regex_construct((word_data, priority), regex);
    }

    /// Register one word as a literal byte sequence.
    pub fn add_keyword(&mut self, word: &str, word_data: WordData, priority: WordPriority) {
        self.nfa.word_construct(word, (word_data, priority));
    }

    /// Data returned by the driver when the input ends with an empty lex
    /// buffer.
    pub fn set_end_of_file_word_data(&mut self, word_data: WordData) {
        self.eof_word_data = word_data;
    }

    pub fn end_of_file_word_data(&self) -> &WordData {
        &self.eof_word_data
    }

    /// The constructed lexer table.
    ///
    /// Only available after [construct](DfaGenerator::construct) has run.
    pub fn config(&self) -> &DfaConfig {
        self.dfa_config
            .as_ref()
            .expect("DFA table is not constructed yet")
    }

    /// Run the merge optimization, subset construction and minimization and
    /// materialize the final transition table.
    pub fn construct(&mut self) {
        self.nfa.merge_optimization();
        let head_node_id = self.nfa.head_node_id();
        let (start_set, tail_data) = self.nfa.closure(head_node_id);
        if tail_data.is_some() {
            fatal("a registered pattern accepts the empty word".to_string());
        }
        let (root_state_id, inserted) = self.state_of_set(&start_set, WordData::default());
        assert!(inserted);
        self.root_state_id = root_state_id;
        let mut queue = VecDeque::new();
        queue.push_back(root_state_id);
        while let Some(state_now) = queue.pop_front() {
            for condition in 0..CHARACTER_SET_SIZE {
                let Some((target_set, target_word_data)) =
                    self.set_goto(state_now, condition as u8)
                else {
                    continue;
                };
                let (target_state, inserted) = self.state_of_set(
                    &target_set,
                    target_word_data.map(|data| data.0).unwrap_or_default(),
                );
                self.intermediate_nodes[state_now.to_usize()].forward[condition] = target_state;
                if inserted {
                    queue.push_back(target_state);
                }
            }
        }
        self.minimize();
        self.set_to_state.clear();
        self.intermediate_nodes.clear();
    }

    /// Subset-construction goto: union of the ε closures reachable from the
    /// members of `state_src` under `condition`, with the best tail data.
    fn set_goto(
        &self,
        state_src: DfaStateId,
        condition: u8,
    ) -> Option<(BTreeSet<NfaNodeId>, Option<TailNodeData>)> {
        let members = self.intermediate_nodes[state_src.to_usize()].members.clone();
        let mut merged_set = BTreeSet::new();
        let mut merged_tail: Option<TailNodeData> = None;
        for member in members {
            let Some((set_part, tail_part)) = self.nfa.goto(member, condition) else {
                continue;
            };
            merged_set.extend(set_part);
            if let Some(tail_data) = tail_part {
                match merged_tail {
                    None => merged_tail = Some(tail_data),
                    Some(existing) => {
                        if tail_data.1 > existing.1 {
                            merged_tail = Some(tail_data);
                        } else if tail_data.1 == existing.1 && tail_data.0 != existing.0 {
                            fatal(format!(
                                "two patterns of equal priority {} accept the same input; \
                                 check the terminal and operator definitions",
                                tail_data.1
                            ));
                        }
                    }
                }
            }
        }
        if merged_set.is_empty() {
            None
        } else {
            Some((merged_set, merged_tail))
        }
    }

    /// Intern a member set, creating the intermediate state on first sight.
    fn state_of_set(&mut self, members: &BTreeSet<NfaNodeId>, word_data: WordData) -> (DfaStateId, bool) {
        let key: Vec<NfaNodeId> = members.iter().copied().collect();
        match self.set_to_state.get(&key) {
            Some(&state) => (state, false),
            None => {
                let state = DfaStateId::new(self.intermediate_nodes.len());
                self.intermediate_nodes
                    .push(IntermediateDfaNode::new(word_data, key.clone()));
                self.set_to_state.insert(key, state);
                (state, true)
            }
        }
    }

    /// Collapse equivalent intermediate states into final rows.
    ///
    /// States are equivalent when they carry the same word data and agree on
    /// the successor state for every byte; the classification refines one
    /// byte at a time.
    fn minimize(&mut self) {
        let mut state_to_row: HashMap<DfaStateId, TransformArrayId> = HashMap::new();
        let mut row_count = 0usize;
        let all_states: Vec<DfaStateId> =
            (0..self.intermediate_nodes.len()).map(DfaStateId::new).collect();
        self.classify_states(all_states, 0, &mut state_to_row, &mut row_count);
        let mut rows = vec![
            DfaRow {
                transitions: [TransformArrayId::INVALID; CHARACTER_SET_SIZE],
                word_data: WordData::default(),
            };
            row_count
        ];
        let mut logged_rows = vec![false; row_count];
        for (state_index, intermediate_node) in self.intermediate_nodes.iter().enumerate() {
            let row_id = state_to_row[&DfaStateId::new(state_index)];
            if logged_rows[row_id.to_usize()] {
                continue;
            }
            let row = &mut rows[row_id.to_usize()];
            row.word_data = intermediate_node.word_data;
            for condition in 0..CHARACTER_SET_SIZE {
                let target = intermediate_node.forward[condition];
                if target.is_valid() {
                    row.transitions[condition] = state_to_row[&target];
                }
            }
            logged_rows[row_id.to_usize()] = true;
        }
        debug_assert!(logged_rows.iter().all(|&logged| logged));
        let start_row = state_to_row[&self.root_state_id];
        self.dfa_config = Some(DfaConfig {
            rows,
            start_row,
            eof_word_data: self.eof_word_data,
        });
    }

    /// One classification round over `condition`; groups that still hold
    /// several states recurse over the next byte, final groups map to one
    /// row each.
    fn classify_states(
        &self,
        state_ids: Vec<DfaStateId>,
        condition: usize,
        state_to_row: &mut HashMap<DfaStateId, TransformArrayId>,
        row_count: &mut usize,
    ) {
        let mut group_index: HashMap<(DfaStateId, WordData), usize> = HashMap::new();
        let mut groups: Vec<Vec<DfaStateId>> = Vec::new();
        for state_id in state_ids {
            let node = &self.intermediate_nodes[state_id.to_usize()];
            let key = (node.forward[condition], node.word_data);
            match group_index.get(&key) {
                Some(&index) => groups[index].push(state_id),
                None => {
                    group_index.insert(key, groups.len());
                    groups.push(vec![state_id]);
                }
            }
        }
        for group in groups {
            if condition + 1 < CHARACTER_SET_SIZE && group.len() > 1 {
                self.classify_states(group, condition + 1, state_to_row, row_count);
            } else {
                let row_id = TransformArrayId::new(*row_count);
                *row_count += 1;
                for state_id in group {
                    state_to_row.insert(state_id, row_id);
                }
            }
        }
    }
}
