use super::{NfaGenerator, NfaNode, TailNodeData};
use crate::index::NfaNodeId;
use crate::util::fatal;
use std::collections::{BTreeSet, VecDeque};

fn malformed_regex(pattern: &str, position: usize) -> ! {
    fatal(format!(
        "malformed regular expression\n{}\n{}^",
        pattern,
        " ".repeat(position.min(pattern.len()))
    ))
}

impl NfaNode {
    fn set_condition_transfer(&mut self, condition: u8, node_id: NfaNodeId) {
        let previous = self.forward.insert(condition, node_id);
        debug_assert!(previous.is_none() || previous == Some(node_id));
    }

    fn add_nocondition_transfer(&mut self, node_id: NfaNodeId) {
        self.epsilon.insert(node_id);
    }
}

impl NfaGenerator {
    pub fn new() -> Self {
        Self {
            nodes: vec![NfaNode::default()],
            aliases: vec![NfaNodeId::INVALID],
            head_node_id: NfaNodeId::new(0),
            tail_nodes: std::collections::HashMap::new(),
        }
    }

    pub fn head_node_id(&self) -> NfaNodeId {
        self.resolve(self.head_node_id)
    }

    fn emplace_node(&mut self) -> NfaNodeId {
        let id = NfaNodeId::new(self.nodes.len());
        self.nodes.push(NfaNode::default());
        self.aliases.push(NfaNodeId::INVALID);
        id
    }

    /// Follow merge redirections to the node currently holding the content
    /// of `id`.
    pub(crate) fn resolve(&self, mut id: NfaNodeId) -> NfaNodeId {
        while self.aliases[id.to_usize()].is_valid() {
            id = self.aliases[id.to_usize()];
        }
        id
    }

    fn node(&self, id: NfaNodeId) -> &NfaNode {
        &self.nodes[self.resolve(id).to_usize()]
    }

    fn node_mut(&mut self, id: NfaNodeId) -> &mut NfaNode {
        let id = self.resolve(id);
        &mut self.nodes[id.to_usize()]
    }

    /// Parse one regular expression and append it to the automaton.
    ///
    /// Returns the entry and exit node of the created fragment. The exit
    /// node is tagged with `tail_node_data` and the automaton head gains an
    /// ε transition to the entry node.
    pub(crate) fn regex_construct(
        &mut self,
        tail_node_data: TailNodeData,
        pattern: &str,
    ) -> (NfaNodeId, NfaNodeId) {
        let mut next_character_index = 0usize;
        let (head_id, tail_id) =
            self.sub_regex_construct(pattern, &mut next_character_index, false);
        if head_id == tail_id {
            fatal(format!("empty regular expression: {:?}", pattern));
        }
        let head_node_id = self.head_node_id();
        self.node_mut(head_node_id).add_nocondition_transfer(head_id);
        self.add_tail_node(tail_id, tail_node_data, pattern);
        (head_id, tail_id)
    }

    /// Append a literal word to the automaton, one conditional transition
    /// per byte.
    pub(crate) fn word_construct(
        &mut self,
        word: &str,
        tail_node_data: TailNodeData,
    ) -> (NfaNodeId, NfaNodeId) {
        assert!(!word.is_empty());
        let head_id = self.emplace_node();
        let mut tail_id = head_id;
        for byte in word.bytes() {
            let next_id = self.emplace_node();
            self.node_mut(tail_id).set_condition_transfer(byte, next_id);
            tail_id = next_id;
        }
        let head_node_id = self.head_node_id();
        self.node_mut(head_node_id).add_nocondition_transfer(head_id);
        self.add_tail_node(tail_id, tail_node_data, word);
        (head_id, tail_id)
    }

    fn add_tail_node(&mut self, tail_id: NfaNodeId, tail_node_data: TailNodeData, pattern: &str) {
        let tail_id = self.resolve(tail_id);
        if self.tail_nodes.insert(tail_id, tail_node_data).is_some() {
            fatal(format!("pattern registered twice: {:?}", pattern));
        }
    }

    /// Thompson-style scan of `pattern`.
    ///
    /// `in_group` marks a recursive call for a parenthesized group; the
    /// group scan ends at the matching ')'.
    fn sub_regex_construct(
        &mut self,
        pattern: &str,
        next_character_index: &mut usize,
        in_group: bool,
    ) -> (NfaNodeId, NfaNodeId) {
        let bytes = pattern.as_bytes();
        let head_id = self.emplace_node();
        let mut tail_id = head_id;
        let mut pre_tail_id = head_id;
        while *next_character_index < bytes.len() {
            let character_now = bytes[*next_character_index];
            *next_character_index += 1;
            match character_now {
                b'[' => {
                    let (switch_head, switch_tail) =
                        self.create_switch_tree(pattern, next_character_index);
                    self.node_mut(tail_id).add_nocondition_transfer(switch_head);
                    pre_tail_id = tail_id;
                    tail_id = switch_tail;
                }
                b']' => {
                    malformed_regex(pattern, *next_character_index - 1);
                }
                b'(' => {
                    let (group_head, group_tail) =
                        self.sub_regex_construct(pattern, next_character_index, true);
                    self.node_mut(tail_id).add_nocondition_transfer(group_head);
                    pre_tail_id = tail_id;
                    tail_id = group_tail;
                }
                b')' => {
                    if !in_group {
                        malformed_regex(pattern, *next_character_index - 1);
                    }
                    return (head_id, tail_id);
                }
                // Quantifiers act on the immediately preceding atom or group.
                b'+' => {
                    self.node_mut(tail_id).add_nocondition_transfer(pre_tail_id);
                }
                b'*' => {
                    self.node_mut(tail_id).add_nocondition_transfer(pre_tail_id);
                    self.node_mut(pre_tail_id).add_nocondition_transfer(tail_id);
                }
                b'?' => {
                    self.node_mut(pre_tail_id).add_nocondition_transfer(tail_id);
                }
                b'\\' => {
                    if *next_character_index >= bytes.len() {
                        malformed_regex(pattern, *next_character_index);
                    }
                    let escaped = bytes[*next_character_index];
                    *next_character_index += 1;
                    pre_tail_id = tail_id;
                    tail_id = self.emplace_node();
                    self.node_mut(pre_tail_id)
                        .set_condition_transfer(escaped, tail_id);
                }
                b'.' => {
                    pre_tail_id = tail_id;
                    tail_id = self.emplace_node();
                    for condition in 0..=u8::MAX {
                        self.node_mut(pre_tail_id)
                            .set_condition_transfer(condition, tail_id);
                    }
                }
                _ => {
                    pre_tail_id = tail_id;
                    tail_id = self.emplace_node();
                    self.node_mut(pre_tail_id)
                        .set_condition_transfer(character_now, tail_id);
                }
            }
        }
        if in_group {
            // Ran past the end without the matching ')'.
            malformed_regex(pattern, bytes.len());
        }
        (head_id, tail_id)
    }

    /// Scan a `[...]` character class into a two-node switch.
    ///
    /// On entry `next_character_index` points just past the '['; on return
    /// it points just past the ']'. Ranges `a-z` are inclusive; a '-' with
    /// no preceding literal is taken literally; '\\' escapes any byte.
    fn create_switch_tree(
        &mut self,
        pattern: &str,
        next_character_index: &mut usize,
    ) -> (NfaNodeId, NfaNodeId) {
        let bytes = pattern.as_bytes();
        let head_id = self.emplace_node();
        let tail_id = self.emplace_node();
        let mut last_character: Option<u8> = None;
        loop {
            if *next_character_index >= bytes.len() {
                malformed_regex(pattern, *next_character_index);
            }
            let character_now = bytes[*next_character_index];
            *next_character_index += 1;
            match character_now {
                b']' => break,
                b'-' => match last_character {
                    None => {
                        self.node_mut(head_id).set_condition_transfer(b'-', tail_id);
                        last_character = Some(b'-');
                    }
                    Some(range_start) => {
                        if *next_character_index >= bytes.len() {
                            malformed_regex(pattern, *next_character_index);
                        }
                        let mut range_end = bytes[*next_character_index];
                        *next_character_index += 1;
                        if range_end == b']' {
                            self.node_mut(head_id).set_condition_transfer(b'-', tail_id);
                            break;
                        }
                        if range_end == b'\\' {
                            if *next_character_index >= bytes.len() {
                                malformed_regex(pattern, *next_character_index);
                            }
                            range_end = bytes[*next_character_index];
                            *next_character_index += 1;
                        }
                        let low = range_start.min(range_end);
                        let high = range_start.max(range_end);
                        for condition in low..=high {
                            self.node_mut(head_id).set_condition_transfer(condition, tail_id);
                        }
                        last_character = None;
                    }
                },
                b'\\' => {
                    if *next_character_index >= bytes.len() {
                        malformed_regex(pattern, *next_character_index);
                    }
                    let escaped = bytes[*next_character_index];
                    *next_character_index += 1;
                    self.node_mut(head_id).set_condition_transfer(escaped, tail_id);
                    last_character = Some(escaped);
                }
                _ => {
                    self.node_mut(head_id)
                        .set_condition_transfer(character_now, tail_id);
                    last_character = Some(character_now);
                }
            }
        }
        if self.node(head_id).forward.is_empty() {
            malformed_regex(pattern, *next_character_index - 1);
        }
        (head_id, tail_id)
    }

    /// All nodes reachable from `node_id` over ε transitions, together with
    /// the highest-priority tail data found among them.
    ///
    /// An equal-priority conflict between different word data means two
    /// registered patterns accept the same byte sequence and is fatal.
    pub(crate) fn closure(&self, node_id: NfaNodeId) -> (BTreeSet<NfaNodeId>, Option<TailNodeData>) {
        let mut result_set = BTreeSet::new();
        let mut word_attached_data: Option<TailNodeData> = None;
        let mut queue = VecDeque::new();
        queue.push_back(self.resolve(node_id));
        while let Some(id_now) = queue.pop_front() {
            if !result_set.insert(id_now) {
                continue;
            }
            if let Some(tail_data) = self.tail_nodes.get(&id_now) {
                match word_attached_data {
                    None => word_attached_data = Some(*tail_data),
                    Some(existing) => {
                        if tail_data.1 > existing.1 {
                            word_attached_data = Some(*tail_data);
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
            for &epsilon_target in &self.nodes[id_now.to_usize()].epsilon {
                queue.push_back(self.resolve(epsilon_target));
            }
        }
        (result_set, word_attached_data)
    }

    /// ε closure of the node reached from `node_id` under `condition`, or
    /// [None] when the node cannot shift the byte.
    pub(crate) fn goto(
        &self,
        node_id: NfaNodeId,
        condition: u8,
    ) -> Option<(BTreeSet<NfaNodeId>, Option<TailNodeData>)> {
        let target = *self.node(node_id).forward.get(&condition)?;
        Some(self.closure(target))
    }

    /// Size-only optimization run before subset construction.
    ///
    /// Removes conditional and ε entries already provided by an ε-equivalent
    /// node, then folds nodes whose only remaining edge is a single ε
    /// transition into their target. An ε self-loop is skipped as its own
    /// equivalence partner and its targets are not re-queued on that
    /// account.
    pub fn merge_optimization(&mut self) {
        let mut can_be_merge_source = vec![true; self.nodes.len()];
        let mut queue = VecDeque::new();
        queue.push_back(self.head_node_id());
        while let Some(raw_id) = queue.pop_front() {
            let id_now = self.resolve(raw_id);
            if !can_be_merge_source[id_now.to_usize()] {
                continue;
            }
            let equal_node_ids: Vec<NfaNodeId> = self.nodes[id_now.to_usize()]
                .epsilon
                .iter()
                .map(|&id| self.resolve(id))
                .collect();
            for equal_node_id in equal_node_ids {
                if equal_node_id == id_now {
                    continue;
                }
                let equal_epsilon: Vec<NfaNodeId> = self.nodes[equal_node_id.to_usize()]
                    .epsilon
                    .iter()
                    .map(|&id| self.resolve(id))
                    .collect();
                let equal_forward: Vec<(u8, NfaNodeId)> = self.nodes[equal_node_id.to_usize()]
                    .forward
                    .iter()
                    .map(|(&condition, &id)| (condition, self.resolve(id)))
                    .collect();
                // Entries shared with the equivalent node are redundant on
                // this node; the ε link to the equivalent node itself must
                // survive.
                let node_epsilon: Vec<NfaNodeId> =
                    self.nodes[id_now.to_usize()].epsilon.iter().copied().collect();
                for epsilon_target in node_epsilon {
                    let resolved = self.resolve(epsilon_target);
                    if resolved != equal_node_id && equal_epsilon.contains(&resolved) {
                        self.nodes[id_now.to_usize()].epsilon.remove(&epsilon_target);
                    }
                }
                let node_forward: Vec<(u8, NfaNodeId)> = self.nodes[id_now.to_usize()]
                    .forward
                    .iter()
                    .map(|(&condition, &id)| (condition, id))
                    .collect();
                for (condition, target) in node_forward {
                    if equal_forward.contains(&(condition, self.resolve(target))) {
                        self.nodes[id_now.to_usize()].forward.remove(&condition);
                    }
                }
                queue.push_back(equal_node_id);
                for &target in self.nodes[id_now.to_usize()].forward.values() {
                    queue.push_back(target);
                }
            }
            let node_now = &self.nodes[id_now.to_usize()];
            if node_now.forward.is_empty()
                && node_now.epsilon.len() == 1
                && !self.tail_nodes.contains_key(&id_now)
            {
                let target = self.resolve(*node_now.epsilon.iter().next().unwrap());
                if target != id_now {
                    self.nodes[id_now.to_usize()].epsilon.clear();
                    self.aliases[id_now.to_usize()] = target;
                    queue.push_back(target);
                    continue;
                }
            }
            can_be_merge_source[id_now.to_usize()] = false;
        }
    }
}
