//! A module consists of the lexical table generators.
//!
//! Terminal patterns registered with the generator are compiled one at a
//! time into fragments of a single NFA whose unique head is linked to each
//! fragment by an ε transition ([NfaGenerator]). Accepting fragment tails
//! carry the word data returned to the driver together with a word priority
//! used to resolve overlapping patterns. Subset construction then folds the
//! NFA into a deterministic automaton, equivalent states are merged, and the
//! result is a dense `[row × 256]` transition table ([DfaConfig]) ready to be
//! persisted.
//!
//! The alphabet is the 256 byte values; multi-byte encodings are treated as
//! plain byte sequences.

mod dfa;
mod nfa;

#[cfg(test)]
mod __tests__;

use crate::index::{DfaStateId, HandlerId, NfaNodeId, ProductionNodeId, TransformArrayId};
use crate::production::{OperatorRole, ProductionNodeKind};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Number of distinct transition conditions of one automaton state.
pub const CHARACTER_SET_SIZE: usize = 256;

/// Priority attached to every registered word. When several patterns accept
/// the same byte sequence the highest priority wins; an equal-priority
/// conflict between different words is a registration error.
///
/// Tier 0 is reserved for plain tokens, 1 for operators and 2 for keywords.
pub type WordPriority = u8;

pub const WORD_PRIORITY_PLAIN: WordPriority = 0;
pub const WORD_PRIORITY_OPERATOR: WordPriority = 1;
pub const WORD_PRIORITY_KEYWORD: WordPriority = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Data attached to an accepting lexer state, returned alongside every
/// recognized word.
///
/// The production node id identifies the terminal (or operator) which
/// produced the pattern; operator words additionally carry their operator
/// roles so the driver can disambiguate unary and binary use sites.
pub struct WordData {
    pub node_id: ProductionNodeId,
    pub kind: ProductionNodeKind,
    pub handler_id: HandlerId,
    pub binary: Option<OperatorRole>,
    pub unary: Option<OperatorRole>,
}

impl Default for WordData {
    fn default() -> Self {
        Self {
            node_id: ProductionNodeId::INVALID,
            kind: ProductionNodeKind::Terminal,
            handler_id: HandlerId::INVALID,
            binary: None,
            unary: None,
        }
    }
}

impl WordData {
    pub fn terminal(node_id: ProductionNodeId) -> Self {
        Self {
            node_id,
            ..Self::default()
        }
    }

    pub fn operator(
        node_id: ProductionNodeId,
        binary: Option<OperatorRole>,
        unary: Option<OperatorRole>,
    ) -> Self {
        Self {
            node_id,
            kind: ProductionNodeKind::Operator,
            handler_id: HandlerId::INVALID,
            binary,
            unary,
        }
    }

    pub fn end(node_id: ProductionNodeId) -> Self {
        Self {
            node_id,
            kind: ProductionNodeKind::End,
            ..Self::default()
        }
    }

    /// Whether the data denotes a registered word. Non-accepting rows keep
    /// the default value whose node id is the invalid sentinel.
    pub fn is_word(&self) -> bool {
        self.node_id.is_valid()
    }
}

/// Word data and word priority of one accepting NFA tail.
pub(crate) type TailNodeData = (WordData, WordPriority);

#[derive(Debug, Default)]
/// One NFA node: at most one conditional target per byte plus a set of
/// ε transitions.
pub(crate) struct NfaNode {
    forward: BTreeMap<u8, NfaNodeId>,
    epsilon: HashSet<NfaNodeId>,
}

/// Builder assembling all terminal patterns into one NFA.
pub struct NfaGenerator {
    nodes: Vec<NfaNode>,
    /// Redirections produced by the merge optimization; a folded node id
    /// stays usable and resolves to its merge target.
    aliases: Vec<NfaNodeId>,
    head_node_id: NfaNodeId,
    tail_nodes: HashMap<NfaNodeId, TailNodeData>,
}

#[derive(Debug, Clone)]
/// One row of the final lexer table.
pub struct DfaRow {
    pub transitions: [TransformArrayId; CHARACTER_SET_SIZE],
    pub word_data: WordData,
}

#[derive(Debug, Clone)]
/// The deterministic lexer table produced by [DfaGenerator::construct].
pub struct DfaConfig {
    pub rows: Vec<DfaRow>,
    pub start_row: TransformArrayId,
    pub eof_word_data: WordData,
}

#[derive(Debug)]
/// A state produced by subset construction, before equivalent states are
/// collapsed into transition-table rows.
pub(crate) struct IntermediateDfaNode {
    forward: Vec<DfaStateId>,
    word_data: WordData,
    members: Vec<NfaNodeId>,
}

/// Builder running subset construction and minimization over the merged NFA.
pub struct DfaGenerator {
    nfa: NfaGenerator,
    intermediate_nodes: Vec<IntermediateDfaNode>,
    set_to_state: HashMap<Vec<NfaNodeId>, DfaStateId>,
    root_state_id: DfaStateId,
    eof_word_data: WordData,
    dfa_config: Option<DfaConfig>,
}
