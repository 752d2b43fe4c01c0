//! A module consists of the production node model for the grammar being
//! compiled.
//!
//! Every symbol a user registers becomes one node in a single arena:
//! terminals carry the id of their body regex, operators additionally carry
//! up to two operator roles (a binary and a left-unary semantic), and
//! non-terminals own an ordered list of bodies where each body pairs the
//! produced symbol sequence with the reduction handler registered for it.
//! Exactly one end-of-input sentinel node exists per generator.
//!
//! Nodes reference each other through [ProductionNodeId] indices only, so
//! cyclic grammars need no special ownership treatment.

use crate::index::{BodySymbolId, HandlerId, ProductionBodyId, ProductionNodeId, SymbolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Discriminant of a production node, also persisted inside
/// [WordData](crate::lexical::WordData).
pub enum ProductionNodeKind {
    Terminal,
    Operator,
    NonTerminal,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Direction an operator associates when chained at equal priority.
pub enum OperatorAssociativity {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// One semantic role of an operator. Higher priority binds tighter.
pub struct OperatorRole {
    pub associativity: OperatorAssociativity,
    pub priority: u16,
}

#[derive(Debug)]
/// A plain terminal production registered from a regex or keyword literal.
pub struct TerminalNode {
    pub node_symbol_id: SymbolId,
    pub body_symbol_id: BodySymbolId,
}

#[derive(Debug)]
/// An operator production. A single node may hold the binary role, the
/// left-unary role, or both.
pub struct OperatorNode {
    pub node_symbol_id: SymbolId,
    pub body_symbol_id: BodySymbolId,
    pub binary: Option<OperatorRole>,
    pub unary: Option<OperatorRole>,
}

#[derive(Debug, Clone)]
/// One body of a non-terminal production together with the handler invoked
/// when the body is reduced.
pub struct ProductionBody {
    pub symbols: Vec<ProductionNodeId>,
    pub handler_id: HandlerId,
}

#[derive(Debug)]
/// A non-terminal production with its alternative bodies.
pub struct NonTerminalNode {
    pub node_symbol_id: SymbolId,
    bodies: Vec<ProductionBody>,
    may_empty_reduct: bool,
}

#[derive(Debug)]
/// A node of the production arena.
pub enum ProductionNode {
    Terminal(TerminalNode),
    Operator(OperatorNode),
    NonTerminal(NonTerminalNode),
    End,
}

impl OperatorNode {
    /// Role used when priorities are compared during shift/reduce
    /// resolution. The binary role wins when both are present.
    pub fn preferred_role(&self) -> OperatorRole {
        match self.binary {
            Some(role) => role,
            None => self.unary.expect("operator node carries no role"),
        }
    }
}

impl NonTerminalNode {
    pub fn new(node_symbol_id: SymbolId) -> Self {
        Self {
            node_symbol_id,
            bodies: Vec::new(),
            may_empty_reduct: false,
        }
    }

    pub fn add_body(
        &mut self,
        symbols: Vec<ProductionNodeId>,
        handler_id: HandlerId,
    ) -> ProductionBodyId {
        let body_id = ProductionBodyId::new(self.bodies.len());
        self.bodies.push(ProductionBody {
            symbols,
            handler_id,
        });
        body_id
    }

    pub fn body(&self, body_id: ProductionBodyId) -> &ProductionBody {
        &self.bodies[body_id.to_usize()]
    }

    pub fn bodies(&self) -> &Vec<ProductionBody> {
        &self.bodies
    }

    pub fn body_ids(&self) -> impl Iterator<Item = ProductionBodyId> {
        (0..self.bodies.len()).map(ProductionBodyId::new)
    }

    pub fn set_may_empty_reduct(&mut self) {
        self.may_empty_reduct = true;
    }

    pub fn may_empty_reduct(&self) -> bool {
        self.may_empty_reduct
    }
}

impl ProductionNode {
    pub fn kind(&self) -> ProductionNodeKind {
        match self {
            ProductionNode::Terminal(_) => ProductionNodeKind::Terminal,
            ProductionNode::Operator(_) => ProductionNodeKind::Operator,
            ProductionNode::NonTerminal(_) => ProductionNodeKind::NonTerminal,
            ProductionNode::End => ProductionNodeKind::End,
        }
    }

    /// Whether the node can appear as a lookahead or be shifted as a word.
    pub fn is_word(&self) -> bool {
        matches!(
            self.kind(),
            ProductionNodeKind::Terminal | ProductionNodeKind::Operator | ProductionNodeKind::End
        )
    }

    pub fn node_symbol_id(&self) -> SymbolId {
        match self {
            ProductionNode::Terminal(node) => node.node_symbol_id,
            ProductionNode::Operator(node) => node.node_symbol_id,
            ProductionNode::NonTerminal(node) => node.node_symbol_id,
            ProductionNode::End => SymbolId::INVALID,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            ProductionNode::Operator(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_non_terminal(&self) -> &NonTerminalNode {
        match self {
            ProductionNode::NonTerminal(node) => node,
            _ => panic!("production node is not a non-terminal"),
        }
    }

    pub fn as_non_terminal_mut(&mut self) -> &mut NonTerminalNode {
        match self {
            ProductionNode::NonTerminal(node) => node,
            _ => panic!("production node is not a non-terminal"),
        }
    }

    pub fn try_non_terminal(&self) -> Option<&NonTerminalNode> {
        match self {
            ProductionNode::NonTerminal(node) => Some(node),
            _ => None,
        }
    }
}
