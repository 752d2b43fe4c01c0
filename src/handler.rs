//! Reduction handler interface and registry.
//!
//! Every `(non-terminal, body)` registration materializes exactly one
//! handler object; the registry hands out a stable [HandlerId] per
//! registration and the artifact stores each handler's reconstruction tag so
//! a driver can reinstantiate its own handler table and dispatch by id.

use crate::index::HandlerId;
use std::any::Any;
use std::rc::Rc;

/// Data returned by a reduction handler and consumed by the handler of the
/// enclosing production.
pub type UserData = Box<dyn Any>;

#[derive(Debug)]
/// Payload of one body symbol handed to a reduction handler.
pub enum WordDataToUser {
    /// Raw bytes the lexer matched for a terminal or operator symbol.
    Terminal { lexeme: Vec<u8> },
    /// Data an earlier reduction produced for a non-terminal symbol.
    NonTerminal(UserData),
    /// Marker for a nullable non-terminal reduced from nothing.
    Empty,
}

impl WordDataToUser {
    /// The matched bytes of a terminal slot.
    ///
    /// Panics when the slot holds non-terminal data; the production shape
    /// tells the handler which accessor applies at every position.
    pub fn terminal_lexeme(&self) -> &[u8] {
        match self {
            WordDataToUser::Terminal { lexeme } => lexeme,
            _ => panic!("word data is not a terminal lexeme"),
        }
    }

    /// The user data of a non-terminal slot.
    pub fn into_user_data(self) -> UserData {
        match self {
            WordDataToUser::NonTerminal(user_data) => user_data,
            _ => panic!("word data is not a reduction result"),
        }
    }

    /// Whether the slot is the empty marker of an ε reduction.
    pub fn is_empty(&self) -> bool {
        matches!(self, WordDataToUser::Empty)
    }
}

/// A user-written reduction handler.
///
/// The handler receives one [WordDataToUser] per body symbol, in production
/// order, and returns the data pushed for the reduced non-terminal. `tag`
/// names the handler type inside the serialized artifact so the driver can
/// rebuild its dispatch table.
pub trait Reducer {
    fn reduce(&self, args: Vec<WordDataToUser>) -> UserData;
    fn tag(&self) -> &'static str;
}

/// Handler bound to the synthetic root body. The root entry answers end of
/// input with Accept, never with a reduction, so invoking this handler means
/// the driver or the table is broken.
pub struct RootReducer;

impl Reducer for RootReducer {
    fn reduce(&self, _args: Vec<WordDataToUser>) -> UserData {
        unreachable!("the root production is accepted, never reduced");
    }

    fn tag(&self) -> &'static str {
        "root"
    }
}

/// Registry of all handler objects of one generator.
pub struct HandlerRegistry {
    handlers: Vec<Rc<dyn Reducer>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, reducer: Rc<dyn Reducer>) -> HandlerId {
        let handler_id = HandlerId::new(self.handlers.len());
        self.handlers.push(reducer);
        handler_id
    }

    pub fn get(&self, handler_id: HandlerId) -> &Rc<dyn Reducer> {
        &self.handlers[handler_id.to_usize()]
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|handler| handler.tag())
    }
}
