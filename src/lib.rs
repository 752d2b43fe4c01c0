//! Language parsing tool (lang_lalr) is a library to generate the configuration of a bottom-up LALR(1) parser:
//! a deterministic lexer table, a shift-reduce syntax analysis table and a registry of reduction handlers.
//!
//! # Overview
//! Parser generator tools usually compile a grammar written in a generator specific language into parser source code.
//! This library instead takes the grammar as plain Rust calls: terminals are registered from byte-level regular expressions,
//! keywords and operators from literals with their precedence and associativity, and non-terminal productions
//! from lists of symbol names with a reduction handler attached to every body.
//! The generator then compiles all terminal patterns into one deterministic automaton,
//! builds the LALR(1) item sets with lookahead propagation, resolves shift/reduce conflicts from operator
//! precedence, merges equivalent table rows and writes both tables as version-stamped binary artifacts.
//! A separately linked driver consumes the artifacts together with the registered handlers to build whatever
//! data the handlers produce.
//!
//! # Design
//!
//! Grammar symbols never reference each other through pointers; every component owns an arena and hands out
//! typed indices ([ProductionNodeId], [HandlerId], ...), so cyclic grammars are registered naturally and a
//! production body may name symbols that are only registered later. Unresolved names are retried after every
//! following registration and must all resolve before the configuration is constructed.
//!
//! # Example
//!
//! ```
//! use lang_lalr::{
//!     OperatorAssociativity, Reducer, SyntaxGenerator, UserData, WordDataToUser,
//! };
//! use std::rc::Rc;
//!
//! // Handler producing the parenthesized rendering of a binary expression.
//! struct BinaryExpression;
//!
//! impl Reducer for BinaryExpression {
//!     fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
//!         let right = args.pop().unwrap().into_user_data();
//!         let operator = args.pop().unwrap();
//!         let left = args.pop().unwrap().into_user_data();
//!         Box::new(format!(
//!             "({}{}{})",
//!             left.downcast::<String>().unwrap(),
//!             String::from_utf8(operator.terminal_lexeme().to_vec()).unwrap(),
//!             right.downcast::<String>().unwrap(),
//!         ))
//!     }
//!     fn tag(&self) -> &'static str {
//!         "binary_expression"
//!     }
//! }
//!
//! // Handler passing the matched lexeme through.
//! struct Leaf;
//!
//! impl Reducer for Leaf {
//!     fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
//!         let lexeme = args.pop().unwrap();
//!         Box::new(String::from_utf8(lexeme.terminal_lexeme().to_vec()).unwrap())
//!     }
//!     fn tag(&self) -> &'static str {
//!         "leaf"
//!     }
//! }
//!
//! let mut generator = SyntaxGenerator::new();
//! generator.add_terminal("Num", "[0-9]+");
//! generator.add_binary_operator("Add", "+", OperatorAssociativity::LeftToRight, 12);
//! generator.add_binary_operator("Mul", "*", OperatorAssociativity::LeftToRight, 13);
//! generator.add_non_terminal("E", &["E", "Add", "E"], Rc::new(BinaryExpression));
//! generator.add_non_terminal("E", &["E", "Mul", "E"], Rc::new(BinaryExpression));
//! generator.add_non_terminal("E", &["Num"], Rc::new(Leaf));
//! generator.set_root("E");
//!
//! generator.construct_syntax_config();
//! assert!(generator.root_entry_id().is_valid());
//! assert!(!generator.dfa_config().rows.is_empty());
//!
//! // generator.save_config(output_dir) then persists both artifacts.
//! ```
//!
//! # License
//! [lang_lalr](crate) is provided under the MIT license.

mod config;
pub mod demos;
mod generator;
mod handler;
mod index;
pub mod lexical;
pub mod production;
pub mod syntax;
mod symbol;
mod util;

pub use config::{CONFIG_FORMAT_VERSION, DFA_CONFIG_FILE_NAME, SYNTAX_CONFIG_FILE_NAME};
pub use generator::SyntaxGenerator;
pub use handler::{HandlerRegistry, Reducer, RootReducer, UserData, WordDataToUser};
pub use index::{
    ArenaIndex, BodySymbolId, DfaStateId, HandlerId, NextWordToShiftIndex, NfaNodeId,
    ProductionBodyId, ProductionItemSetId, ProductionNodeId, SymbolId,
    SyntaxAnalysisTableEntryId, TransformArrayId,
};
pub use lexical::{DfaConfig, DfaRow, WordData};
pub use production::{OperatorAssociativity, OperatorRole, ProductionNodeKind};
pub use syntax::{Action, ReduceAttachedData, SyntaxAnalysisTableEntry};
pub use util::Log;
