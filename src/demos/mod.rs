//! Ready-made grammars used by the documentation and the test suite.
//!
//! Each demo returns a fully registered [SyntaxGenerator](crate::SyntaxGenerator)
//! whose reduction handlers render the parsed input back into a plain
//! string, together with a shared journal recording every reduction in the
//! order it was performed.

pub mod expression;
pub mod json;

#[cfg(test)]
pub(crate) mod driver;

#[cfg(test)]
mod __tests__;

use crate::{Reducer, UserData, WordDataToUser};
use std::cell::RefCell;
use std::rc::Rc;

/// Journal of reductions shared between the handlers of one demo grammar.
pub type ReductionJournal = Rc<RefCell<Vec<String>>>;

/// Handler rendering `left operator right` as `(left operator right)`.
pub struct BinaryExpressionReducer {
    journal: ReductionJournal,
}

impl BinaryExpressionReducer {
    pub fn new(journal: &ReductionJournal) -> Self {
        Self {
            journal: Rc::clone(journal),
        }
    }
}

impl Reducer for BinaryExpressionReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        let right = take_string(args.pop().unwrap());
        let operator_lexeme = args.pop().unwrap();
        let operator = String::from_utf8(operator_lexeme.terminal_lexeme().to_vec()).unwrap();
        let left = take_string(args.pop().unwrap());
        let rendered = format!("({}{}{})", left, operator, right);
        self.journal.borrow_mut().push(rendered.clone());
        Box::new(rendered)
    }

    fn tag(&self) -> &'static str {
        "binary_expression"
    }
}

/// Handler rendering a prefix `operator operand` as `(operator operand)`.
pub struct UnaryExpressionReducer {
    journal: ReductionJournal,
}

impl UnaryExpressionReducer {
    pub fn new(journal: &ReductionJournal) -> Self {
        Self {
            journal: Rc::clone(journal),
        }
    }
}

impl Reducer for UnaryExpressionReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        let operand = take_string(args.pop().unwrap());
        let operator_lexeme = args.pop().unwrap();
        let operator = String::from_utf8(operator_lexeme.terminal_lexeme().to_vec()).unwrap();
        let rendered = format!("({}{})", operator, operand);
        self.journal.borrow_mut().push(rendered.clone());
        Box::new(rendered)
    }

    fn tag(&self) -> &'static str {
        "unary_expression"
    }
}

/// Handler passing the matched lexeme of a single terminal through.
pub struct LexemeReducer;

impl Reducer for LexemeReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        let lexeme = args.pop().unwrap();
        Box::new(String::from_utf8(lexeme.terminal_lexeme().to_vec()).unwrap())
    }

    fn tag(&self) -> &'static str {
        "lexeme"
    }
}

/// Handler forwarding the data of its only non-terminal slot.
pub struct PassThroughReducer;

impl Reducer for PassThroughReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        args.pop().unwrap().into_user_data()
    }

    fn tag(&self) -> &'static str {
        "pass_through"
    }
}

pub(crate) fn take_string(word_data: WordDataToUser) -> String {
    *word_data
        .into_user_data()
        .downcast::<String>()
        .expect("demo handlers produce strings")
}
