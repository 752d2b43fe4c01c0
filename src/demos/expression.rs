//! A C-like expression grammar with assignment, additive, multiplicative
//! and prefix-minus operators.
//!
//! `*` binds tighter than `+`; `=` is right-associative and binds loosest;
//! `-` carries both the binary role (priority of `+`) and a tighter
//! left-unary role, so `-a*b` groups as `(-a)*b` while `a-b-c` groups as
//! `(a-b)-c`.

use super::{
    BinaryExpressionReducer, LexemeReducer, ReductionJournal, UnaryExpressionReducer,
};
use crate::{OperatorAssociativity, SyntaxGenerator};
use std::cell::RefCell;
use std::rc::Rc;

pub fn expression_grammar() -> (SyntaxGenerator, ReductionJournal) {
    let journal: ReductionJournal = Rc::new(RefCell::new(Vec::new()));
    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("Id", "[a-zA-Z_][a-zA-Z0-9_]*");
    generator.add_terminal("Num", "[0-9]+");
    generator.add_binary_operator("Assign", "=", OperatorAssociativity::RightToLeft, 2);
    generator.add_binary_operator("Add", "+", OperatorAssociativity::LeftToRight, 12);
    generator.add_binary_left_unary_operator(
        "Sub",
        "-",
        OperatorAssociativity::LeftToRight,
        12,
        OperatorAssociativity::RightToLeft,
        14,
    );
    generator.add_binary_operator("Mul", "*", OperatorAssociativity::LeftToRight, 13);
    generator.add_non_terminal(
        "E",
        &["E", "Assign", "E"],
        Rc::new(BinaryExpressionReducer::new(&journal)),
    );
    generator.add_non_terminal(
        "E",
        &["E", "Add", "E"],
        Rc::new(BinaryExpressionReducer::new(&journal)),
    );
    generator.add_non_terminal(
        "E",
        &["E", "Sub", "E"],
        Rc::new(BinaryExpressionReducer::new(&journal)),
    );
    generator.add_non_terminal(
        "E",
        &["E", "Mul", "E"],
        Rc::new(BinaryExpressionReducer::new(&journal)),
    );
    generator.add_non_terminal(
        "E",
        &["Sub", "E"],
        Rc::new(UnaryExpressionReducer::new(&journal)),
    );
    generator.add_non_terminal("E", &["Id"], Rc::new(LexemeReducer));
    generator.add_non_terminal("E", &["Num"], Rc::new(LexemeReducer));
    generator.set_root("E");
    (generator, journal)
}
