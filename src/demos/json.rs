//! A bracketed array grammar in the shape of JSON number arrays.
//!
//! The element list is empty-reducible, so `[]`, `[1]` and nested arrays
//! like `[1,[2,3],[]]` all parse; the handlers render the input back into
//! its compact textual form.

use super::{take_string, LexemeReducer, PassThroughReducer};
use crate::{Reducer, SyntaxGenerator, UserData, WordDataToUser};
use std::rc::Rc;

/// `Elements -> Value`
struct FirstElementReducer;

impl Reducer for FirstElementReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        Box::new(take_string(args.pop().unwrap()))
    }

    fn tag(&self) -> &'static str {
        "first_element"
    }
}

/// `Elements -> Elements Comma Value`
struct NextElementReducer;

impl Reducer for NextElementReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        let value = take_string(args.pop().unwrap());
        args.pop();
        let elements = take_string(args.pop().unwrap());
        Box::new(format!("{},{}", elements, value))
    }

    fn tag(&self) -> &'static str {
        "next_element"
    }
}

/// `Array -> OpenBracket Elements CloseBracket`; the elements slot is the
/// empty marker when the array is empty.
struct ArrayReducer;

impl Reducer for ArrayReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        args.pop();
        let elements = args.pop().unwrap();
        let rendered = if elements.is_empty() {
            "[]".to_string()
        } else {
            format!("[{}]", take_string(elements))
        };
        Box::new(rendered)
    }

    fn tag(&self) -> &'static str {
        "array"
    }
}

pub fn json_array_grammar() -> SyntaxGenerator {
    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("Num", "[0-9]+");
    generator.add_keyword("OpenBracket", "[");
    generator.add_keyword("CloseBracket", "]");
    generator.add_keyword("Comma", ",");
    // Value is referenced before it is registered; the registration is
    // retried once Value appears.
    generator.add_non_terminal("Elements", &["Value"], Rc::new(FirstElementReducer));
    generator.add_non_terminal(
        "Elements",
        &["Elements", "Comma", "Value"],
        Rc::new(NextElementReducer),
    );
    generator.set_may_empty_reduct("Elements");
    generator.add_non_terminal(
        "Array",
        &["OpenBracket", "Elements", "CloseBracket"],
        Rc::new(ArrayReducer),
    );
    generator.add_non_terminal("Value", &["Num"], Rc::new(LexemeReducer));
    generator.add_non_terminal("Value", &["Array"], Rc::new(PassThroughReducer));
    generator.set_root("Value");
    generator
}
