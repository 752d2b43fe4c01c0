use crate::demos::driver::{parse, parse_to_string, tokenize};
use crate::demos::expression::expression_grammar;
use crate::demos::json::json_array_grammar;
use crate::{Reducer, SyntaxGenerator, UserData, WordDataToUser};
use std::rc::Rc;

struct SingleLexemeReducer;

impl Reducer for SingleLexemeReducer {
    fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
        let lexeme = args.pop().unwrap();
        Box::new(String::from_utf8(lexeme.terminal_lexeme().to_vec()).unwrap())
    }

    fn tag(&self) -> &'static str {
        "single_lexeme"
    }
}

#[test]
pub fn trivial_grammar_parsing_test() {
    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("a", "a");
    generator.add_non_terminal("S", &["a"], Rc::new(SingleLexemeReducer));
    generator.set_root("S");
    generator.construct_syntax_config();

    let accepted = parse_to_string(&generator, "a").unwrap();
    assert_eq!(accepted, "a");
    parse(&generator, b"b").expect_err("the grammar accepts only the word a");
}

#[test]
pub fn expression_precedence_parsing_test() {
    let (mut generator, journal) = expression_grammar();
    generator.construct_syntax_config();

    assert_eq!(parse_to_string(&generator, "1+2*3+4").unwrap(), "((1+(2*3))+4)");
    assert_eq!(
        journal.borrow().as_slice(),
        &["(2*3)", "(1+(2*3))", "((1+(2*3))+4)"],
        "multiplication must reduce first, additions left to right"
    );
}

#[test]
pub fn expression_right_associative_assignment_test() {
    let (mut generator, _journal) = expression_grammar();
    generator.construct_syntax_config();

    assert_eq!(
        parse_to_string(&generator, "a=1+2*3=4").unwrap(),
        "(a=((1+(2*3))=4))"
    );
}

#[test]
pub fn expression_unary_minus_test() {
    let (mut generator, _journal) = expression_grammar();
    generator.construct_syntax_config();

    // The unary role of '-' binds tighter than '*'.
    assert_eq!(parse_to_string(&generator, "-1*2").unwrap(), "((-1)*2)");
    assert_eq!(parse_to_string(&generator, "1--2").unwrap(), "(1-(-2))");
    assert_eq!(parse_to_string(&generator, "1-2-3").unwrap(), "((1-2)-3)");
}

#[test]
pub fn dangling_else_parsing_test() {
    struct IfReducer;
    impl Reducer for IfReducer {
        fn reduce(&self, args: Vec<WordDataToUser>) -> UserData {
            let condition = String::from_utf8(args[2].terminal_lexeme().to_vec()).unwrap();
            let body = args.into_iter().nth(4).unwrap().into_user_data();
            Box::new(format!(
                "(if {} {})",
                condition,
                body.downcast::<String>().unwrap()
            ))
        }
        fn tag(&self) -> &'static str {
            "if"
        }
    }

    struct IfElseReducer;
    impl Reducer for IfElseReducer {
        fn reduce(&self, args: Vec<WordDataToUser>) -> UserData {
            let condition = String::from_utf8(args[2].terminal_lexeme().to_vec()).unwrap();
            let mut bodies = args.into_iter();
            let then_body = bodies.nth(4).unwrap().into_user_data();
            let else_body = bodies.nth(1).unwrap().into_user_data();
            Box::new(format!(
                "(ifelse {} {} {})",
                condition,
                then_body.downcast::<String>().unwrap(),
                else_body.downcast::<String>().unwrap()
            ))
        }
        fn tag(&self) -> &'static str {
            "ifelse"
        }
    }

    struct StatementReducer;
    impl Reducer for StatementReducer {
        fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
            match args.pop().unwrap() {
                WordDataToUser::Terminal { .. } => Box::new(";".to_string()),
                WordDataToUser::NonTerminal(user_data) => user_data,
                WordDataToUser::Empty => unreachable!("statement bodies are never empty"),
            }
        }
        fn tag(&self) -> &'static str {
            "statement"
        }
    }

    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("Id", "[a-zA-Z_][a-zA-Z0-9_]*");
    generator.add_keyword("KwIf", "if");
    generator.add_keyword("KwElse", "else");
    generator.add_keyword("OpenParen", "(");
    generator.add_keyword("CloseParen", ")");
    generator.add_keyword("Semicolon", ";");
    generator.add_non_terminal(
        "If",
        &["KwIf", "OpenParen", "Id", "CloseParen", "Stmt"],
        Rc::new(IfReducer),
    );
    generator.add_non_terminal(
        "If",
        &["KwIf", "OpenParen", "Id", "CloseParen", "Stmt", "KwElse", "Stmt"],
        Rc::new(IfElseReducer),
    );
    generator.add_non_terminal("Stmt", &["If"], Rc::new(StatementReducer));
    generator.add_non_terminal("Stmt", &["Semicolon"], Rc::new(StatementReducer));
    generator.set_root("Stmt");
    generator.construct_syntax_config();

    // Shift preference attaches the else to the inner if.
    assert_eq!(
        parse_to_string(&generator, "if(a)if(b);else;").unwrap(),
        "(if a (ifelse b ; ;))"
    );
    assert_eq!(
        parse_to_string(&generator, "if(a);else;").unwrap(),
        "(ifelse a ; ;)"
    );
}

#[test]
pub fn empty_reducible_list_parsing_test() {
    struct CallReducer;
    impl Reducer for CallReducer {
        fn reduce(&self, args: Vec<WordDataToUser>) -> UserData {
            let callee = String::from_utf8(args[0].terminal_lexeme().to_vec()).unwrap();
            let arguments = args.into_iter().nth(2).unwrap();
            let rendered = if arguments.is_empty() {
                format!("{}()", callee)
            } else {
                format!(
                    "{}({})",
                    callee,
                    arguments.into_user_data().downcast::<String>().unwrap()
                )
            };
            Box::new(rendered)
        }
        fn tag(&self) -> &'static str {
            "call"
        }
    }

    struct FirstArgumentReducer;
    impl Reducer for FirstArgumentReducer {
        fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
            let lexeme = args.pop().unwrap();
            Box::new(String::from_utf8(lexeme.terminal_lexeme().to_vec()).unwrap())
        }
        fn tag(&self) -> &'static str {
            "first_argument"
        }
    }

    struct NextArgumentReducer;
    impl Reducer for NextArgumentReducer {
        fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
            let argument =
                String::from_utf8(args.pop().unwrap().terminal_lexeme().to_vec()).unwrap();
            args.pop();
            let arguments = args.pop().unwrap().into_user_data();
            Box::new(format!("{},{}", arguments.downcast::<String>().unwrap(), argument))
        }
        fn tag(&self) -> &'static str {
            "next_argument"
        }
    }

    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("Id", "[a-zA-Z_][a-zA-Z0-9_]*");
    generator.add_keyword("OpenParen", "(");
    generator.add_keyword("CloseParen", ")");
    generator.add_keyword("Comma", ",");
    generator.add_non_terminal("Args", &["Id"], Rc::new(FirstArgumentReducer));
    generator.add_non_terminal("Args", &["Args", "Comma", "Id"], Rc::new(NextArgumentReducer));
    generator.set_may_empty_reduct("Args");
    generator.add_non_terminal(
        "Call",
        &["Id", "OpenParen", "Args", "CloseParen"],
        Rc::new(CallReducer),
    );
    generator.set_root("Call");
    generator.construct_syntax_config();

    assert_eq!(parse_to_string(&generator, "f()").unwrap(), "f()");
    assert_eq!(parse_to_string(&generator, "f(x)").unwrap(), "f(x)");
    assert_eq!(parse_to_string(&generator, "f(x,y,z)").unwrap(), "f(x,y,z)");
    parse(&generator, b"f(x,)").expect_err("a trailing comma is not part of the grammar");
}

#[test]
pub fn forward_referenced_cyclic_grammar_test() {
    struct PairReducer;
    impl Reducer for PairReducer {
        fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
            let suffix = String::from_utf8(args.pop().unwrap().terminal_lexeme().to_vec()).unwrap();
            let base = args.pop().unwrap().into_user_data();
            Box::new(format!("{}{}", base.downcast::<String>().unwrap(), suffix))
        }
        fn tag(&self) -> &'static str {
            "pair"
        }
    }

    struct BaseReducer;
    impl Reducer for BaseReducer {
        fn reduce(&self, mut args: Vec<WordDataToUser>) -> UserData {
            match args.pop().unwrap() {
                WordDataToUser::Terminal { lexeme } => {
                    Box::new(String::from_utf8(lexeme).unwrap())
                }
                WordDataToUser::NonTerminal(user_data) => user_data,
                WordDataToUser::Empty => unreachable!("the base production is never empty"),
            }
        }
        fn tag(&self) -> &'static str {
            "base"
        }
    }

    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("c", "c");
    generator.add_terminal("d", "d");
    // A references B before B exists; B closes the cycle back to A.
    generator.add_non_terminal("A", &["B", "c"], Rc::new(PairReducer));
    generator.add_non_terminal("B", &["A"], Rc::new(BaseReducer));
    generator.add_non_terminal("B", &["d"], Rc::new(BaseReducer));
    generator.set_root("A");
    generator.construct_syntax_config();

    assert_eq!(parse_to_string(&generator, "dc").unwrap(), "dc");
    assert_eq!(parse_to_string(&generator, "dcc").unwrap(), "dcc");
    assert_eq!(parse_to_string(&generator, "dccc").unwrap(), "dccc");
    parse(&generator, b"d").expect_err("the cycle always ends through A -> B c");
}

#[test]
pub fn json_array_parsing_test() {
    let mut generator = json_array_grammar();
    generator.construct_syntax_config();

    for input in ["[]", "[1]", "[1,22,333]", "[1,[2,3],[]]", "7"] {
        let rendered = parse_to_string(&generator, input).unwrap();
        assert_eq!(rendered, input);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let expected: serde_json::Value = serde_json::from_str(input).unwrap();
        assert_eq!(parsed, expected);
    }
    parse(&generator, b"[1,]").expect_err("a trailing comma is not part of the grammar");
}

#[test]
pub fn keyword_wins_over_identifier_test() {
    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("Id", "[a-zA-Z_][a-zA-Z0-9_]*");
    generator.add_keyword("KwIf", "if");
    generator.add_non_terminal("S", &["Id"], Rc::new(SingleLexemeReducer));
    generator.set_root("S");
    generator.construct_syntax_config();

    let keyword_node_id = generator.production_node_id_from_symbol("KwIf");
    let id_node_id = generator.production_node_id_from_symbol("Id");
    let words = tokenize(generator.dfa_config(), b"if").unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word_data.node_id, keyword_node_id);

    // One byte more and the keyword loses to the longer identifier.
    let words = tokenize(generator.dfa_config(), b"iffy").unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word_data.node_id, id_node_id);
}
