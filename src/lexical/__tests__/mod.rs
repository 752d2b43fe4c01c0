use crate::demos::driver::tokenize;
use crate::lexical::{
    DfaGenerator, WordData, WORD_PRIORITY_KEYWORD, WORD_PRIORITY_PLAIN,
};
use crate::ProductionNodeId;

fn word(index: usize) -> WordData {
    WordData::terminal(ProductionNodeId::new(index))
}

fn lex_single(generator: &DfaGenerator, input: &[u8]) -> WordData {
    let words = tokenize(generator.config(), input).unwrap();
    assert_eq!(words.len(), 1, "{:?} should lex into one word", input);
    assert_eq!(words[0].lexeme, input);
    words[0].word_data
}

#[test]
pub fn identifier_regex_test() {
    let mut generator = DfaGenerator::new();
    generator.add_regex("[a-zA-Z_][a-zA-Z0-9_]*", word(1), WORD_PRIORITY_PLAIN);
    generator.construct();

    assert_eq!(lex_single(&generator, b"abc").node_id, ProductionNodeId::new(1));
    assert_eq!(lex_single(&generator, b"_x9Z").node_id, ProductionNodeId::new(1));
    tokenize(generator.config(), b"9abc").expect_err("a digit cannot start an identifier");
}

#[test]
pub fn quantifier_and_group_test() {
    let mut generator = DfaGenerator::new();
    generator.add_regex("a(bc)+d?", word(1), WORD_PRIORITY_PLAIN);
    generator.construct();

    lex_single(&generator, b"abc");
    lex_single(&generator, b"abcbc");
    lex_single(&generator, b"abcbcd");
    tokenize(generator.config(), b"ad").expect_err("the group is not optional");
}

#[test]
pub fn escape_and_any_byte_test() {
    let mut generator = DfaGenerator::new();
    generator.add_regex("x\\*.", word(1), WORD_PRIORITY_PLAIN);
    generator.construct();

    lex_single(&generator, b"x*a");
    lex_single(&generator, b"x*.");
    lex_single(&generator, b"x*\xff");
    tokenize(generator.config(), b"xa").expect_err("the star must appear literally");
}

#[test]
pub fn character_class_literal_dash_test() {
    let mut generator = DfaGenerator::new();
    generator.add_regex("[-+]7", word(1), WORD_PRIORITY_PLAIN);
    generator.construct();

    lex_single(&generator, b"-7");
    lex_single(&generator, b"+7");
    tokenize(generator.config(), b",7").expect_err("the class holds only - and +");
}

#[test]
pub fn merge_optimization_self_loop_pattern_test() {
    // Chained stars build ε self-loops once the merge optimization folds
    // the chain; the fold must neither drop the loop nor diverge.
    let mut generator = DfaGenerator::new();
    generator.add_regex("aa*a*", word(1), WORD_PRIORITY_PLAIN);
    generator.construct();

    lex_single(&generator, b"a");
    lex_single(&generator, b"aa");
    lex_single(&generator, b"aaaaaa");
    tokenize(generator.config(), b"b").expect_err("only runs of a are words");
}

#[test]
pub fn keyword_priority_over_regex_test() {
    let mut generator = DfaGenerator::new();
    generator.add_regex("[a-z]+", word(1), WORD_PRIORITY_PLAIN);
    generator.add_keyword("while", word(2), WORD_PRIORITY_KEYWORD);
    generator.construct();

    assert_eq!(lex_single(&generator, b"while").node_id, ProductionNodeId::new(2));
    assert_eq!(lex_single(&generator, b"whilst").node_id, ProductionNodeId::new(1));
}

#[test]
pub fn maximal_munch_rewind_test() {
    let mut generator = DfaGenerator::new();
    generator.add_keyword("ab", word(1), WORD_PRIORITY_KEYWORD);
    generator.add_regex("a", word(2), WORD_PRIORITY_PLAIN);
    generator.construct();

    // The second a starts ab; the first match must rewind to the short word.
    let words = tokenize(generator.config(), b"aab").unwrap();
    let node_ids: Vec<ProductionNodeId> =
        words.iter().map(|parsed| parsed.word_data.node_id).collect();
    assert_eq!(
        node_ids,
        vec![ProductionNodeId::new(2), ProductionNodeId::new(1)]
    );
}

#[test]
pub fn transition_table_is_total_test() {
    let mut generator = DfaGenerator::new();
    generator.add_regex("[0-9]+", word(1), WORD_PRIORITY_PLAIN);
    generator.add_regex("[a-z]+", word(2), WORD_PRIORITY_PLAIN);
    generator.construct();

    let config = generator.config();
    assert!(config.start_row.to_usize() < config.rows.len());
    for row in &config.rows {
        for transition in &row.transitions {
            assert!(!transition.is_valid() || transition.to_usize() < config.rows.len());
        }
    }
}

#[test]
pub fn minimization_collapses_equivalent_states_test() {
    // After the first z the automaton loops on a; subset construction
    // yields two accepting states which behave identically and collapse
    // into one row.
    let mut generator = DfaGenerator::new();
    generator.add_regex("za*", word(1), WORD_PRIORITY_PLAIN);
    generator.construct();

    assert_eq!(generator.config().rows.len(), 2);
    lex_single(&generator, b"z");
    lex_single(&generator, b"zaaa");
}
