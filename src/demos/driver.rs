//! A minimal in-memory table driver used by the test suite to exercise the
//! generated configurations end to end.
//!
//! Lexing runs the DFA with maximal munch: on a stuck state the driver
//! emits the word of the last accepting row crossed and rewinds. Parsing
//! maintains a value stack parallel to the state stack; a reduction pops
//! the values matching the production body from the top, substituting the
//! empty marker where a nullable non-terminal matched nothing, invokes the
//! handler and pushes its result after the goto.

use crate::lexical::{DfaConfig, WordData};
use crate::syntax::Action;
use crate::{ProductionNodeId, SyntaxGenerator, UserData, WordDataToUser};

#[derive(Debug)]
pub(crate) struct ParsedWord {
    pub word_data: WordData,
    pub lexeme: Vec<u8>,
}

pub(crate) fn tokenize(dfa_config: &DfaConfig, input: &[u8]) -> Result<Vec<ParsedWord>, String> {
    let mut words = Vec::new();
    let mut position = 0usize;
    while position < input.len() {
        let mut row = dfa_config.start_row;
        let mut accepted: Option<(usize, WordData)> = None;
        let mut index = position;
        while index < input.len() {
            let next_row = dfa_config.rows[row.to_usize()].transitions[input[index] as usize];
            if !next_row.is_valid() {
                break;
            }
            row = next_row;
            index += 1;
            let word_data = dfa_config.rows[row.to_usize()].word_data;
            if word_data.is_word() {
                accepted = Some((index, word_data));
            }
        }
        match accepted {
            Some((end, word_data)) => {
                words.push(ParsedWord {
                    word_data,
                    lexeme: input[position..end].to_vec(),
                });
                position = end;
            }
            None => return Err(format!("no word matches the input at byte {}", position)),
        }
    }
    Ok(words)
}

pub(crate) fn parse(generator: &SyntaxGenerator, input: &[u8]) -> Result<UserData, String> {
    let words = tokenize(generator.dfa_config(), input)?;
    let syntax_table = generator.syntax_table();
    let end_node_id = generator.end_node_id();
    let mut state_stack = vec![generator.root_entry_id()];
    let mut value_stack: Vec<(ProductionNodeId, WordDataToUser)> = Vec::new();
    let mut cursor = 0usize;
    loop {
        let lookahead_node_id = match words.get(cursor) {
            Some(word) => word.word_data.node_id,
            None => end_node_id,
        };
        let entry = &syntax_table[state_stack.last().unwrap().to_usize()];
        match entry.action(lookahead_node_id) {
            Action::Shift { target } => {
                state_stack.push(*target);
                value_stack.push((
                    lookahead_node_id,
                    WordDataToUser::Terminal {
                        lexeme: words[cursor].lexeme.clone(),
                    },
                ));
                cursor += 1;
            }
            Action::Reduce(reduce) => {
                let mut collected = Vec::with_capacity(reduce.body.len());
                for &expected_node_id in reduce.body.iter().rev() {
                    let matches_top = value_stack
                        .last()
                        .map(|(node_id, _)| *node_id == expected_node_id)
                        .unwrap_or(false);
                    if matches_top {
                        collected.push(value_stack.pop().unwrap().1);
                        state_stack.pop();
                    } else {
                        collected.push(WordDataToUser::Empty);
                    }
                }
                collected.reverse();
                let user_data = generator.handlers().get(reduce.handler_id).reduce(collected);
                let goto_target = syntax_table[state_stack.last().unwrap().to_usize()]
                    .goto(reduce.reduced_node_id)
                    .ok_or_else(|| "missing goto target after reduction".to_string())?;
                state_stack.push(goto_target);
                value_stack.push((
                    reduce.reduced_node_id,
                    WordDataToUser::NonTerminal(user_data),
                ));
            }
            Action::Accept => {
                let (_, accepted) = value_stack.pop().expect("accepted with an empty value stack");
                return Ok(accepted.into_user_data());
            }
            Action::Error => {
                return Err(format!("unexpected word at position {}", cursor));
            }
        }
    }
}

/// Parse and unwrap the `String` the demo handlers produce.
pub(crate) fn parse_to_string(generator: &SyntaxGenerator, input: &str) -> Result<String, String> {
    let user_data = parse(generator, input.as_bytes())?;
    Ok(*user_data.downcast::<String>().expect("demo handlers produce strings"))
}
