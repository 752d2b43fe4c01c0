//! Assertions for the fatal grammar diagnostics.
//!
//! A fatal diagnostic ends the process, so every scenario runs in a child
//! process: the test binary re-runs itself filtered down to
//! [fatal_scenario_runner] with the scenario name in the environment, and
//! the parent asserts the nonzero exit code and the diagnostic text.

use super::NoopReducer;
use crate::SyntaxGenerator;
use std::process::Command;
use std::rc::Rc;

const SCENARIO_ENV: &str = "LANG_LALR_FATAL_SCENARIO";

fn run_fatal_scenario(scenario: &str) {
    let mut generator = SyntaxGenerator::new();
    match scenario {
        "duplicate_terminal_body" => {
            generator.add_terminal("Int", "[0-9]+");
            generator.add_terminal("Num", "[0-9]+");
        }
        "duplicate_node_symbol" => {
            generator.add_terminal("Id", "[a-z]+");
            generator.add_keyword("Id", "if");
        }
        "unresolved_forward_reference" => {
            generator.add_terminal("c", "c");
            generator.add_non_terminal("S", &["Missing", "c"], Rc::new(NoopReducer));
            generator.set_root("S");
            generator.construct_syntax_config();
        }
        "equal_priority_ambiguity" => {
            // Both patterns accept "ab" at plain word priority.
            generator.add_terminal("A", "ab");
            generator.add_terminal("B", "a(b)");
            generator.add_non_terminal("S", &["A"], Rc::new(NoopReducer));
            generator.set_root("S");
            generator.construct_syntax_config();
        }
        "reduce_reduce_conflict" => {
            generator.add_terminal("a", "a");
            generator.add_non_terminal("A", &["a"], Rc::new(NoopReducer));
            generator.add_non_terminal("B", &["a"], Rc::new(NoopReducer));
            generator.add_non_terminal("S", &["A"], Rc::new(NoopReducer));
            generator.add_non_terminal("S", &["B"], Rc::new(NoopReducer));
            generator.set_root("S");
            generator.construct_syntax_config();
        }
        "malformed_regex" => {
            generator.add_terminal("Class", "[abc");
        }
        "missing_root" => {
            generator.add_terminal("a", "a");
            generator.add_non_terminal("S", &["a"], Rc::new(NoopReducer));
            generator.construct_syntax_config();
        }
        _ => panic!("unknown fatal scenario: {}", scenario),
    }
    panic!("scenario {} finished without its fatal diagnostic", scenario);
}

/// Executes one scenario when the test binary re-runs itself as a child
/// process; a no-op in the regular test run.
#[test]
pub fn fatal_scenario_runner() {
    if let Ok(scenario) = std::env::var(SCENARIO_ENV) {
        run_fatal_scenario(&scenario);
    }
}

fn assert_fatal(scenario: &str, expected_diagnostic: &str) {
    let output = Command::new(std::env::current_exe().unwrap())
        .args(["fatal_scenario_runner", "--nocapture"])
        .env(SCENARIO_ENV, scenario)
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(1),
        "scenario {} must end the child process through the fatal sink",
        scenario
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SyntaxGenerator Error"),
        "scenario {} must print an error diagnostic, got: {}",
        scenario,
        stderr
    );
    assert!(
        stderr.contains(expected_diagnostic),
        "scenario {} diagnostic should name the cause {:?}, got: {}",
        scenario,
        expected_diagnostic,
        stderr
    );
}

#[test]
pub fn duplicate_terminal_body_is_fatal_test() {
    assert_fatal(
        "duplicate_terminal_body",
        "the same terminal body is registered twice",
    );
}

#[test]
pub fn duplicate_node_symbol_is_fatal_test() {
    assert_fatal("duplicate_node_symbol", "production name is already defined: Id");
}

#[test]
pub fn unresolved_forward_reference_is_fatal_test() {
    assert_fatal(
        "unresolved_forward_reference",
        "references undefined production: Missing",
    );
}

#[test]
pub fn equal_priority_ambiguity_is_fatal_test() {
    assert_fatal(
        "equal_priority_ambiguity",
        "two patterns of equal priority 0 accept the same input",
    );
}

#[test]
pub fn reduce_reduce_conflict_is_fatal_test() {
    assert_fatal("reduce_reduce_conflict", "reduce/reduce conflict under lookahead $");
}

#[test]
pub fn malformed_regex_is_fatal_test() {
    assert_fatal("malformed_regex", "malformed regular expression");
}

#[test]
pub fn missing_root_is_fatal_test() {
    assert_fatal("missing_root", "no root production is set");
}
