mod fatal_test;

use crate::demos::expression::expression_grammar;
use crate::demos::json::json_array_grammar;
use crate::index::ProductionItemSetId;
use crate::syntax::Action;
use crate::{ProductionNodeId, SyntaxGenerator};
use std::rc::Rc;

struct NoopReducer;

impl crate::Reducer for NoopReducer {
    fn reduce(&self, _args: Vec<crate::WordDataToUser>) -> crate::UserData {
        Box::new(())
    }

    fn tag(&self) -> &'static str {
        "noop"
    }
}

#[test]
pub fn merged_table_targets_stay_in_range_test() {
    let (mut generator, _journal) = expression_grammar();
    generator.construct_syntax_config();

    let table = generator.syntax_table();
    assert!(generator.root_entry_id().to_usize() < table.len());
    for entry in table {
        for action in entry.actions().values() {
            if let Action::Shift { target } = action {
                assert!(target.to_usize() < table.len());
            }
        }
        for target in entry.gotos().values() {
            assert!(target.to_usize() < table.len());
        }
    }
}

#[test]
pub fn merged_table_has_no_equivalent_rows_test() {
    let (mut generator, _journal) = expression_grammar();
    generator.construct_syntax_config();

    let table = generator.syntax_table();
    let node_count = generator.manager_nodes.len();
    assert!(node_count > 0);
    for first_index in 0..table.len() {
        for second_index in (first_index + 1)..table.len() {
            let first = &table[first_index];
            let second = &table[second_index];
            let equivalent = (0..node_count).all(|node_index| {
                let node_id = ProductionNodeId::new(node_index);
                first.action(node_id) == second.action(node_id)
                    && first.goto(node_id) == second.goto(node_id)
            });
            assert!(
                !equivalent,
                "rows {} and {} respond identically and should have merged",
                first_index, second_index
            );
        }
    }
}

#[test]
pub fn closure_recomputation_is_idempotent_test() {
    let (mut generator, _journal) = expression_grammar();
    generator.construct_syntax_config();

    let table_before = generator.syntax_table().clone();
    let item_set_count = generator.production_item_sets.len();
    for item_set_index in 0..item_set_count {
        let recomputed =
            generator.production_item_set_closure(ProductionItemSetId::new(item_set_index));
        assert!(!recomputed, "a valid closure must not be recomputed");
    }
    assert_eq!(&table_before, generator.syntax_table());
}

#[test]
pub fn identical_grammars_construct_identical_tables_test() {
    let mut first = json_array_grammar();
    let mut second = json_array_grammar();
    first.construct_syntax_config();
    second.construct_syntax_config();

    assert_eq!(first.root_entry_id(), second.root_entry_id());
    assert_eq!(first.syntax_table().len(), second.syntax_table().len());
    assert_eq!(first.dfa_config().rows.len(), second.dfa_config().rows.len());
    for (first_entry, second_entry) in first
        .syntax_table()
        .iter()
        .zip(second.syntax_table().iter())
    {
        assert_eq!(first_entry, second_entry);
    }
}

#[test]
pub fn item_set_dump_smoke_test() {
    let mut generator = json_array_grammar();
    generator.set_log(crate::Log::ItemSets("json")).unwrap();
    generator
        .set_log(crate::Log::None)
        .expect_err("the log label is assigned once");
    generator.construct_syntax_config();
    generator.print_item_sets().unwrap();
}

#[test]
pub fn handler_registry_keeps_registration_order_test() {
    let mut generator = SyntaxGenerator::new();
    generator.add_terminal("x", "x");
    generator.add_non_terminal("S", &["x"], Rc::new(NoopReducer));
    generator.set_root("S");
    generator.construct_syntax_config();

    // The user handler comes first, the synthetic root handler is appended
    // during construction.
    let tags: Vec<&'static str> = generator.handlers().tags().collect();
    assert_eq!(tags, vec!["noop", "root"]);
}

#[test]
pub fn production_lookup_test() {
    let mut generator = SyntaxGenerator::new();
    let x_id = generator.add_terminal("x", "x");
    assert_eq!(generator.production_node_id_from_symbol("x"), x_id);
    assert!(!generator.production_node_id_from_symbol("missing").is_valid());
}
