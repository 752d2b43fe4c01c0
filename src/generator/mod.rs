//! A module consists of the generator facade tying the registration API to
//! the table construction pipeline.

mod format;
mod merge;
mod table_construct;

#[cfg(test)]
mod __tests__;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::handler::{HandlerRegistry, Reducer, RootReducer};
use crate::index::{
    BodySymbolId, HandlerId, NextWordToShiftIndex, ProductionBodyId, ProductionItemSetId,
    ProductionNodeId, SymbolId, SyntaxAnalysisTableEntryId,
};
use crate::lexical::{
    DfaConfig, DfaGenerator, WordData, WordPriority, WORD_PRIORITY_KEYWORD, WORD_PRIORITY_OPERATOR,
    WORD_PRIORITY_PLAIN,
};
use crate::production::{
    NonTerminalNode, OperatorAssociativity, OperatorNode, OperatorRole, ProductionNode,
    TerminalNode,
};
use crate::symbol::SymbolTable;
use crate::syntax::{ProductionItem, ProductionItemSet, SyntaxAnalysisTableEntry};
use crate::util::{fatal, Log};

/// Shape every registered production name must have.
static NODE_SYMBOL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());

/// Name reserved for the synthetic root production; rejected by
/// [NODE_SYMBOL_PATTERN] for user registrations.
const INNER_ROOT_SYMBOL: &str = "@root";

/// A non-terminal registration waiting for a forward-referenced body symbol.
struct PendingNonTerminal {
    node_symbol: String,
    body_symbols: Vec<String>,
    handler_id: HandlerId,
}

/// Generator compiling a declarative grammar into a serialized lexer table,
/// an LALR(1) syntax analysis table and a registry of reduction handlers.
///
/// A program may hold several independent generators; one instance must stay
/// on one thread.
pub struct SyntaxGenerator {
    manager_node_symbol: SymbolTable<SymbolId>,
    manager_body_symbol: SymbolTable<BodySymbolId>,
    manager_nodes: Vec<ProductionNode>,
    node_symbol_id_to_node_id: HashMap<SymbolId, ProductionNodeId>,
    body_symbol_id_to_node_id: HashMap<BodySymbolId, ProductionNodeId>,
    undefined_productions: HashMap<String, Vec<PendingNonTerminal>>,
    production_item_sets: Vec<ProductionItemSet>,
    item_to_main_item_sets: HashMap<ProductionItem, Vec<ProductionItemSetId>>,
    entry_id_to_item_set_id: HashMap<SyntaxAnalysisTableEntryId, ProductionItemSetId>,
    syntax_analysis_table: Vec<SyntaxAnalysisTableEntry>,
    root_production_node_id: ProductionNodeId,
    inner_root_node_id: ProductionNodeId,
    end_node_id: ProductionNodeId,
    root_entry_id: SyntaxAnalysisTableEntryId,
    manager_handlers: HandlerRegistry,
    dfa_generator: DfaGenerator,
    debugger: OnceCell<Log<&'static str>>,
    constructed: bool,
}

impl SyntaxGenerator {
    pub fn new() -> Self {
        Self {
            manager_node_symbol: SymbolTable::new(),
            manager_body_symbol: SymbolTable::new(),
            manager_nodes: Vec::new(),
            node_symbol_id_to_node_id: HashMap::new(),
            body_symbol_id_to_node_id: HashMap::new(),
            undefined_productions: HashMap::new(),
            production_item_sets: Vec::new(),
            item_to_main_item_sets: HashMap::new(),
            entry_id_to_item_set_id: HashMap::new(),
            syntax_analysis_table: Vec::new(),
            root_production_node_id: ProductionNodeId::INVALID,
            inner_root_node_id: ProductionNodeId::INVALID,
            end_node_id: ProductionNodeId::INVALID,
            root_entry_id: SyntaxAnalysisTableEntryId::INVALID,
            manager_handlers: HandlerRegistry::new(),
            dfa_generator: DfaGenerator::new(),
            debugger: OnceCell::new(),
            constructed: false,
        }
    }

    /// Set a log label to trace the table construction.
    ///
    /// [Log::Conflicts] traces the shift/reduce conflicts settled by
    /// preference; [Log::ItemSets] additionally traces every item-set
    /// closure as it is recomputed.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub(crate) fn debugger(&self) -> Option<&Log<&'static str>> {
        self.debugger.get()
    }

    /// Register a plain terminal from a regular expression; word priority 0.
    pub fn add_terminal(&mut self, node_symbol: &str, regex: &str) -> ProductionNodeId {
        self.add_terminal_production(node_symbol, regex, WORD_PRIORITY_PLAIN, true)
    }

    /// Register a keyword. The literal is not interpreted as a regular
    /// expression and wins over any overlapping plain terminal.
    pub fn add_keyword(&mut self, node_symbol: &str, key_word: &str) -> ProductionNodeId {
        self.add_terminal_production(node_symbol, key_word, WORD_PRIORITY_KEYWORD, false)
    }

    /// Register an operator holding only the binary role.
    pub fn add_binary_operator(
        &mut self,
        node_symbol: &str,
        operator_symbol: &str,
        associativity: OperatorAssociativity,
        priority: u16,
    ) -> ProductionNodeId {
        self.add_operator_production(
            node_symbol,
            operator_symbol,
            Some(OperatorRole {
                associativity,
                priority,
            }),
            None,
        )
    }

    /// Register an operator holding only the left-unary role.
    pub fn add_left_unary_operator(
        &mut self,
        node_symbol: &str,
        operator_symbol: &str,
        associativity: OperatorAssociativity,
        priority: u16,
    ) -> ProductionNodeId {
        self.add_operator_production(
            node_symbol,
            operator_symbol,
            None,
            Some(OperatorRole {
                associativity,
                priority,
            }),
        )
    }

    /// Register one operator node carrying both the binary and the
    /// left-unary semantic.
    pub fn add_binary_left_unary_operator(
        &mut self,
        node_symbol: &str,
        operator_symbol: &str,
        binary_associativity: OperatorAssociativity,
        binary_priority: u16,
        unary_associativity: OperatorAssociativity,
        unary_priority: u16,
    ) -> ProductionNodeId {
        self.add_operator_production(
            node_symbol,
            operator_symbol,
            Some(OperatorRole {
                associativity: binary_associativity,
                priority: binary_priority,
            }),
            Some(OperatorRole {
                associativity: unary_associativity,
                priority: unary_priority,
            }),
        )
    }

    /// Register one body of a non-terminal production.
    ///
    /// Body names may reference productions registered later; unresolved
    /// references are retried after every following registration and must
    /// all resolve before [construct_syntax_config](Self::construct_syntax_config).
    /// The reducer becomes the reduction handler of exactly this body.
    pub fn add_non_terminal(
        &mut self,
        node_symbol: &str,
        body_symbols: &[&str],
        reducer: Rc<dyn Reducer>,
    ) -> ProductionNodeId {
        self.validate_node_symbol(node_symbol);
        if body_symbols.is_empty() {
            fatal(format!(
                "non-terminal production {} is registered with an empty body",
                node_symbol
            ));
        }
        for body_symbol in body_symbols {
            if !NODE_SYMBOL_PATTERN.is_match(body_symbol) {
                fatal(format!(
                    "production {} references an invalid symbol name: {:?}",
                    node_symbol, body_symbol
                ));
            }
        }
        let handler_id = self.manager_handlers.register(reducer);
        self.sub_add_non_terminal_production(
            node_symbol.to_string(),
            body_symbols.iter().map(|name| name.to_string()).collect(),
            handler_id,
        )
    }

    /// Mark a registered non-terminal as reducible from no input at all.
    pub fn set_may_empty_reduct(&mut self, node_symbol: &str) {
        let node_id = self.production_node_id_from_symbol(node_symbol);
        if !node_id.is_valid() {
            fatal(format!(
                "cannot mark an unregistered production as empty-reducible: {}",
                node_symbol
            ));
        }
        match &mut self.manager_nodes[node_id.to_usize()] {
            ProductionNode::NonTerminal(node) => node.set_may_empty_reduct(),
            _ => fatal(format!(
                "only non-terminal productions can reduce from nothing: {}",
                node_symbol
            )),
        }
    }

    /// Choose the root production of the grammar.
    pub fn set_root(&mut self, node_symbol: &str) {
        let node_id = self.production_node_id_from_symbol(node_symbol);
        if !node_id.is_valid() {
            fatal(format!("root production is not defined: {}", node_symbol));
        }
        self.root_production_node_id = node_id;
    }

    /// Build the lexer table and the syntax analysis table in memory.
    ///
    /// All grammar errors surface here as fatal diagnostics; afterwards the
    /// constructed tables are available through the accessors and
    /// [save_config](Self::save_config).
    pub fn construct_syntax_config(&mut self) {
        assert!(!self.constructed, "the configuration is already constructed");
        self.check_undefined_production_remained();
        if !self.root_production_node_id.is_valid() {
            fatal("no root production is set".to_string());
        }
        // Synthetic pieces: the end sentinel and the root wrapper whose only
        // body derives the user root.
        let end_node_id = self.emplace_node(ProductionNode::End);
        self.end_node_id = end_node_id;
        self.dfa_generator
            .set_end_of_file_word_data(WordData::end(end_node_id));
        let root_handler_id = self.manager_handlers.register(Rc::new(RootReducer));
        let (inner_root_symbol_id, inserted) =
            self.manager_node_symbol.intern(INNER_ROOT_SYMBOL);
        assert!(inserted);
        let mut inner_root = NonTerminalNode::new(inner_root_symbol_id);
        inner_root.add_body(vec![self.root_production_node_id], root_handler_id);
        let inner_root_node_id = self.emplace_node(ProductionNode::NonTerminal(inner_root));
        self.node_symbol_id_to_node_id
            .insert(inner_root_symbol_id, inner_root_node_id);
        self.inner_root_node_id = inner_root_node_id;

        self.dfa_generator.construct();
        self.syntax_analysis_table_construct();
        self.syntax_analysis_table_merge_optimize();
        self.constructed = true;
    }

    /// Write `dfa_config.bin` and `syntax_config.bin` into `output_dir`.
    pub fn save_config(&self, output_dir: &Path) -> io::Result<()> {
        assert!(self.constructed, "the configuration is not constructed yet");
        crate::config::save_dfa_config(self.dfa_generator.config(), output_dir)?;
        crate::config::save_syntax_config(
            &self.syntax_analysis_table,
            self.root_entry_id,
            &self.manager_handlers,
            output_dir,
        )
    }

    /// Construct the configuration and persist both artifacts.
    pub fn finalize(&mut self, output_dir: &Path) -> io::Result<()> {
        self.construct_syntax_config();
        self.save_config(output_dir)
    }

    /// The constructed lexer table.
    pub fn dfa_config(&self) -> &DfaConfig {
        self.dfa_generator.config()
    }

    /// The constructed syntax analysis table.
    pub fn syntax_table(&self) -> &Vec<SyntaxAnalysisTableEntry> {
        &self.syntax_analysis_table
    }

    pub fn root_entry_id(&self) -> SyntaxAnalysisTableEntryId {
        self.root_entry_id
    }

    pub fn end_node_id(&self) -> ProductionNodeId {
        self.end_node_id
    }

    /// Handler registry backing the constructed table.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.manager_handlers
    }

    /// Node id of a registered production name, or the invalid sentinel.
    pub fn production_node_id_from_symbol(&self, node_symbol: &str) -> ProductionNodeId {
        let symbol_id = self.manager_node_symbol.get(node_symbol);
        if !symbol_id.is_valid() {
            return ProductionNodeId::INVALID;
        }
        self.node_symbol_id_to_node_id
            .get(&symbol_id)
            .copied()
            .unwrap_or(ProductionNodeId::INVALID)
    }

    pub(crate) fn production_node(&self, node_id: ProductionNodeId) -> &ProductionNode {
        &self.manager_nodes[node_id.to_usize()]
    }

    pub(crate) fn inner_root_node_id(&self) -> ProductionNodeId {
        self.inner_root_node_id
    }

    /// Production node at `next_word_to_shift_index` of the given body, or
    /// the invalid sentinel when the position is past the body end.
    pub(crate) fn production_node_id_in_body(
        &self,
        production_node_id: ProductionNodeId,
        production_body_id: ProductionBodyId,
        next_word_to_shift_index: NextWordToShiftIndex,
    ) -> ProductionNodeId {
        let body = self
            .production_node(production_node_id)
            .as_non_terminal()
            .body(production_body_id);
        body.symbols
            .get(next_word_to_shift_index.to_usize())
            .copied()
            .unwrap_or(ProductionNodeId::INVALID)
    }

    fn validate_node_symbol(&self, node_symbol: &str) {
        if !NODE_SYMBOL_PATTERN.is_match(node_symbol) {
            fatal(format!("invalid production name: {:?}", node_symbol));
        }
    }

    fn emplace_node(&mut self, node: ProductionNode) -> ProductionNodeId {
        let node_id = ProductionNodeId::new(self.manager_nodes.len());
        self.manager_nodes.push(node);
        node_id
    }

    /// Shared path of terminal and keyword registration.
    fn add_terminal_production(
        &mut self,
        node_symbol: &str,
        body_symbol: &str,
        word_priority: WordPriority,
        regex_allowed: bool,
    ) -> ProductionNodeId {
        self.validate_node_symbol(node_symbol);
        if body_symbol.is_empty() {
            fatal(format!("terminal {} has an empty body", node_symbol));
        }
        let (node_symbol_id, _) = self.manager_node_symbol.intern(node_symbol);
        if self.node_symbol_id_to_node_id.contains_key(&node_symbol_id) {
            fatal(format!("production name is already defined: {}", node_symbol));
        }
        let (body_symbol_id, body_inserted) = self.manager_body_symbol.intern(body_symbol);
        if !body_inserted {
            fatal(format!(
                "the same terminal body is registered twice: {:?}",
                body_symbol
            ));
        }
        let node_id = self.emplace_node(ProductionNode::Terminal(TerminalNode {
            node_symbol_id,
            body_symbol_id,
        }));
        self.node_symbol_id_to_node_id.insert(node_symbol_id, node_id);
        self.body_symbol_id_to_node_id.insert(body_symbol_id, node_id);
        let word_data = WordData::terminal(node_id);
        if regex_allowed {
            self.dfa_generator.add_regex(body_symbol, word_data, word_priority);
        } else {
            self.dfa_generator
                .add_keyword(body_symbol, word_data, word_priority);
        }
        self.check_non_terminal_node_can_continue(node_symbol);
        node_id
    }

    fn add_operator_production(
        &mut self,
        node_symbol: &str,
        operator_symbol: &str,
        binary: Option<OperatorRole>,
        unary: Option<OperatorRole>,
    ) -> ProductionNodeId {
        self.validate_node_symbol(node_symbol);
        if operator_symbol.is_empty() {
            fatal(format!("operator {} has an empty symbol", node_symbol));
        }
        let (node_symbol_id, _) = self.manager_node_symbol.intern(node_symbol);
        if self.node_symbol_id_to_node_id.contains_key(&node_symbol_id) {
            fatal(format!("production name is already defined: {}", node_symbol));
        }
        let (body_symbol_id, body_inserted) = self.manager_body_symbol.intern(operator_symbol);
        if !body_inserted {
            fatal(format!(
                "operator symbol is already registered: {:?}",
                operator_symbol
            ));
        }
        let node_id = self.emplace_node(ProductionNode::Operator(OperatorNode {
            node_symbol_id,
            body_symbol_id,
            binary,
            unary,
        }));
        self.node_symbol_id_to_node_id.insert(node_symbol_id, node_id);
        self.body_symbol_id_to_node_id.insert(body_symbol_id, node_id);
        let word_data = WordData::operator(node_id, binary, unary);
        self.dfa_generator
            .add_keyword(operator_symbol, word_data, WORD_PRIORITY_OPERATOR);
        self.check_non_terminal_node_can_continue(node_symbol);
        node_id
    }

    /// Resolve a non-terminal body; unresolved forward references park the
    /// registration until the missing name appears.
    fn sub_add_non_terminal_production(
        &mut self,
        node_symbol: String,
        body_symbols: Vec<String>,
        handler_id: HandlerId,
    ) -> ProductionNodeId {
        let node_id = match self.production_node_id_from_symbol(&node_symbol) {
            id if id.is_valid() => {
                if self.manager_nodes[id.to_usize()].try_non_terminal().is_none() {
                    fatal(format!("production name is already defined: {}", node_symbol));
                }
                id
            }
            _ => {
                let (node_symbol_id, _) = self.manager_node_symbol.intern(&node_symbol);
                let node_id = self.emplace_node(ProductionNode::NonTerminal(NonTerminalNode::new(
                    node_symbol_id,
                )));
                self.node_symbol_id_to_node_id.insert(node_symbol_id, node_id);
                self.check_non_terminal_node_can_continue(&node_symbol);
                node_id
            }
        };
        let mut resolved_body = Vec::with_capacity(body_symbols.len());
        let mut undefined_symbol: Option<String> = None;
        for body_symbol in &body_symbols {
            let body_node_id = self.production_node_id_from_symbol(body_symbol);
            if !body_node_id.is_valid() {
                undefined_symbol = Some(body_symbol.clone());
                break;
            }
            resolved_body.push(body_node_id);
        }
        if let Some(undefined_symbol) = undefined_symbol {
            self.add_unable_continue_non_terminal_node(
                undefined_symbol,
                PendingNonTerminal {
                    node_symbol,
                    body_symbols,
                    handler_id,
                },
            );
            return node_id;
        }
        self.manager_nodes[node_id.to_usize()]
            .as_non_terminal_mut()
            .add_body(resolved_body, handler_id);
        node_id
    }

    fn add_unable_continue_non_terminal_node(
        &mut self,
        undefined_symbol: String,
        pending: PendingNonTerminal,
    ) {
        self.undefined_productions
            .entry(undefined_symbol)
            .or_insert_with(Vec::new)
            .push(pending);
    }

    /// Retry every parked registration waiting for `node_symbol`, iterating
    /// to fixpoint through the recursive retries.
    fn check_non_terminal_node_can_continue(&mut self, node_symbol: &str) {
        let Some(pending_list) = self.undefined_productions.remove(node_symbol) else {
            return;
        };
        for pending in pending_list {
            self.sub_add_non_terminal_production(
                pending.node_symbol,
                pending.body_symbols,
                pending.handler_id,
            );
        }
    }

    /// Fatal when any forward reference stayed unresolved.
    fn check_undefined_production_remained(&self) {
        if self.undefined_productions.is_empty() {
            return;
        }
        let mut message = String::from("unresolved production references remain:");
        let mut undefined_symbols: Vec<&String> = self.undefined_productions.keys().collect();
        undefined_symbols.sort();
        for undefined_symbol in undefined_symbols {
            for pending in &self.undefined_productions[undefined_symbol] {
                message.push_str(&format!(
                    "\nproduction: {} body: {} references undefined production: {}",
                    pending.node_symbol,
                    pending.body_symbols.join(" "),
                    undefined_symbol
                ));
            }
        }
        fatal(message);
    }
}
