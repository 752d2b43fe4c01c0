//! Binary persistence of the generated configuration.
//!
//! Two artifacts are written side by side: the lexer table
//! (`dfa_config.bin`) and the syntax analysis table with the handler
//! registry (`syntax_config.bin`). All integers are little-endian, ids are
//! `u32` and the all-ones value is the invalid sentinel of every id type.
//! Both files start with a `u32` format version.

use crate::handler::HandlerRegistry;
use crate::index::{ProductionNodeId, SyntaxAnalysisTableEntryId};
use crate::lexical::{DfaConfig, WordData};
use crate::production::{OperatorAssociativity, OperatorRole, ProductionNodeKind};
use crate::syntax::{Action, SyntaxAnalysisTableEntry};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Version stamp written at the head of both artifacts.
pub const CONFIG_FORMAT_VERSION: u32 = 1;

pub const DFA_CONFIG_FILE_NAME: &str = "dfa_config.bin";
pub const SYNTAX_CONFIG_FILE_NAME: &str = "syntax_config.bin";

const ACTION_TAG_ERROR: u8 = 0;
const ACTION_TAG_SHIFT: u8 = 1;
const ACTION_TAG_REDUCE: u8 = 2;
const ACTION_TAG_ACCEPT: u8 = 3;

const ROLE_MASK_BINARY: u8 = 1;
const ROLE_MASK_UNARY: u8 = 2;

struct ConfigWriter<W: Write> {
    sink: W,
}

impl<W: Write> ConfigWriter<W> {
    fn new(sink: W) -> Self {
        Self { sink }
    }

    fn put_u8(&mut self, value: u8) -> io::Result<()> {
        self.sink.write_all(&[value])
    }

    fn put_u16(&mut self, value: u16) -> io::Result<()> {
        self.sink.write_all(&value.to_le_bytes())
    }

    fn put_u32(&mut self, value: u32) -> io::Result<()> {
        self.sink.write_all(&value.to_le_bytes())
    }

    fn put_bytes(&mut self, value: &[u8]) -> io::Result<()> {
        self.sink.write_all(value)
    }

    fn put_word_data(&mut self, word_data: &WordData) -> io::Result<()> {
        self.put_u32(word_data.node_id.to_raw())?;
        self.put_u8(kind_tag(word_data.kind))?;
        self.put_u32(word_data.handler_id.to_raw())?;
        if word_data.kind == ProductionNodeKind::Operator {
            let mut role_mask = 0u8;
            if word_data.binary.is_some() {
                role_mask |= ROLE_MASK_BINARY;
            }
            if word_data.unary.is_some() {
                role_mask |= ROLE_MASK_UNARY;
            }
            self.put_u8(role_mask)?;
            if let Some(role) = &word_data.binary {
                self.put_operator_role(role)?;
            }
            if let Some(role) = &word_data.unary {
                self.put_operator_role(role)?;
            }
        }
        Ok(())
    }

    fn put_operator_role(&mut self, role: &OperatorRole) -> io::Result<()> {
        self.put_u8(match role.associativity {
            OperatorAssociativity::LeftToRight => 0,
            OperatorAssociativity::RightToLeft => 1,
        })?;
        self.put_u16(role.priority)
    }

    fn put_action(&mut self, action: &Action) -> io::Result<()> {
        match action {
            Action::Error => self.put_u8(ACTION_TAG_ERROR),
            Action::Shift { target } => {
                self.put_u8(ACTION_TAG_SHIFT)?;
                self.put_u32(target.to_raw())
            }
            Action::Reduce(reduce) => {
                self.put_u8(ACTION_TAG_REDUCE)?;
                self.put_u32(reduce.handler_id.to_raw())?;
                self.put_u32(reduce.body.len() as u32)?;
                self.put_u32(reduce.reduced_node_id.to_raw())
            }
            Action::Accept => self.put_u8(ACTION_TAG_ACCEPT),
        }
    }
}

fn kind_tag(kind: ProductionNodeKind) -> u8 {
    match kind {
        ProductionNodeKind::Terminal => 0,
        ProductionNodeKind::Operator => 1,
        ProductionNodeKind::NonTerminal => 2,
        ProductionNodeKind::End => 3,
    }
}

/// Write the lexer table artifact.
pub(crate) fn save_dfa_config(dfa_config: &DfaConfig, output_dir: &Path) -> io::Result<()> {
    let file = File::create(output_dir.join(DFA_CONFIG_FILE_NAME))?;
    let mut writer = ConfigWriter::new(BufWriter::new(file));
    writer.put_u32(CONFIG_FORMAT_VERSION)?;
    writer.put_u32(dfa_config.rows.len() as u32)?;
    for row in &dfa_config.rows {
        for transition in &row.transitions {
            writer.put_u32(transition.to_raw())?;
        }
        writer.put_word_data(&row.word_data)?;
    }
    writer.put_u32(dfa_config.start_row.to_raw())?;
    writer.put_word_data(&dfa_config.eof_word_data)?;
    writer.sink.flush()
}

/// Write the syntax table artifact followed by the tag-prefixed handler
/// registry.
pub(crate) fn save_syntax_config(
    syntax_analysis_table: &[SyntaxAnalysisTableEntry],
    root_entry_id: SyntaxAnalysisTableEntryId,
    handlers: &HandlerRegistry,
    output_dir: &Path,
) -> io::Result<()> {
    let file = File::create(output_dir.join(SYNTAX_CONFIG_FILE_NAME))?;
    let mut writer = ConfigWriter::new(BufWriter::new(file));
    writer.put_u32(CONFIG_FORMAT_VERSION)?;
    writer.put_u32(root_entry_id.to_raw())?;
    writer.put_u32(syntax_analysis_table.len() as u32)?;
    for entry in syntax_analysis_table {
        // Sorted by node id so the artifact bytes are deterministic.
        let mut actions: Vec<(&ProductionNodeId, &Action)> = entry.actions().iter().collect();
        actions.sort_by_key(|(node_id, _)| **node_id);
        writer.put_u32(actions.len() as u32)?;
        for (node_id, action) in actions {
            writer.put_u32(node_id.to_raw())?;
            writer.put_action(action)?;
        }
        let mut gotos: Vec<(&ProductionNodeId, &SyntaxAnalysisTableEntryId)> =
            entry.gotos().iter().collect();
        gotos.sort_by_key(|(node_id, _)| **node_id);
        writer.put_u32(gotos.len() as u32)?;
        for (node_id, target) in gotos {
            writer.put_u32(node_id.to_raw())?;
            writer.put_u32(target.to_raw())?;
        }
    }
    writer.put_u32(handlers.len() as u32)?;
    for tag in handlers.tags() {
        writer.put_u32(tag.len() as u32)?;
        writer.put_bytes(tag.as_bytes())?;
    }
    writer.sink.flush()
}
