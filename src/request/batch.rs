//! BATCH requests (protocol v2 and later).
//!
//! ```text
//! [byte type][short n] n * ([byte kind][long string | short bytes][short m][m values]) [short consistency]
//! ```

use bytes::BufMut;

use super::Statement;
use crate::codec::primitives::put_short;
use crate::error::{CqlError, Result};
use crate::protocol::{BodySections, Consistency, EncodeBody, Opcode, ProtocolVersion};

/// How the coordinator applies a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BatchType {
    #[default]
    Logged = 0,
    Unlogged = 1,
    Counter = 2,
}

/// An ordered group of statements sent as one request.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    batch_type: BatchType,
    statements: Vec<Statement>,
    consistency: Consistency,
}

impl Batch {
    /// Create an empty batch.
    pub fn new(batch_type: BatchType) -> Self {
        Self {
            batch_type,
            statements: Vec::new(),
            consistency: Consistency::One,
        }
    }

    pub fn batch_type(&self) -> BatchType {
        self.batch_type
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    pub fn set_consistency(&mut self, consistency: Consistency) {
        self.consistency = consistency;
    }

    /// Append a statement; entries are sent in insertion order.
    pub fn add_statement(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl EncodeBody for Batch {
    fn encode_body(&self, version: ProtocolVersion, body: &mut BodySections) -> Result<usize> {
        if version < ProtocolVersion::V2 {
            return Err(CqlError::UnsupportedOpcode {
                opcode: Opcode::Batch.as_byte(),
                version: version.as_byte(),
            });
        }
        let count = u16::try_from(self.statements.len())
            .map_err(|_| CqlError::TooManyStatements(self.statements.len()))?;

        body.head.put_u8(self.batch_type as u8);
        put_short(&mut body.head, count);
        for statement in &self.statements {
            statement.encode_batch_entry(version, &mut body.collection)?;
        }
        put_short(&mut body.tail, self.consistency.as_short());
        Ok(body.len())
    }
}
