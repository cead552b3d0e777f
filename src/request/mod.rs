//! Request kinds.
//!
//! A [`Request`] is immutable once built and is meant to be shared as
//! `Arc<Request>` between every [`RequestMessage`](crate::protocol::RequestMessage)
//! that frames it (for example one per retry or per protocol version).
//!
//! The set of kinds is closed: each variant maps to one opcode and provides
//! its body through [`EncodeBody`].

mod batch;
mod collection;
mod statement;

pub use batch::{Batch, BatchType};
pub use collection::{Collection, CollectionKind};
pub use statement::{query_flags, Statement, StatementKind, PAGE_SIZE_UNSET};

use crate::codec::primitives::put_long_string;
use crate::error::Result;
use crate::protocol::{BodySections, EncodeBody, Opcode, ProtocolVersion};

/// A request ready to be framed.
#[derive(Debug, Clone)]
pub enum Request {
    /// OPTIONS, empty body.
    Options,
    /// PREPARE with the query text.
    Prepare(String),
    /// QUERY or EXECUTE, depending on the statement kind.
    Statement(Statement),
    /// BATCH.
    Batch(Batch),
}

impl Request {
    /// Opcode sent in the frame header.
    pub fn opcode(&self) -> Opcode {
        match self {
            Request::Options => Opcode::Options,
            Request::Prepare(_) => Opcode::Prepare,
            Request::Statement(statement) => statement.kind().opcode(),
            Request::Batch(_) => Opcode::Batch,
        }
    }
}

impl From<Statement> for Request {
    fn from(statement: Statement) -> Self {
        Request::Statement(statement)
    }
}

impl From<Batch> for Request {
    fn from(batch: Batch) -> Self {
        Request::Batch(batch)
    }
}

impl EncodeBody for Request {
    fn encode_body(&self, version: ProtocolVersion, body: &mut BodySections) -> Result<usize> {
        match self {
            Request::Options => Ok(0),
            Request::Prepare(query) => {
                put_long_string(&mut body.head, query.as_bytes())?;
                Ok(body.len())
            }
            Request::Statement(statement) => statement.encode_body(version, body),
            Request::Batch(batch) => batch.encode_body(version, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_opcodes() {
        assert_eq!(Request::Options.opcode(), Opcode::Options);
        assert_eq!(Request::Prepare("q".into()).opcode(), Opcode::Prepare);
        assert_eq!(
            Request::from(Statement::new_query("q", 0)).opcode(),
            Opcode::Query
        );
        assert_eq!(
            Request::from(Statement::new_prepared(vec![1], 0)).opcode(),
            Opcode::Execute
        );
        assert_eq!(
            Request::from(Batch::new(BatchType::Logged)).opcode(),
            Opcode::Batch
        );
    }

    #[test]
    fn test_prepare_body() {
        let request = Request::Prepare("SELECT * FROM t".to_string());
        let mut body = BodySections::default();
        let len = request.encode_body(ProtocolVersion::V1, &mut body).unwrap();

        assert_eq!(len, 4 + 15);
        assert_eq!(&body.head[..4], &15i32.to_be_bytes());
        assert_eq!(&body.head[4..], b"SELECT * FROM t");
    }

    #[test]
    fn test_options_body_is_empty() {
        let mut body = BodySections::default();
        let len = Request::Options
            .encode_body(ProtocolVersion::V2, &mut body)
            .unwrap();
        assert_eq!(len, 0);
        assert!(body.is_empty());
    }

    #[test]
    fn test_shared_request_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Arc<Request>>();
    }
}
