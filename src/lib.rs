//! # cqlwire
//!
//! Request encoding core for the CQL binary protocol.
//!
//! This crate turns positionally-bound statements into the exact bytes of a
//! protocol frame, as a scatter/gather sequence ready for a transport.
//!
//! ## Architecture
//!
//! - **Buffers**: every bound value is its own immutable `Bytes` range; a
//!   message is a [`BufferVec`] of ranges, never one monolithic copy
//! - **Statements**: fixed-size value tables bound by index
//! - **Framing**: [`RequestMessage`] encodes the body first, then the header
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use cqlwire::{BufferVec, Collection, ProtocolVersion, Request, RequestMessage, Statement};
//!
//! let mut tags = Collection::set();
//! tags.append_string("a").append_string("b");
//!
//! let mut statement = Statement::new_query("UPDATE t SET tags = ? WHERE id = ?", 2);
//! statement.bind_collection(0, &tags).unwrap();
//! statement.bind(1, 7i64).unwrap();
//!
//! let request = Arc::new(Request::from(statement));
//! let mut message = RequestMessage::create(Arc::clone(&request));
//!
//! let mut bufs = BufferVec::new();
//! message.encode(ProtocolVersion::V2, 0, 1, &mut bufs).unwrap();
//! assert!(bufs.total_len() > 9);
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod request;
pub mod writer;

pub use buffer::{Buffer, BufferVec, OutputBuffer};
pub use config::EncoderConfig;
pub use error::{CqlError, Result};
pub use protocol::{Consistency, Header, Opcode, ProtocolVersion, RequestMessage};
pub use request::{Batch, BatchType, Collection, CollectionKind, Request, Statement, StatementKind};
