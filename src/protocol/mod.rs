//! Protocol module - wire format, consistency levels and request framing.
//!
//! This module implements the framing side of the binary protocol:
//! - 9-byte header encoding/decoding
//! - Opcodes, protocol versions and consistency levels
//! - Two-pass message framing into a scatter/gather sequence

mod consistency;
mod message;
mod wire_format;

pub use consistency::Consistency;
pub use message::{BodySections, EncodeBody, RequestMessage};
pub use wire_format::{flags, Header, Opcode, ProtocolVersion, HEADER_SIZE};
