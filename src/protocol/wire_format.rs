//! Frame header encoding and decoding.
//!
//! Implements the 9-byte request header:
//! ```text
//! ┌─────────┬───────┬──────────┬────────┬──────────┐
//! │ Version │ Flags │ Stream   │ Opcode │ Length   │
//! │ 1 byte  │ 1 byte│ 2 bytes  │ 1 byte │ 4 bytes  │
//! │         │       │ int16 BE │        │ int32 BE │
//! └─────────┴───────┴──────────┴────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. `Length` is the exact number of
//! body bytes following the header.

use std::fmt;

use serde::Deserialize;

use crate::error::{CqlError, Result};

/// Header size in bytes (fixed, exactly 9).
pub const HEADER_SIZE: usize = 9;

/// Flag constants for the header flags byte.
pub mod flags {
    /// Body is compressed.
    pub const COMPRESSION: u8 = 0x01;
    /// Request tracing.
    pub const TRACING: u8 = 0x02;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Request opcodes understood by this encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Options = 0x05,
    Query = 0x07,
    Prepare = 0x09,
    Execute = 0x0A,
    Batch = 0x0D,
}

impl Opcode {
    /// Wire value.
    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Supported protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u8")]
#[repr(u8)]
pub enum ProtocolVersion {
    V1 = 1,
    V2 = 2,
}

impl ProtocolVersion {
    /// Version byte for a request frame.
    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = CqlError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ProtocolVersion::V1),
            2 => Ok(ProtocolVersion::V2),
            other => Err(CqlError::UnsupportedVersion(other)),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_byte())
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version byte.
    pub version: u8,
    /// Flags byte (see `flags` module).
    pub flags: u8,
    /// Stream identifier, assigned by the transport.
    pub stream: i16,
    /// Opcode byte.
    pub opcode: u8,
    /// Body length in bytes.
    pub body_length: i32,
}

impl Header {
    /// Create a new header.
    pub fn new(version: u8, flags: u8, stream: i16, opcode: u8, body_length: i32) -> Self {
        Self {
            version,
            flags,
            stream,
            opcode,
            body_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use cqlwire::protocol::{Header, Opcode};
    ///
    /// let header = Header::new(2, 0, 1, Opcode::Query.as_byte(), 100);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 9);
    /// assert_eq!(bytes[4], 0x07);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (9 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0] = self.version;
        buf[1] = self.flags;
        buf[2..4].copy_from_slice(&self.stream.to_be_bytes());
        buf[4] = self.opcode;
        buf[5..9].copy_from_slice(&self.body_length.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use cqlwire::protocol::Header;
    ///
    /// let bytes = [0x02, 0x00, 0x00, 0x05, 0x07, 0, 0, 0, 14];
    /// let header = Header::decode(&bytes).unwrap();
    /// assert_eq!(header.stream, 5);
    /// assert_eq!(header.body_length, 14);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            version: buf[0],
            flags: buf[1],
            stream: i16::from_be_bytes([buf[2], buf[3]]),
            opcode: buf[4],
            body_length: i32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]),
        })
    }

    /// Check if the body is compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        flags::has_flag(self.flags, flags::COMPRESSION)
    }

    /// Check if tracing was requested.
    #[inline]
    pub fn is_tracing(&self) -> bool {
        flags::has_flag(self.flags, flags::TRACING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_decode_roundtrip() {
        let original = Header::new(2, flags::TRACING, 42, Opcode::Execute.as_byte(), 100);
        let encoded = original.encode();
        let decoded = Header::decode(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_header_big_endian_byte_order() {
        let header = Header::new(0x02, 0x03, 0x0405, 0x06, 0x0708_090A);
        let bytes = header.encode();

        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x03);

        // Stream: 0x0405 in BE
        assert_eq!(bytes[2], 0x04);
        assert_eq!(bytes[3], 0x05);

        assert_eq!(bytes[4], 0x06);

        // Body length: 0x0708090A in BE
        assert_eq!(bytes[5], 0x07);
        assert_eq!(bytes[6], 0x08);
        assert_eq!(bytes[7], 0x09);
        assert_eq!(bytes[8], 0x0A);
    }

    #[test]
    fn test_header_size_is_exactly_9() {
        assert_eq!(HEADER_SIZE, 9);
        let header = Header::new(1, 0, 1, Opcode::Options.as_byte(), 0);
        assert_eq!(header.encode().len(), 9);
    }

    #[test]
    fn test_negative_stream_roundtrip() {
        let header = Header::new(2, 0, -1, Opcode::Query.as_byte(), 0);
        let bytes = header.encode();
        assert_eq!(&bytes[2..4], &[0xFF, 0xFF]);
        assert_eq!(Header::decode(&bytes).unwrap().stream, -1);
    }

    #[test]
    fn test_decode_too_short_buffer() {
        let buf = [0u8; 8]; // One byte short
        assert!(Header::decode(&buf).is_none());
    }

    #[test]
    fn test_flag_accessors() {
        let header = Header::new(2, flags::COMPRESSION | flags::TRACING, 0, 0x07, 0);
        assert!(header.is_compressed());
        assert!(header.is_tracing());

        let plain = Header::new(2, 0, 0, 0x07, 0);
        assert!(!plain.is_compressed());
        assert!(!plain.is_tracing());
    }

    #[test]
    fn test_opcode_values() {
        assert_eq!(Opcode::Options.as_byte(), 0x05);
        assert_eq!(Opcode::Query.as_byte(), 0x07);
        assert_eq!(Opcode::Prepare.as_byte(), 0x09);
        assert_eq!(Opcode::Execute.as_byte(), 0x0A);
        assert_eq!(Opcode::Batch.as_byte(), 0x0D);
    }

    #[test]
    fn test_protocol_version_try_from() {
        assert_eq!(ProtocolVersion::try_from(1).unwrap(), ProtocolVersion::V1);
        assert_eq!(ProtocolVersion::try_from(2).unwrap(), ProtocolVersion::V2);
        assert!(matches!(
            ProtocolVersion::try_from(3),
            Err(CqlError::UnsupportedVersion(3))
        ));
        assert_eq!(ProtocolVersion::V2.to_string(), "v2");
    }
}
