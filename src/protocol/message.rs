//! Request framing.
//!
//! A [`RequestMessage`] frames one shared [`Request`] for one send attempt.
//! Encoding is strictly two-pass: the body is produced first, then the header
//! is built from the now known body length. The output is a scatter/gather
//! sequence:
//!
//! ```text
//! header │ body head │ body collection[0..n] │ body tail
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cqlwire::buffer::BufferVec;
//! use cqlwire::protocol::{Header, ProtocolVersion, RequestMessage, HEADER_SIZE};
//! use cqlwire::request::{Request, Statement};
//!
//! let mut statement = Statement::new_query("SELECT * FROM t WHERE id = ?", 1);
//! statement.bind(0, 42i32).unwrap();
//!
//! let request = Arc::new(Request::from(statement));
//! let mut message = RequestMessage::create(request);
//!
//! let mut out = BufferVec::new();
//! message.encode(ProtocolVersion::V2, 0, 1, &mut out).unwrap();
//!
//! let bytes = out.to_bytes();
//! let header = Header::decode(&bytes).unwrap();
//! assert_eq!(header.body_length as usize, bytes.len() - HEADER_SIZE);
//! ```

use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use super::wire_format::{Header, Opcode, ProtocolVersion};
use crate::buffer::BufferVec;
use crate::error::{CqlError, Result};
use crate::request::Request;

/// Body of a request while it is being encoded.
#[derive(Debug, Default)]
pub struct BodySections {
    /// Fixed leading fields.
    pub head: BytesMut,
    /// Values, in order.
    pub collection: BufferVec,
    /// Fixed trailing fields.
    pub tail: BytesMut,
}

impl BodySections {
    /// Total body length in bytes.
    pub fn len(&self) -> usize {
        self.head.len() + self.collection.total_len() + self.tail.len()
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capability shared by every request kind: produce a body for a protocol
/// version.
pub trait EncodeBody {
    /// Fill `body` and return its length in bytes.
    fn encode_body(&self, version: ProtocolVersion, body: &mut BodySections) -> Result<usize>;
}

/// One framing of a shared request.
#[derive(Debug)]
pub struct RequestMessage {
    request: Arc<Request>,
    header: Bytes,
    body_head: Bytes,
    body_collection: BufferVec,
    body_tail: Bytes,
}

impl RequestMessage {
    /// Create a message for `request`.
    ///
    /// The body encoder is selected from the request's kind.
    pub fn create(request: Arc<Request>) -> Self {
        Self {
            request,
            header: Bytes::new(),
            body_head: Bytes::new(),
            body_collection: BufferVec::new(),
            body_tail: Bytes::new(),
        }
    }

    /// The framed request.
    #[inline]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The framed request's opcode.
    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.request.opcode()
    }

    /// Total size of the last successful encoding (header included).
    pub fn encoded_len(&self) -> usize {
        self.header.len()
            + self.body_head.len()
            + self.body_collection.total_len()
            + self.body_tail.len()
    }

    /// Encode the request and append header and body to `out`.
    ///
    /// On error nothing is appended to `out`.
    pub fn encode(
        &mut self,
        version: ProtocolVersion,
        flags: u8,
        stream: i16,
        out: &mut BufferVec,
    ) -> Result<()> {
        let opcode = self.opcode();

        // Pass 1: body
        let mut body = BodySections::default();
        let body_len = match self.request.encode_body(version, &mut body) {
            Ok(len) => len,
            Err(e) => {
                tracing::debug!("Failed to encode {:?} body for {}: {}", opcode, version, e);
                return Err(e);
            }
        };
        debug_assert_eq!(body_len, body.len());
        let body_length = i32::try_from(body_len).map_err(|_| CqlError::BodyTooLarge(body_len))?;

        // Pass 2: header
        let header = Header::new(version.as_byte(), flags, stream, opcode.as_byte(), body_length);

        self.header = Bytes::copy_from_slice(&header.encode());
        self.body_head = body.head.freeze();
        self.body_collection = body.collection;
        self.body_tail = body.tail.freeze();

        tracing::trace!(
            "Encoded {:?} for {} on stream {}: {} body bytes in {} buffers",
            opcode,
            version,
            stream,
            body_len,
            self.body_collection.len()
        );

        out.push(self.header.clone());
        if !self.body_head.is_empty() {
            out.push(self.body_head.clone());
        }
        for buf in &self.body_collection {
            out.push(buf.clone());
        }
        if !self.body_tail.is_empty() {
            out.push(self.body_tail.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{flags, HEADER_SIZE};
    use crate::request::{Batch, BatchType, Collection, Statement};

    fn encode(request: Request, version: ProtocolVersion) -> Result<BufferVec> {
        let mut message = RequestMessage::create(Arc::new(request));
        let mut out = BufferVec::new();
        message.encode(version, 0, 0, &mut out)?;
        Ok(out)
    }

    fn assert_length_matches(out: &BufferVec) -> Header {
        let bytes = out.to_bytes();
        let header = Header::decode(&bytes).unwrap();
        assert_eq!(header.body_length as usize, bytes.len() - HEADER_SIZE);
        header
    }

    #[test]
    fn test_header_fields() {
        let mut message = RequestMessage::create(Arc::new(Request::Options));
        let mut out = BufferVec::new();
        message
            .encode(ProtocolVersion::V2, flags::TRACING, 0x0102, &mut out)
            .unwrap();

        let header = assert_length_matches(&out);
        assert_eq!(header.version, 2);
        assert_eq!(header.flags, flags::TRACING);
        assert_eq!(header.stream, 0x0102);
        assert_eq!(header.opcode, Opcode::Options.as_byte());
        assert_eq!(header.body_length, 0);
        assert_eq!(out.len(), 1);
        assert_eq!(message.encoded_len(), HEADER_SIZE);
    }

    #[test]
    fn test_body_length_zero_values() {
        let statement = Statement::new_query("SELECT now() FROM system.local", 0);
        let out = encode(statement.into(), ProtocolVersion::V2).unwrap();
        assert_length_matches(&out);
    }

    #[test]
    fn test_body_length_one_value() {
        let mut statement = Statement::new_query("SELECT * FROM t WHERE id = ?", 1);
        statement.bind(0, 1i64).unwrap();
        let out = encode(statement.into(), ProtocolVersion::V2).unwrap();
        let header = assert_length_matches(&out);
        assert_eq!(header.opcode, Opcode::Query.as_byte());
    }

    #[test]
    fn test_body_length_many_values() {
        let mut statement = Statement::new_prepared(vec![0xAA; 16], 64);
        for i in 0..64 {
            if i % 3 == 0 {
                continue;
            }
            statement.bind_string(i, &"x".repeat(i)).unwrap();
        }
        let mut list = Collection::list();
        list.append(1i32).append(2i32);
        statement.bind_collection(0, &list).unwrap();

        for version in [ProtocolVersion::V1, ProtocolVersion::V2] {
            let out = encode(statement.clone().into(), version).unwrap();
            let header = assert_length_matches(&out);
            assert_eq!(header.opcode, Opcode::Execute.as_byte());
        }
    }

    #[test]
    fn test_body_length_empty_and_large_payloads() {
        let mut statement = Statement::new_query("INSERT INTO t (a, b) VALUES (?, ?)", 2);
        statement.bind_bytes(0, b"").unwrap();
        statement.bind_bytes(1, &vec![0x5A; 1 << 20]).unwrap();

        let out = encode(statement.into(), ProtocolVersion::V2).unwrap();
        assert_length_matches(&out);
    }

    #[test]
    fn test_same_request_framed_twice() {
        let mut statement = Statement::new_query("SELECT * FROM t WHERE id = ?", 1);
        statement.bind(0, 7i32).unwrap();
        let request = Arc::new(Request::from(statement));

        let mut first = RequestMessage::create(Arc::clone(&request));
        let mut second = RequestMessage::create(Arc::clone(&request));
        assert_eq!(Arc::strong_count(&request), 3);

        let mut out1 = BufferVec::new();
        let mut out2 = BufferVec::new();
        first.encode(ProtocolVersion::V2, 0, 1, &mut out1).unwrap();
        second.encode(ProtocolVersion::V2, 0, 2, &mut out2).unwrap();

        let bytes1 = out1.to_bytes();
        let bytes2 = out2.to_bytes();
        assert_eq!(&bytes1[HEADER_SIZE..], &bytes2[HEADER_SIZE..]);
        assert_eq!(Header::decode(&bytes1).unwrap().stream, 1);
        assert_eq!(Header::decode(&bytes2).unwrap().stream, 2);

        drop(first);
        drop(second);
        assert_eq!(Arc::strong_count(&request), 1);
    }

    #[test]
    fn test_failure_leaves_output_untouched() {
        let batch = Batch::new(BatchType::Logged);
        let mut message = RequestMessage::create(Arc::new(batch.into()));

        let mut out = BufferVec::new();
        out.push(Bytes::from_static(b"previous"));
        let result = message.encode(ProtocolVersion::V1, 0, 0, &mut out);

        assert!(matches!(result, Err(CqlError::UnsupportedOpcode { .. })));
        assert_eq!(out.len(), 1);
        assert_eq!(out.total_len(), 8);
    }

    #[test]
    fn test_appends_after_existing_buffers() {
        let mut out = BufferVec::new();
        out.push(Bytes::from_static(b"xx"));

        let mut message = RequestMessage::create(Arc::new(Request::Options));
        message.encode(ProtocolVersion::V1, 0, 0, &mut out).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out.total_len(), 2 + HEADER_SIZE);
    }

    #[test]
    fn test_body_sections_len() {
        let mut body = BodySections::default();
        assert!(body.is_empty());
        body.head.extend_from_slice(b"abc");
        body.collection.push(Bytes::from_static(b"de"));
        body.tail.extend_from_slice(b"f");
        assert_eq!(body.len(), 6);
    }
}
