//! Owned byte ranges and scatter/gather sequences.
//!
//! A [`Buffer`] is one encoded value: either absent (null), a single
//! length-prefixed range, or an encoded collection made of several ranges.
//! A [`BufferVec`] is the ordered list of ranges making up a message body;
//! concatenating them in order yields the bytes on the wire.
//!
//! All ranges are `bytes::Bytes`, so pushing a range into an output
//! sequence bumps a reference count instead of copying the data.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use cqlwire::buffer::BufferVec;
//!
//! let mut bufs = BufferVec::new();
//! bufs.push(Bytes::from_static(b"head"));
//! bufs.push(Bytes::from_static(b"tail"));
//!
//! assert_eq!(bufs.len(), 2);
//! assert_eq!(bufs.total_len(), 8);
//! assert_eq!(&bufs.to_bytes()[..], b"headtail");
//! ```

use std::ops::{Deref, DerefMut};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{length_prefix, LENGTH_SIZE, NULL_LENGTH};
use crate::error::Result;
use crate::request::Collection;

/// Wire bytes written for a null value (`[int] -1`).
const NULL_VALUE: &[u8] = &NULL_LENGTH.to_be_bytes();

/// An ordered, append-only sequence of byte ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferVec {
    bufs: Vec<Bytes>,
    total_len: usize,
}

impl BufferVec {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sequence with room for `capacity` ranges.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bufs: Vec::with_capacity(capacity),
            total_len: 0,
        }
    }

    /// Append a range at the end.
    #[inline]
    pub fn push(&mut self, buf: Bytes) {
        self.total_len += buf.len();
        self.bufs.push(buf);
    }

    /// Append every range of `other`, preserving order.
    pub fn extend(&mut self, other: BufferVec) {
        self.total_len += other.total_len;
        self.bufs.extend(other.bufs);
    }

    /// Number of ranges.
    #[inline]
    pub fn len(&self) -> usize {
        self.bufs.len()
    }

    /// Check if there are no ranges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bufs.is_empty()
    }

    /// Total number of bytes across all ranges.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Iterate over the ranges in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Bytes> {
        self.bufs.iter()
    }

    /// Copy all ranges into one contiguous buffer.
    ///
    /// Meant for transports without vectored writes, and for tests.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.total_len);
        for buf in &self.bufs {
            out.put_slice(buf);
        }
        out.freeze()
    }
}

impl<'a> IntoIterator for &'a BufferVec {
    type Item = &'a Bytes;
    type IntoIter = std::slice::Iter<'a, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.bufs.iter()
    }
}

impl IntoIterator for BufferVec {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.bufs.into_iter()
    }
}

/// One encoded value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Buffer {
    /// Absent value. Occupies no storage; written as `[int] -1`.
    #[default]
    Null,
    /// A single range holding the length prefix and the payload.
    Value(Bytes),
    /// An encoded collection. The first range starts with the length prefix.
    Collection(BufferVec),
}

impl Buffer {
    /// Absent value.
    #[inline]
    pub fn null() -> Self {
        Buffer::Null
    }

    /// Wrap an already length-prefixed value.
    #[inline]
    pub fn from_encoded(encoded: Bytes) -> Self {
        Buffer::Value(encoded)
    }

    /// Encode a collection into a buffer.
    ///
    /// Fails with `InvalidItemCount` if the collection, or any collection
    /// nested in it, is a map with an odd number of items.
    pub fn from_collection(collection: &Collection) -> Result<Self> {
        Ok(Buffer::Collection(collection.encode()?))
    }

    /// Check if this is the null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Buffer::Null)
    }

    /// Encoded size in bytes, prefix included. Zero for null.
    pub fn size(&self) -> usize {
        match self {
            Buffer::Null => 0,
            Buffer::Value(bytes) => bytes.len(),
            Buffer::Collection(bufs) => bufs.total_len(),
        }
    }

    /// Size this buffer occupies once written into a values section.
    pub fn wire_size(&self) -> usize {
        match self {
            Buffer::Null => LENGTH_SIZE,
            _ => self.size(),
        }
    }

    /// Payload length declared by the prefix, `None` for null.
    pub fn declared_length(&self) -> Option<i32> {
        let first = match self {
            Buffer::Null => return None,
            Buffer::Value(bytes) => bytes,
            Buffer::Collection(bufs) => bufs.iter().next()?,
        };
        if first.len() < LENGTH_SIZE {
            return None;
        }
        Some((&first[..LENGTH_SIZE]).get_i32())
    }

    /// Check that the prefix matches the payload that follows it.
    pub fn is_consistent(&self) -> bool {
        if self.is_null() {
            return true;
        }
        match self.declared_length() {
            Some(declared) if declared >= 0 => {
                declared as usize + LENGTH_SIZE == self.size()
            }
            _ => false,
        }
    }

    /// Append this value's ranges to `out`.
    pub(crate) fn write_to(&self, out: &mut BufferVec) {
        match self {
            Buffer::Null => out.push(Bytes::from_static(NULL_VALUE)),
            Buffer::Value(bytes) => out.push(bytes.clone()),
            Buffer::Collection(bufs) => {
                for buf in bufs {
                    out.push(buf.clone());
                }
            }
        }
    }
}

/// A reserved value slot that the caller fills in place.
///
/// Dereferences to the payload region (after the length prefix). The value is
/// committed to its slot when the guard is dropped.
pub struct OutputBuffer<'a> {
    slot: &'a mut Buffer,
    buf: BytesMut,
}

impl<'a> OutputBuffer<'a> {
    pub(crate) fn new(slot: &'a mut Buffer, payload_size: usize) -> Self {
        let mut buf = BytesMut::with_capacity(LENGTH_SIZE + payload_size);
        buf.put_i32(length_prefix(payload_size));
        buf.resize(LENGTH_SIZE + payload_size, 0);
        Self { slot, buf }
    }
}

impl Deref for OutputBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf[LENGTH_SIZE..]
    }
}

impl DerefMut for OutputBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf[LENGTH_SIZE..]
    }
}

impl Drop for OutputBuffer<'_> {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        *self.slot = Buffer::Value(buf.freeze());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_value;

    #[test]
    fn test_buffer_vec_order_and_len() {
        let mut bufs = BufferVec::with_capacity(3);
        bufs.push(Bytes::from_static(b"a"));
        bufs.push(Bytes::from_static(b"bc"));
        bufs.push(Bytes::new());

        assert_eq!(bufs.len(), 3);
        assert_eq!(bufs.total_len(), 3);
        assert_eq!(&bufs.to_bytes()[..], b"abc");
    }

    #[test]
    fn test_buffer_vec_extend() {
        let mut first = BufferVec::new();
        first.push(Bytes::from_static(b"12"));
        let mut second = BufferVec::new();
        second.push(Bytes::from_static(b"345"));

        first.extend(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.total_len(), 5);
        assert_eq!(&first.to_bytes()[..], b"12345");
    }

    #[test]
    fn test_buffer_vec_push_shares_memory() {
        let data = Bytes::from_static(b"shared");
        let mut bufs = BufferVec::new();
        bufs.push(data.clone());

        let pushed = bufs.iter().next().unwrap();
        assert_eq!(pushed.as_ptr(), data.as_ptr());
    }

    #[test]
    fn test_null_buffer() {
        let buf = Buffer::null();
        assert!(buf.is_null());
        assert_eq!(buf.size(), 0);
        assert_eq!(buf.wire_size(), 4);
        assert_eq!(buf.declared_length(), None);
        assert!(buf.is_consistent());

        let mut out = BufferVec::new();
        buf.write_to(&mut out);
        assert_eq!(&out.to_bytes()[..], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_empty_value_is_not_null() {
        let buf = Buffer::from_encoded(encode_value(b""));
        assert!(!buf.is_null());
        assert_eq!(buf.size(), 4);
        assert_eq!(buf.declared_length(), Some(0));
        assert!(buf.is_consistent());
    }

    #[test]
    fn test_inconsistent_value_detected() {
        let mut raw = BytesMut::new();
        raw.put_i32(10);
        raw.put_slice(b"short");
        let buf = Buffer::from_encoded(raw.freeze());
        assert!(!buf.is_consistent());

        let truncated = Buffer::from_encoded(Bytes::from_static(&[0, 0]));
        assert!(!truncated.is_consistent());
    }

    #[test]
    fn test_output_buffer_commits_on_drop() {
        let mut slot = Buffer::null();
        {
            let mut out = OutputBuffer::new(&mut slot, 3);
            assert_eq!(out.len(), 3);
            out.copy_from_slice(b"xyz");
        }

        assert_eq!(slot.size(), 7);
        assert_eq!(slot.declared_length(), Some(3));
        match &slot {
            Buffer::Value(bytes) => assert_eq!(&bytes[4..], b"xyz"),
            other => panic!("unexpected buffer: {:?}", other),
        }
    }

    #[test]
    fn test_output_buffer_incremental_writes() {
        let mut slot = Buffer::null();
        {
            let mut out = OutputBuffer::new(&mut slot, 4);
            out[0..2].copy_from_slice(&[1, 2]);
            out[2..4].copy_from_slice(&[3, 4]);
        }
        let mut bufs = BufferVec::new();
        slot.write_to(&mut bufs);
        assert_eq!(&bufs.to_bytes()[..], &[0, 0, 0, 4, 1, 2, 3, 4]);
    }
}
