//! Primitive wire encodings.
//!
//! Notation follows the CQL binary protocol:
//!
//! ```text
//! [short]        2-byte unsigned, big endian
//! [int]          4-byte signed, big endian
//! [long string]  [int] n, then n bytes of UTF-8
//! [short bytes]  [short] n, then n bytes
//! [bytes]        [int] n, then n bytes; n < 0 means null
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::FixedValue;
use crate::error::{CqlError, Result};

/// Size of the `[int]` length prefix in front of every value.
pub const LENGTH_SIZE: usize = 4;

/// Length written for an absent (null) value.
pub const NULL_LENGTH: i32 = -1;

/// A 16-byte UUID in network order.
pub type Uuid = [u8; 16];

/// Length prefix for a payload of `len` bytes.
///
/// Lengths that do not fit an `[int]` map to [`NULL_LENGTH`], which makes the
/// resulting buffer fail the consistency check at encode time.
#[inline]
pub fn length_prefix(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(NULL_LENGTH)
}

/// Encode a `[bytes]` value: length prefix followed by the payload verbatim.
pub fn encode_value(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(LENGTH_SIZE + payload.len());
    buf.put_i32(length_prefix(payload.len()));
    buf.put_slice(payload);
    buf.freeze()
}

/// Encode a fixed-width value with its length prefix.
pub fn encode_fixed<T: FixedValue>(value: T) -> Bytes {
    let mut buf = BytesMut::with_capacity(LENGTH_SIZE + T::SIZE);
    buf.put_i32(length_prefix(T::SIZE));
    value.put(&mut buf);
    buf.freeze()
}

/// Encode a decimal: length prefix, 4-byte scale, then the unscaled
/// varint magnitude verbatim.
pub fn encode_decimal(scale: i32, magnitude: &[u8]) -> Bytes {
    let payload_len = 4 + magnitude.len();
    let mut buf = BytesMut::with_capacity(LENGTH_SIZE + payload_len);
    buf.put_i32(length_prefix(payload_len));
    buf.put_i32(scale);
    buf.put_slice(magnitude);
    buf.freeze()
}

/// Write a `[short]`.
#[inline]
pub fn put_short<B: BufMut>(buf: &mut B, value: u16) {
    buf.put_u16(value);
}

/// Write a `[long string]`.
pub fn put_long_string<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<()> {
    let len = i32::try_from(value.len()).map_err(|_| CqlError::BodyTooLarge(value.len()))?;
    buf.put_i32(len);
    buf.put_slice(value);
    Ok(())
}

/// Write a `[short bytes]`.
pub fn put_short_bytes<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| CqlError::BodyTooLarge(value.len()))?;
    buf.put_u16(len);
    buf.put_slice(value);
    Ok(())
}

/// Write a non-null `[bytes]`.
pub fn put_bytes<B: BufMut>(buf: &mut B, value: &[u8]) -> Result<()> {
    let len = i32::try_from(value.len()).map_err(|_| CqlError::BodyTooLarge(value.len()))?;
    buf.put_i32(len);
    buf.put_slice(value);
    Ok(())
}
