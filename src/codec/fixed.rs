//! Fixed-width value encodings.
//!
//! All fixed-width CQL types are described by a single table of
//! `(type, wire size, BufMut writer)` entries. Statements and collections bind
//! any of them through one generic method instead of one method per type.

use bytes::BufMut;

/// A value with a fixed-size big-endian wire representation.
///
/// | Rust type | CQL type | Size |
/// |-----------|----------|------|
/// | `i32`     | int      | 4    |
/// | `i64`     | bigint   | 8    |
/// | `f32`     | float    | 4    |
/// | `f64`     | double   | 8    |
/// | `bool`    | boolean  | 1    |
pub trait FixedValue: Copy {
    /// Payload size in bytes (excluding the length prefix).
    const SIZE: usize;

    /// Write the payload into `buf`.
    fn put<B: BufMut>(self, buf: &mut B);
}

macro_rules! fixed_values {
    ($($ty:ty => ($size:expr, $put:ident, $conv:path);)*) => {
        $(
            impl FixedValue for $ty {
                const SIZE: usize = $size;

                #[inline]
                fn put<B: BufMut>(self, buf: &mut B) {
                    buf.$put($conv(self));
                }
            }
        )*
    };
}

fixed_values! {
    i32 => (4, put_i32, i32::from);
    i64 => (8, put_i64, i64::from);
    f32 => (4, put_f32, f32::from);
    f64 => (8, put_f64, f64::from);
    bool => (1, put_u8, u8::from);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload<T: FixedValue>(value: T) -> Vec<u8> {
        let mut buf = Vec::new();
        value.put(&mut buf);
        buf
    }

    #[test]
    fn test_sizes_match_payloads() {
        assert_eq!(payload(1i32).len(), i32::SIZE);
        assert_eq!(payload(1i64).len(), i64::SIZE);
        assert_eq!(payload(1.0f32).len(), f32::SIZE);
        assert_eq!(payload(1.0f64).len(), f64::SIZE);
        assert_eq!(payload(true).len(), bool::SIZE);
    }

    #[test]
    fn test_int32_big_endian() {
        assert_eq!(payload(0x0102_0304i32), vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(payload(-1i32), vec![0xFF; 4]);
    }

    #[test]
    fn test_int64_big_endian() {
        assert_eq!(
            payload(0x0102_0304_0506_0708i64),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_floats_are_ieee754_big_endian() {
        assert_eq!(payload(1.5f32), 1.5f32.to_be_bytes().to_vec());
        assert_eq!(payload(0.000000000001f64), 0.000000000001f64.to_be_bytes().to_vec());
    }

    #[test]
    fn test_bool_single_byte() {
        assert_eq!(payload(true), vec![1]);
        assert_eq!(payload(false), vec![0]);
    }
}
