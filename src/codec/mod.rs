//! Codec module - value encodings for the CQL binary protocol.
//!
//! This module provides the byte-level building blocks used by statements,
//! collections and request bodies:
//!
//! - [`FixedValue`] - fixed-width numeric and boolean values (one table, one binder)
//! - [`primitives`] - length-prefixed values, `[short]`, `[string]`, `[long string]`,
//!   `[short bytes]` and decimals
//!
//! # Design
//!
//! Every bound value is encoded eagerly into its own `Bytes`, prefixed with a
//! 4-byte big-endian length. Encoded values are immutable and can be shared
//! between a statement slot and any number of outgoing messages without copying.
//!
//! # Example
//!
//! ```
//! use cqlwire::codec::{encode_fixed, encode_value};
//!
//! let int = encode_fixed(42i32);
//! assert_eq!(&int[..], &[0, 0, 0, 4, 0, 0, 0, 42]);
//!
//! let text = encode_value(b"abc");
//! assert_eq!(&text[..], &[0, 0, 0, 3, b'a', b'b', b'c']);
//! ```

mod fixed;
pub mod primitives;

pub use fixed::FixedValue;
pub use primitives::{
    encode_decimal, encode_fixed, encode_value, length_prefix, Uuid, LENGTH_SIZE, NULL_LENGTH,
};
