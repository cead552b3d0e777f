//! List, set and map values.
//!
//! A collection is built by appending items in order. Map items alternate
//! key, value. Items are encoded as they are appended; the collection as a
//! whole is encoded when it is bound to a statement:
//!
//! ```text
//! ┌──────────┬────────────┬─────────────────┬─────┐
//! │ Length   │ Item count │ Item 0          │ ... │
//! │ 4 bytes  │ 4 bytes    │ [int] n + bytes │     │
//! └──────────┴────────────┴─────────────────┴─────┘
//! ```
//!
//! For maps the item count is the number of key/value pairs.

use std::net::IpAddr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::buffer::BufferVec;
use crate::codec::{
    encode_decimal, encode_fixed, encode_value, length_prefix, FixedValue, Uuid, LENGTH_SIZE,
};
use crate::error::{CqlError, Result};

/// Kind of collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Map,
    Set,
}

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Value(Bytes),
    Nested(Collection),
}

/// A list, set or map of encoded items.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    kind: CollectionKind,
    items: Vec<Item>,
}

impl Collection {
    /// Create an empty collection with room for `capacity` items.
    ///
    /// For a map, `capacity` counts keys and values separately.
    pub fn new(kind: CollectionKind, capacity: usize) -> Self {
        Self {
            kind,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Create an empty list.
    pub fn list() -> Self {
        Self::new(CollectionKind::List, 0)
    }

    /// Create an empty set.
    pub fn set() -> Self {
        Self::new(CollectionKind::Set, 0)
    }

    /// Create an empty map.
    pub fn map() -> Self {
        Self::new(CollectionKind::Map, 0)
    }

    /// Collection kind.
    #[inline]
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    /// Check if this is a map.
    #[inline]
    pub fn is_map(&self) -> bool {
        self.kind == CollectionKind::Map
    }

    /// Number of appended items (keys and values both count for a map).
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Append a fixed-width value.
    pub fn append<T: FixedValue>(&mut self, value: T) -> &mut Self {
        self.push(encode_fixed(value))
    }

    /// Append a text value.
    pub fn append_string(&mut self, value: &str) -> &mut Self {
        self.push(encode_value(value.as_bytes()))
    }

    /// Append a blob.
    pub fn append_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.push(encode_value(value))
    }

    /// Append a UUID.
    pub fn append_uuid(&mut self, value: &Uuid) -> &mut Self {
        self.push(encode_value(value))
    }

    /// Append an inet address (4 or 16 bytes).
    pub fn append_inet(&mut self, value: IpAddr) -> &mut Self {
        match value {
            IpAddr::V4(v4) => self.push(encode_value(&v4.octets())),
            IpAddr::V6(v6) => self.push(encode_value(&v6.octets())),
        }
    }

    /// Append a decimal given its scale and unscaled varint magnitude.
    pub fn append_decimal(&mut self, scale: i32, magnitude: &[u8]) -> &mut Self {
        self.push(encode_decimal(scale, magnitude))
    }

    /// Append a nested collection.
    ///
    /// The nested collection is validated together with its parent when the
    /// parent is encoded.
    pub fn append_collection(&mut self, value: Collection) -> &mut Self {
        self.items.push(Item::Nested(value));
        self
    }

    fn push(&mut self, encoded: Bytes) -> &mut Self {
        self.items.push(Item::Value(encoded));
        self
    }

    /// Check the map invariant on this collection and every nested one.
    pub fn validate(&self) -> Result<()> {
        if self.is_map() && self.items.len() % 2 != 0 {
            return Err(CqlError::InvalidItemCount {
                count: self.items.len(),
            });
        }
        for item in &self.items {
            if let Item::Nested(nested) = item {
                nested.validate()?;
            }
        }
        Ok(())
    }

    /// Count written on the wire: pairs for a map, items otherwise.
    fn wire_count(&self) -> usize {
        if self.is_map() {
            self.items.len() / 2
        } else {
            self.items.len()
        }
    }

    /// Encode the collection as a length-prefixed value.
    ///
    /// Nested collections are flattened into the returned sequence; no item
    /// bytes are copied.
    pub fn encode(&self) -> Result<BufferVec> {
        self.validate()?;
        Ok(self.encode_validated())
    }

    fn encode_validated(&self) -> BufferVec {
        let mut items = BufferVec::with_capacity(self.items.len());
        for item in &self.items {
            match item {
                Item::Value(encoded) => items.push(encoded.clone()),
                Item::Nested(nested) => items.extend(nested.encode_validated()),
            }
        }

        let payload_len = 4 + items.total_len();
        let mut head = BytesMut::with_capacity(LENGTH_SIZE + 4);
        head.put_i32(length_prefix(payload_len));
        head.put_i32(length_prefix(self.wire_count()));

        let mut out = BufferVec::with_capacity(items.len() + 1);
        out.push(head.freeze());
        out.extend(items);
        out
    }
}
