//! Statements with positional bind values.
//!
//! A [`Statement`] owns a fixed-length table of value slots. Every bind call
//! checks the index, encodes one value into its own buffer and replaces the
//! slot; a failed bind leaves the statement untouched.
//!
//! # Example
//!
//! ```
//! use cqlwire::buffer::BufferVec;
//! use cqlwire::protocol::ProtocolVersion;
//! use cqlwire::request::Statement;
//!
//! let mut statement = Statement::new_query("INSERT INTO t (a, b) VALUES (?, ?)", 2);
//! statement.bind(0, 42i32).unwrap();
//!
//! let mut values = BufferVec::new();
//! let len = statement.encode_values(ProtocolVersion::V2, &mut values).unwrap();
//! assert_eq!(len, 2 + (4 + 4) + 4);
//! ```

use std::net::IpAddr;

use bytes::{BufMut, Bytes};

use crate::buffer::{Buffer, BufferVec, OutputBuffer};
use crate::codec::primitives::{put_bytes, put_long_string, put_short, put_short_bytes};
use crate::codec::{encode_decimal, encode_fixed, encode_value, FixedValue, Uuid};
use crate::config::EncoderConfig;
use crate::error::{CqlError, Result};
use crate::protocol::{BodySections, Consistency, EncodeBody, Opcode, ProtocolVersion};

use super::Collection;

/// Query parameter flags (protocol v2).
pub mod query_flags {
    /// Values follow.
    pub const VALUES: u8 = 0x01;
    /// Result metadata may be skipped.
    pub const SKIP_METADATA: u8 = 0x02;
    /// Result page size follows.
    pub const PAGE_SIZE: u8 = 0x04;
    /// Paging state follows.
    pub const WITH_PAGING_STATE: u8 = 0x08;
    /// Serial consistency follows.
    pub const WITH_SERIAL_CONSISTENCY: u8 = 0x10;
}

/// Page size meaning "no paging".
pub const PAGE_SIZE_UNSET: i32 = -1;

/// What the statement's text slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StatementKind {
    /// Query text, sent with QUERY.
    Query = 0,
    /// Prepared statement id, sent with EXECUTE.
    Prepared = 1,
}

impl StatementKind {
    /// Opcode used to send a statement of this kind on its own.
    pub fn opcode(self) -> Opcode {
        match self {
            StatementKind::Query => Opcode::Query,
            StatementKind::Prepared => Opcode::Execute,
        }
    }
}

/// A query or prepared statement execution with bound values.
#[derive(Debug, Clone)]
pub struct Statement {
    values: Box<[Buffer]>,
    consistency: Consistency,
    serial_consistency: Consistency,
    page_size: i32,
    paging_state: Bytes,
    kind: StatementKind,
    query_or_prepared_id: Bytes,
}

impl Statement {
    /// Create a statement with `value_count` unbound slots.
    pub fn new(kind: StatementKind, value_count: usize) -> Self {
        Self {
            values: vec![Buffer::Null; value_count].into_boxed_slice(),
            consistency: Consistency::One,
            serial_consistency: Consistency::Any,
            page_size: PAGE_SIZE_UNSET,
            paging_state: Bytes::new(),
            kind,
            query_or_prepared_id: Bytes::new(),
        }
    }

    /// Create a statement from query text.
    pub fn new_query(query: impl Into<String>, value_count: usize) -> Self {
        let mut statement = Self::new(StatementKind::Query, value_count);
        statement.set_query(query);
        statement
    }

    /// Create an execution of a prepared statement.
    pub fn new_prepared(prepared_id: impl Into<Bytes>, value_count: usize) -> Self {
        let mut statement = Self::new(StatementKind::Prepared, value_count);
        statement.set_prepared_id(prepared_id);
        statement
    }

    /// Copy consistency and paging defaults from `config`.
    pub fn apply_config(&mut self, config: &EncoderConfig) {
        self.consistency = config.consistency;
        self.serial_consistency = config.serial_consistency;
        self.page_size = config.page_size;
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    pub fn set_consistency(&mut self, consistency: Consistency) {
        self.consistency = consistency;
    }

    /// Serial consistency; `Any` means it is not sent.
    pub fn serial_consistency(&self) -> Consistency {
        self.serial_consistency
    }

    pub fn set_serial_consistency(&mut self, serial_consistency: Consistency) {
        self.serial_consistency = serial_consistency;
    }

    /// Result page size; negative means unset.
    pub fn page_size(&self) -> i32 {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: i32) {
        self.page_size = page_size;
    }

    /// Opaque paging token; empty means unset.
    pub fn paging_state(&self) -> &[u8] {
        &self.paging_state
    }

    pub fn set_paging_state(&mut self, paging_state: impl Into<Bytes>) {
        self.paging_state = paging_state.into();
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query_or_prepared_id = Bytes::from(query.into());
    }

    pub fn query(&self) -> &[u8] {
        &self.query_or_prepared_id
    }

    pub fn set_prepared_id(&mut self, prepared_id: impl Into<Bytes>) {
        self.query_or_prepared_id = prepared_id.into();
    }

    pub fn prepared_id(&self) -> &[u8] {
        &self.query_or_prepared_id
    }

    /// Number of value slots, fixed at construction.
    #[inline]
    pub fn values_count(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// The buffer stored in slot `index`.
    pub fn value(&self, index: usize) -> Option<&Buffer> {
        self.values.get(index)
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Buffer> {
        let count = self.values.len();
        self.values
            .get_mut(index)
            .ok_or(CqlError::IndexOutOfBounds { index, count })
    }

    fn store(&mut self, index: usize, buffer: Buffer) -> Result<()> {
        *self.slot_mut(index)? = buffer;
        Ok(())
    }

    /// Bind a fixed-width value (`i32`, `i64`, `f32`, `f64`, `bool`).
    pub fn bind<T: FixedValue>(&mut self, index: usize, value: T) -> Result<()> {
        let slot = self.slot_mut(index)?;
        *slot = Buffer::from_encoded(encode_fixed(value));
        Ok(())
    }

    /// Bind null.
    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        self.store(index, Buffer::null())
    }

    /// Bind text.
    pub fn bind_string(&mut self, index: usize, value: &str) -> Result<()> {
        self.bind_bytes(index, value.as_bytes())
    }

    /// Bind a blob.
    pub fn bind_bytes(&mut self, index: usize, value: &[u8]) -> Result<()> {
        let slot = self.slot_mut(index)?;
        *slot = Buffer::from_encoded(encode_value(value));
        Ok(())
    }

    /// Bind a UUID.
    pub fn bind_uuid(&mut self, index: usize, value: &Uuid) -> Result<()> {
        self.bind_bytes(index, value)
    }

    /// Bind an inet address: 4 bytes for IPv4, 16 for IPv6.
    pub fn bind_inet(&mut self, index: usize, value: IpAddr) -> Result<()> {
        match value {
            IpAddr::V4(v4) => self.bind_bytes(index, &v4.octets()),
            IpAddr::V6(v6) => self.bind_bytes(index, &v6.octets()),
        }
    }

    /// Bind a decimal given its scale and unscaled varint magnitude.
    pub fn bind_decimal(&mut self, index: usize, scale: i32, magnitude: &[u8]) -> Result<()> {
        let slot = self.slot_mut(index)?;
        *slot = Buffer::from_encoded(encode_decimal(scale, magnitude));
        Ok(())
    }

    /// Bind a collection.
    ///
    /// Maps, including maps nested at any depth, must have an even item
    /// count; otherwise `InvalidItemCount` is returned and the slot is kept.
    pub fn bind_collection(&mut self, index: usize, collection: &Collection) -> Result<()> {
        let count = self.values.len();
        if index >= count {
            return Err(CqlError::IndexOutOfBounds { index, count });
        }
        let buffer = Buffer::from_collection(collection)?;
        self.store(index, buffer)
    }

    /// Reserve `size` payload bytes in slot `index` and return them for
    /// writing.
    ///
    /// The slot receives the value when the returned guard is dropped.
    pub fn bind_output(&mut self, index: usize, size: usize) -> Result<OutputBuffer<'_>> {
        let slot = self.slot_mut(index)?;
        Ok(OutputBuffer::new(slot, size))
    }

    /// Append the values section (`[short] n` then every slot in order) to
    /// `out` and return its length.
    ///
    /// Unbound slots are written as null. Nothing is appended on error.
    pub fn encode_values(&self, version: ProtocolVersion, out: &mut BufferVec) -> Result<usize> {
        let count = u16::try_from(self.values.len())
            .map_err(|_| CqlError::TooManyValues(self.values.len()))?;

        let mut section = BufferVec::with_capacity(self.values.len() + 1);
        section.push(Bytes::copy_from_slice(&count.to_be_bytes()));
        for (index, value) in self.values.iter().enumerate() {
            if !value.is_consistent() {
                return Err(CqlError::InconsistentValue { index });
            }
            value.write_to(&mut section);
        }

        let len = section.total_len();
        tracing::trace!("Encoded {} values ({} bytes) for {}", count, len, version);
        out.extend(section);
        Ok(len)
    }

    /// QUERY v2 / EXECUTE v2 parameters after the query or id.
    fn encode_parameters(&self, version: ProtocolVersion, body: &mut BodySections) -> Result<()> {
        let mut flags = 0u8;
        if self.has_values() {
            flags |= query_flags::VALUES;
        }
        if self.page_size >= 0 {
            flags |= query_flags::PAGE_SIZE;
        }
        if !self.paging_state.is_empty() {
            flags |= query_flags::WITH_PAGING_STATE;
        }
        if self.serial_consistency != Consistency::Any {
            flags |= query_flags::WITH_SERIAL_CONSISTENCY;
        }

        put_short(&mut body.head, self.consistency.as_short());
        body.head.put_u8(flags);

        if self.has_values() {
            self.encode_values(version, &mut body.collection)?;
        }
        if self.page_size >= 0 {
            body.tail.put_i32(self.page_size);
        }
        if !self.paging_state.is_empty() {
            put_bytes(&mut body.tail, &self.paging_state)?;
        }
        if self.serial_consistency != Consistency::Any {
            put_short(&mut body.tail, self.serial_consistency.as_short());
        }
        Ok(())
    }

    /// One statement entry of a BATCH body, appended to `out`.
    pub(crate) fn encode_batch_entry(
        &self,
        version: ProtocolVersion,
        out: &mut BufferVec,
    ) -> Result<usize> {
        let mut head = Vec::with_capacity(1 + 4 + self.query_or_prepared_id.len());
        head.put_u8(self.kind as u8);
        match self.kind {
            StatementKind::Query => put_long_string(&mut head, &self.query_or_prepared_id)?,
            StatementKind::Prepared => put_short_bytes(&mut head, &self.query_or_prepared_id)?,
        }

        let mut entry = BufferVec::with_capacity(self.values.len() + 2);
        let head_len = head.len();
        entry.push(Bytes::from(head));
        let values_len = self.encode_values(version, &mut entry)?;

        out.extend(entry);
        Ok(head_len + values_len)
    }
}

impl EncodeBody for Statement {
    fn encode_body(&self, version: ProtocolVersion, body: &mut BodySections) -> Result<usize> {
        match (self.kind, version) {
            (StatementKind::Query, ProtocolVersion::V1) => {
                if self.has_values() {
                    return Err(CqlError::ValuesNotSupported(version.as_byte()));
                }
                put_long_string(&mut body.head, &self.query_or_prepared_id)?;
                put_short(&mut body.tail, self.consistency.as_short());
            }
            (StatementKind::Prepared, ProtocolVersion::V1) => {
                put_short_bytes(&mut body.head, &self.query_or_prepared_id)?;
                self.encode_values(version, &mut body.collection)?;
                put_short(&mut body.tail, self.consistency.as_short());
            }
            (StatementKind::Query, ProtocolVersion::V2) => {
                put_long_string(&mut body.head, &self.query_or_prepared_id)?;
                self.encode_parameters(version, body)?;
            }
            (StatementKind::Prepared, ProtocolVersion::V2) => {
                put_short_bytes(&mut body.head, &self.query_or_prepared_id)?;
                self.encode_parameters(version, body)?;
            }
        }
        Ok(body.len())
    }
}
