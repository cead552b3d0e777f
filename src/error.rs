//! Error types for cqlwire.

use thiserror::Error;

/// Main error type for all encoding operations.
#[derive(Debug, Error)]
pub enum CqlError {
    /// Bind index is not below the statement's value count.
    #[error("Index out of bounds: {index} >= {count}")]
    IndexOutOfBounds { index: usize, count: usize },

    /// Map collection (possibly nested) with an odd number of items.
    #[error("Invalid item count: map has {count} items")]
    InvalidItemCount { count: usize },

    /// A value slot whose length prefix disagrees with its payload.
    #[error("Inconsistent value at index {index}")]
    InconsistentValue { index: usize },

    /// More value slots than a `[short]` count can describe.
    #[error("Too many values: {0}")]
    TooManyValues(usize),

    /// More batch entries than a `[short]` count can describe.
    #[error("Too many batch statements: {0}")]
    TooManyStatements(usize),

    /// Protocol version not supported by this encoder.
    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// Request kind cannot be encoded for the given protocol version.
    #[error("Opcode {opcode:#04x} not supported by protocol version {version}")]
    UnsupportedOpcode { opcode: u8, version: u8 },

    /// Bound values cannot be sent with this request on this protocol version.
    #[error("Bound values not supported by protocol version {0}")]
    ValuesNotSupported(u8),

    /// Encoded body does not fit the 4-byte signed length field.
    #[error("Body too large: {0} bytes")]
    BodyTooLarge(usize),

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error while handing bytes to the transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using CqlError.
pub type Result<T> = std::result::Result<T, CqlError>;
