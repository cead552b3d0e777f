//! Encoder configuration.
//!
//! Defaults applied to new statements and to message framing. Usually loaded
//! from JSON alongside the rest of the driver configuration:
//!
//! ```
//! use cqlwire::config::EncoderConfig;
//! use cqlwire::protocol::{Consistency, ProtocolVersion};
//!
//! let config = EncoderConfig::from_json(
//!     r#"{ "protocol_version": 1, "consistency": "QUORUM" }"#,
//! ).unwrap();
//!
//! assert_eq!(config.protocol_version, ProtocolVersion::V1);
//! assert_eq!(config.consistency, Consistency::Quorum);
//! assert_eq!(config.page_size, -1);
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::protocol::{Consistency, ProtocolVersion};
use crate::request::PAGE_SIZE_UNSET;

/// Default protocol version.
pub const DEFAULT_PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion::V2;

/// Default consistency for new statements.
pub const DEFAULT_CONSISTENCY: Consistency = Consistency::One;

/// Default serial consistency (`Any` is not sent).
pub const DEFAULT_SERIAL_CONSISTENCY: Consistency = Consistency::Any;

/// Configuration for request encoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    /// Protocol version used when framing messages.
    pub protocol_version: ProtocolVersion,
    /// Header flags byte (see `protocol::flags`).
    pub header_flags: u8,
    /// Consistency for new statements.
    pub consistency: Consistency,
    /// Serial consistency for new statements.
    pub serial_consistency: Consistency,
    /// Result page size for new statements; negative means unset.
    pub page_size: i32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            header_flags: 0,
            consistency: DEFAULT_CONSISTENCY,
            serial_consistency: DEFAULT_SERIAL_CONSISTENCY,
            page_size: PAGE_SIZE_UNSET,
        }
    }
}

impl EncoderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
