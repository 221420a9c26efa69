//! Error types for NDEF encoding and decoding.

use thiserror::Error;

/// Result type alias for NDEF operations.
pub type Result<T> = std::result::Result<T, NdefError>;

/// Errors that can occur while building or parsing NDEF data.
#[derive(Debug, Error)]
pub enum NdefError {
    /// A message must carry at least one record.
    #[error("empty NDEF message")]
    EmptyMessage,

    /// The binary data does not form a valid record.
    #[error("malformed NDEF record: {message}")]
    Malformed { message: String },

    /// The binary data ends before the record does.
    #[error("truncated NDEF data: need {needed} more bytes")]
    Truncated { needed: usize },

    /// A record field exceeds its wire-format limit.
    #[error("record {field} too long: {len} bytes, max {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl NdefError {
    /// Create a new malformed record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
