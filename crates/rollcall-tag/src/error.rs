//! Error types for tag session operations.
//!
//! These errors describe failures at the hardware session layer: a missing
//! technology, a transceive that died mid-air, a tag leaving the field. They
//! are always caught at the handler boundary and converted into outcome
//! values; nothing in this crate escalates them further.

use crate::traits::TechKind;

/// Result type alias for tag session operations.
pub type Result<T> = std::result::Result<T, TagError>;

/// Errors that can occur while driving a tag session.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The tag does not advertise the requested technology.
    #[error("technology {tech} not present on tag")]
    TechUnavailable { tech: TechKind },

    /// A session operation was attempted before `connect`.
    #[error("{tech} session is not connected")]
    NotConnected { tech: TechKind },

    /// The tag left the field or the session dropped.
    #[error("tag connection lost: {message}")]
    TagLost { message: String },

    /// A command exchange with the tag failed.
    #[error("transceive failed: {message}")]
    Transceive { message: String },

    /// An NDEF session operation failed.
    #[error("NDEF session error: {message}")]
    Ndef { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TagError {
    /// Create a new technology unavailable error.
    pub fn tech_unavailable(tech: TechKind) -> Self {
        Self::TechUnavailable { tech }
    }

    /// Create a new not-connected error.
    pub fn not_connected(tech: TechKind) -> Self {
        Self::NotConnected { tech }
    }

    /// Create a new tag lost error.
    pub fn tag_lost(message: impl Into<String>) -> Self {
        Self::TagLost {
            message: message.into(),
        }
    }

    /// Create a new transceive error.
    pub fn transceive(message: impl Into<String>) -> Self {
        Self::Transceive {
            message: message.into(),
        }
    }

    /// Create a new NDEF session error.
    pub fn ndef(message: impl Into<String>) -> Self {
        Self::Ndef {
            message: message.into(),
        }
    }
}
