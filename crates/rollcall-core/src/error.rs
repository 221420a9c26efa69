//! Engine-level error types.
//!
//! These cover platform capability failures only. Per-tag failures never take
//! this shape: classification and write paths encode failure inside their
//! outcome values instead of returning errors.

use crate::types::HardwareStatus;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Platform capability failures surfaced through the error-notification
/// channel.
#[derive(Debug, Error)]
pub enum Error {
    /// The hardware adapter is missing or the radio is not enabled, so
    /// foreground capture cannot be armed.
    #[error("proximity hardware unavailable for capture: status is {status}")]
    AdapterUnavailable { status: HardwareStatus },

    /// The platform refused the foreground capture registration.
    #[error("foreground capture denied: {reason}")]
    PermissionDenied { reason: String },
}

impl Error {
    /// Create a new adapter unavailable error.
    pub fn adapter_unavailable(status: HardwareStatus) -> Self {
        Self::AdapterUnavailable { status }
    }

    /// Create a new permission denied error.
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }
}
