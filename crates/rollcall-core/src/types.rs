//! Shared vocabulary types for the check-in pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of the proximity radio on this device.
///
/// The engine owns the single current value. It is re-derived from the
/// adapter whenever the engine initializes, broadcast to every observer on
/// each derivation, and delivered once immediately to late subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareStatus {
    /// The device has no proximity hardware.
    Unsupported,

    /// Hardware exists but the radio is switched off in system settings.
    Disabled,

    /// Hardware exists and the radio is on.
    Enabled,
}

impl HardwareStatus {
    /// Check whether tag traffic is possible in this state.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl fmt::Display for HardwareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unsupported => "Unsupported",
            Self::Disabled => "Disabled",
            Self::Enabled => "Enabled",
        };
        write!(f, "{}", label)
    }
}

/// Format a byte identifier the way outcomes report it (`"04 A1"`).
pub fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outcome of one read attempt against a physical tag.
///
/// Exactly one final outcome is produced per proximity event that reaches
/// classification. Failure is part of the value: a tag that cannot be read
/// yields `success == false` with a populated `error`, never a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadOutcome {
    /// Whether the read attempt succeeded.
    pub success: bool,

    /// Tag byte identifier, hex formatted (e.g. `"04 A1"`).
    pub tag_id: Option<String>,

    /// Human-readable technology name, possibly including a parsed sub-kind
    /// (e.g. `"Mifare Ultralight (Ultralight C)"`).
    pub tag_type: Option<String>,

    /// Recovered payload; format depends on the technology.
    pub data: Option<String>,

    /// Failure description when `success` is false.
    pub error: Option<String>,

    /// Timestamp when the outcome was produced.
    pub read_at: DateTime<Utc>,
}

impl ReadOutcome {
    /// Create a successful outcome for a classified tag.
    pub fn success(
        tag_id: impl Into<String>,
        tag_type: impl Into<String>,
        data: Option<String>,
    ) -> Self {
        Self {
            success: true,
            tag_id: Some(tag_id.into()),
            tag_type: Some(tag_type.into()),
            data,
            error: None,
            read_at: Utc::now(),
        }
    }

    /// Create a failed outcome carrying a human-readable reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tag_id: None,
            tag_type: None,
            data: None,
            error: Some(error.into()),
            read_at: Utc::now(),
        }
    }

    /// Create the provisional outcome returned synchronously while
    /// classification runs in the background.
    ///
    /// Callers must not treat this value as final; the real outcome arrives
    /// through the observer channel.
    pub fn processing(tag_id: impl Into<String>) -> Self {
        Self {
            success: true,
            tag_id: Some(tag_id.into()),
            tag_type: Some("Processing...".to_string()),
            data: None,
            error: None,
            read_at: Utc::now(),
        }
    }
}
