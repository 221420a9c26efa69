//! Generic write sequence against a tag handle.
//!
//! The sequence follows the tag's capabilities: connect the NDEF session,
//! check writability and capacity, write, close. A tag with no NDEF session
//! at all falls back to a one-shot format-then-write. Every failure is
//! converted into a [`WriteOutcome`]; nothing here returns an error to the
//! caller, matching the single-attempt-per-tap contract.

use crate::request::WriteRequest;
use rollcall_core::constants::DEFAULT_LANGUAGE_CODE;
use rollcall_tag::{NdefStatus, TagDevice};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Options for payload encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Language code attached to well-known text records.
    pub language_code: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
        }
    }
}

/// Outcome of one write attempt against a physical tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// Whether the payload reached the tag.
    pub success: bool,

    /// Human-readable description of what happened.
    pub message: String,
}

impl WriteOutcome {
    /// Create a successful outcome.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Create a failed outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Write a request to a tag with default options.
pub async fn write<T: TagDevice>(tag: &T, request: &WriteRequest) -> WriteOutcome {
    write_with(tag, request, &WriterOptions::default()).await
}

/// Write a request to a tag.
///
/// Precedence: the writable NDEF session is tried first; the format fallback
/// runs only when the tag has no NDEF session at all. A formatted but
/// read-only tag fails without touching the format path.
pub async fn write_with<T: TagDevice>(
    tag: &T,
    request: &WriteRequest,
    options: &WriterOptions,
) -> WriteOutcome {
    let message = match request.to_message(&options.language_code) {
        Ok(message) => message,
        Err(error) => {
            warn!(kind = request.kind(), %error, "unencodable write request");
            return WriteOutcome::failure(format!("invalid write request: {error}"));
        }
    };
    let bytes = message.to_bytes();
    debug!(kind = request.kind(), size = bytes.len(), "writing tag");

    match tag.ndef_connect().await {
        Ok(Some(status)) => {
            let result = write_to_session(tag, status, &bytes).await;
            if let Err(error) = tag.ndef_close().await {
                warn!(%error, "failed to close NDEF session");
            }
            match result {
                Ok(()) => WriteOutcome::success(format!("wrote {} bytes", bytes.len())),
                Err(reason) => {
                    warn!(%reason, "tag write failed");
                    WriteOutcome::failure(reason)
                }
            }
        }
        Ok(None) => format_fallback(tag, &bytes).await,
        Err(error) => {
            warn!(%error, "could not open NDEF session");
            WriteOutcome::failure(format!("NDEF session error: {error}"))
        }
    }
}

/// Checks run against an open session. The capacity check happens before any
/// write call reaches the tag; an oversized payload is never partially sent.
async fn write_to_session<T: TagDevice>(
    tag: &T,
    status: NdefStatus,
    bytes: &[u8],
) -> Result<(), String> {
    if !status.writable {
        return Err("tag is not writable".to_string());
    }
    if bytes.len() > status.capacity {
        return Err(format!(
            "payload {} bytes exceeds tag capacity {} bytes",
            bytes.len(),
            status.capacity
        ));
    }
    tag.ndef_write(bytes)
        .await
        .map_err(|error| format!("write failed: {error}"))
}

async fn format_fallback<T: TagDevice>(tag: &T, bytes: &[u8]) -> WriteOutcome {
    match tag.format_with(bytes).await {
        Ok(true) => {
            debug!(size = bytes.len(), "formatted unformatted tag");
            WriteOutcome::success(format!("formatted tag with {} bytes", bytes.len()))
        }
        Ok(false) => WriteOutcome::failure("tag is neither writable nor formatable"),
        Err(error) => {
            warn!(%error, "tag format failed");
            WriteOutcome::failure(format!("format failed: {error}"))
        }
    }
}

/// Single-shot write arming.
///
/// Write mode stores at most one pending request; the next tag presented
/// while armed receives exactly one write attempt and the writer disarms,
/// whatever the outcome. Arming again replaces the pending request.
#[derive(Debug, Default)]
pub struct ArmedWriter {
    request: Option<WriteRequest>,
    options: WriterOptions,
}

impl ArmedWriter {
    /// Create an armed writer with custom options.
    pub fn new(options: WriterOptions) -> Self {
        Self {
            request: None,
            options,
        }
    }

    /// Arm the writer with a request for the next presented tag.
    pub fn arm(&mut self, request: WriteRequest) {
        debug!(kind = request.kind(), "write mode armed");
        self.request = Some(request);
    }

    /// Drop the pending request, returning it if one was armed.
    pub fn disarm(&mut self) -> Option<WriteRequest> {
        self.request.take()
    }

    /// Whether a request is pending.
    pub fn is_armed(&self) -> bool {
        self.request.is_some()
    }

    /// Run the single write attempt against a presented tag.
    ///
    /// Returns `None` when the writer is not armed. The writer is disarmed
    /// before the attempt runs, so a second tag never sees the same request.
    pub async fn on_tag<T: TagDevice>(&mut self, tag: &T) -> Option<WriteOutcome> {
        let request = self.request.take()?;
        Some(write_with(tag, &request, &self.options).await)
    }
}
