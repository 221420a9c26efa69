//! Typed write requests and their encoding into NDEF messages.

use crate::error::Result;
use crate::message::NdefMessage;
use crate::record::NdefRecord;
use serde::{Deserialize, Serialize};

/// MIME type of the parameter record in an app-launch message.
pub const APP_PARAMS_MIME: &str = "application/vnd.rollcall.params";

/// A request to store a payload on the next tag presented in write mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteRequest {
    /// Plain text payload.
    Text(String),

    /// URI payload.
    Uri(String),

    /// App-launch payload: application identifier plus launch parameters.
    AppLaunch { package: String, params: String },

    /// Device-pairing payload carrying a peripheral address.
    DevicePairing { address: String },

    /// Caller-supplied record set, passed through unmodified.
    Custom(Vec<NdefRecord>),
}

impl WriteRequest {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Uri(_) => "uri",
            Self::AppLaunch { .. } => "app-launch",
            Self::DevicePairing { .. } => "device-pairing",
            Self::Custom(_) => "custom",
        }
    }

    /// Build the NDEF message this request stores on a tag.
    ///
    /// Text and device-pairing payloads are tagged with `language_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field exceeds a record wire-format limit or a
    /// custom record set is empty.
    pub fn to_message(&self, language_code: &str) -> Result<NdefMessage> {
        match self {
            Self::Text(text) => Ok(NdefMessage::single(NdefRecord::text(language_code, text)?)),
            Self::Uri(uri) => Ok(NdefMessage::single(NdefRecord::uri(uri)?)),
            Self::AppLaunch { package, params } => NdefMessage::new(vec![
                NdefRecord::application(package)?,
                NdefRecord::mime(APP_PARAMS_MIME, params.as_bytes().to_vec())?,
            ]),
            Self::DevicePairing { address } => Ok(NdefMessage::single(NdefRecord::text(
                language_code,
                &format!("BT:{address}"),
            )?)),
            Self::Custom(records) => NdefMessage::new(records.clone()),
        }
    }
}
