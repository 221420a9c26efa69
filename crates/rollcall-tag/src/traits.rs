//! Tag handle trait definition and technology vocabulary.
//!
//! The [`TagDevice`] trait is the contract between the platform radio stack
//! and the classification/write core. It uses native `async fn` methods
//! (Rust 1.90 + Edition 2024 RPITIT), so no `async_trait` macro is needed.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A wire-level technology name a tag handle can advertise.
///
/// The first seven variants are classification targets. The remaining ones
/// are capability-only names real handles also carry (an NDEF-formatted tag
/// advertises `Ndef` next to its radio technology); they never match a
/// classification handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TechKind {
    /// ISO 14443-4 tags that speak APDUs.
    IsoDep,

    /// Mifare Classic memory cards.
    MifareClassic,

    /// Mifare Ultralight family cards.
    MifareUltralight,

    /// Generic NFC-A (ISO 14443-3A) access.
    NfcA,

    /// Generic NFC-B (ISO 14443-3B) access.
    NfcB,

    /// Generic NFC-F (JIS 6319-4, FeliCa) access.
    NfcF,

    /// Generic NFC-V (ISO 15693, vicinity) access.
    NfcV,

    /// NDEF message session on an already-formatted tag.
    Ndef,

    /// Formatting capability of an unformatted tag.
    NdefFormatable,

    /// Barcode-style read-only tags.
    NfcBarcode,
}

impl TechKind {
    /// Get the canonical technology name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::IsoDep => "IsoDep",
            Self::MifareClassic => "MifareClassic",
            Self::MifareUltralight => "MifareUltralight",
            Self::NfcA => "NfcA",
            Self::NfcB => "NfcB",
            Self::NfcF => "NfcF",
            Self::NfcV => "NfcV",
            Self::Ndef => "Ndef",
            Self::NdefFormatable => "NdefFormatable",
            Self::NfcBarcode => "NfcBarcode",
        }
    }
}

impl fmt::Display for TechKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sub-kind of a Mifare Ultralight card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum UltralightKind {
    /// Original Ultralight (64 bytes).
    Ultralight,

    /// Ultralight C with 3DES authentication.
    UltralightC,

    /// Unrecognized sub-kind.
    Unknown,
}

impl UltralightKind {
    /// Get a human-readable name for the sub-kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ultralight => "Ultralight",
            Self::UltralightC => "Ultralight C",
            Self::Unknown => "Unknown",
        }
    }
}

/// Low-level attributes a connected technology session can report without a
/// full command exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TechProperties {
    /// Mifare Classic memory geometry.
    MifareClassic { sector_count: u8 },

    /// Mifare Ultralight sub-kind.
    MifareUltralight { kind: UltralightKind },

    /// NFC-A anticollision answer and select acknowledge.
    NfcA { atqa: [u8; 2], sak: u8 },

    /// NFC-B application data and protocol info bytes.
    NfcB {
        application_data: Vec<u8>,
        protocol_info: Vec<u8>,
    },

    /// NFC-F manufacturer and system code bytes.
    NfcF {
        manufacturer: Vec<u8>,
        system_code: Vec<u8>,
    },

    /// NFC-V data storage format identifier and response flags.
    NfcV { dsf_id: u8, response_flags: u8 },
}

/// Writability and capacity reported by a connected NDEF session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefStatus {
    /// Whether the tag accepts message writes.
    pub writable: bool,

    /// Maximum message size in bytes.
    pub capacity: usize,
}

/// A momentarily-reachable physical proximity tag.
///
/// Handles are valid only for the duration of the proximity event that
/// produced them. A handle moves into exactly one handling call (a
/// classification task or a single write attempt) and is dropped there.
///
/// # Session discipline
///
/// Technology sessions are scoped: every successful `connect` must be paired
/// with exactly one `close` before the handling call returns, on success and
/// failure paths alike. The NDEF surface follows the same rule via
/// `ndef_connect`/`ndef_close`; `format_with` is a single atomic
/// connect-format-close operation.
///
/// # Object Safety and Dynamic Dispatch
///
/// Native `async fn` methods are not object-safe, so `Box<dyn TagDevice>`
/// is not available. Use generic type parameters, or the [`AnyTag`]
/// enum wrapper from the [`devices`](crate::devices) module when a concrete
/// type is needed (e.g. inside an event struct).
///
/// [`AnyTag`]: crate::devices::AnyTag
pub trait TagDevice: Send + Sync {
    /// Tag byte identifier (UID).
    fn uid(&self) -> &[u8];

    /// Technologies this handle advertises.
    fn tech_list(&self) -> &[TechKind];

    /// Check whether the handle advertises a given technology.
    fn has_tech(&self, tech: TechKind) -> bool {
        self.tech_list().contains(&tech)
    }

    /// Open a session for one of the advertised technologies.
    ///
    /// # Errors
    ///
    /// Returns an error if the technology is not advertised or the tag has
    /// left the field.
    async fn connect(&self, tech: TechKind) -> Result<()>;

    /// Exchange a raw command with the tag over a connected session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected or the exchange
    /// fails mid-air.
    async fn transceive(&self, tech: TechKind, command: &[u8]) -> Result<Vec<u8>>;

    /// Read the low-level attributes of a connected session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected or the attributes
    /// cannot be read.
    async fn properties(&self, tech: TechKind) -> Result<TechProperties>;

    /// Close a connected session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was never connected.
    async fn close(&self, tech: TechKind) -> Result<()>;

    /// Open the NDEF message session, if the tag is NDEF-formatted.
    ///
    /// Returns `None` when the tag has no NDEF session at all (which is what
    /// makes the format fallback eligible), `Some` with the session status
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag has left the field.
    async fn ndef_connect(&self) -> Result<Option<NdefStatus>>;

    /// Write an encoded NDEF message through a connected NDEF session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not connected, the tag is
    /// read-only, or the write fails mid-transfer.
    async fn ndef_write(&self, message: &[u8]) -> Result<()>;

    /// Close a connected NDEF session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session was never connected.
    async fn ndef_close(&self) -> Result<()>;

    /// Format an unformatted tag with an initial message in one atomic
    /// connect-format-close operation.
    ///
    /// Returns `false` when the tag has no formatting capability.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting is supported but fails partway.
    async fn format_with(&self, message: &[u8]) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tech_kind_name() {
        assert_eq!(TechKind::IsoDep.name(), "IsoDep");
        assert_eq!(TechKind::MifareClassic.name(), "MifareClassic");
        assert_eq!(TechKind::NdefFormatable.name(), "NdefFormatable");
    }

    #[test]
    fn test_tech_kind_display() {
        assert_eq!(TechKind::NfcV.to_string(), "NfcV");
        assert_eq!(TechKind::Ndef.to_string(), "Ndef");
    }

    #[test]
    fn test_tech_kind_serialization() {
        let json = serde_json::to_string(&TechKind::MifareUltralight).unwrap();
        let back: TechKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TechKind::MifareUltralight);
    }

    #[test]
    fn test_ultralight_kind_name() {
        assert_eq!(UltralightKind::Ultralight.name(), "Ultralight");
        assert_eq!(UltralightKind::UltralightC.name(), "Ultralight C");
        assert_eq!(UltralightKind::Unknown.name(), "Unknown");
    }
}
