//! Protocol constants shared across the workspace.

/// ISO 7816-4 SELECT-by-AID command addressing the NDEF tag application.
///
/// Sent as the minimal probe when classifying an ISO-DEP tag; any response,
/// including an error status word, proves the tag speaks ISO-DEP.
pub const SELECT_NDEF_APPLICATION: [u8; 12] = [
    0x00, 0xA4, 0x04, 0x00, 0x07, 0xD2, 0x76, 0x00, 0x00, 0x85, 0x01, 0x01,
];

/// Language code attached to well-known text records when none is configured.
pub const DEFAULT_LANGUAGE_CODE: &str = "en";
