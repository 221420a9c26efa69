//! NDEF record model and binary codec.

use crate::error::{NdefError, Result};
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

/// Record header flag bits.
mod flags {
    pub const MB: u8 = 0x80;
    pub const ME: u8 = 0x40;
    pub const CF: u8 = 0x20;
    pub const SR: u8 = 0x10;
    pub const IL: u8 = 0x08;
    pub const TNF_MASK: u8 = 0x07;
}

/// Well-known record type name for text records.
pub const RTD_TEXT: &[u8] = b"T";

/// Well-known record type name for URI records.
pub const RTD_URI: &[u8] = b"U";

/// External type name of an application-identifier record.
pub const APPLICATION_RECORD_TYPE: &[u8] = b"android.com:pkg";

/// Standard URI abbreviation prefixes, indexed by the URI record's
/// identifier code byte. Index 0 means "no abbreviation".
const URI_PREFIXES: [&str; 36] = [
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

/// Type Name Format of an NDEF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tnf {
    /// Empty record.
    Empty,

    /// NFC Forum well-known type (text, URI, ...).
    WellKnown,

    /// MIME media type.
    MimeMedia,

    /// Absolute URI type.
    AbsoluteUri,

    /// NFC Forum external type.
    ExternalType,

    /// Unknown payload type.
    Unknown,

    /// Continuation chunk of a previous record.
    Unchanged,
}

impl Tnf {
    /// Wire value of this type name format.
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Empty => 0x00,
            Self::WellKnown => 0x01,
            Self::MimeMedia => 0x02,
            Self::AbsoluteUri => 0x03,
            Self::ExternalType => 0x04,
            Self::Unknown => 0x05,
            Self::Unchanged => 0x06,
        }
    }

    /// Decode a wire value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Empty),
            0x01 => Some(Self::WellKnown),
            0x02 => Some(Self::MimeMedia),
            0x03 => Some(Self::AbsoluteUri),
            0x04 => Some(Self::ExternalType),
            0x05 => Some(Self::Unknown),
            0x06 => Some(Self::Unchanged),
            _ => None,
        }
    }
}

/// One NDEF record: a type name format, a type, an optional id, and a
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefRecord {
    tnf: Tnf,
    record_type: Vec<u8>,
    id: Vec<u8>,
    payload: Vec<u8>,
}

/// Advance `offset` by `n` bytes into `input`, failing when the data runs
/// out before the record does.
fn take<'a>(input: &'a [u8], offset: &mut usize, n: usize) -> Result<&'a [u8]> {
    let end = *offset + n;
    let slice = input.get(*offset..end).ok_or_else(|| NdefError::Truncated {
        needed: end - input.len(),
    })?;
    *offset = end;
    Ok(slice)
}

/// Outcome of decoding a single record from a byte stream.
pub(crate) struct DecodedRecord {
    pub record: NdefRecord,
    pub message_end: bool,
    pub consumed: usize,
}

impl NdefRecord {
    /// Create a record from raw parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the type or id exceeds 255 bytes, or the payload
    /// exceeds the 32-bit wire-format limit.
    pub fn new(tnf: Tnf, record_type: Vec<u8>, id: Vec<u8>, payload: Vec<u8>) -> Result<Self> {
        if record_type.len() > u8::MAX as usize {
            return Err(NdefError::FieldTooLong {
                field: "type",
                len: record_type.len(),
                max: u8::MAX as usize,
            });
        }
        if id.len() > u8::MAX as usize {
            return Err(NdefError::FieldTooLong {
                field: "id",
                len: id.len(),
                max: u8::MAX as usize,
            });
        }
        if payload.len() > u32::MAX as usize {
            return Err(NdefError::FieldTooLong {
                field: "payload",
                len: payload.len(),
                max: u32::MAX as usize,
            });
        }
        Ok(Self {
            tnf,
            record_type,
            id,
            payload,
        })
    }

    /// Create a well-known text record tagged with a language code.
    ///
    /// # Errors
    ///
    /// Returns an error if the language code exceeds the 63-byte limit of
    /// the text record status byte.
    pub fn text(language: &str, text: &str) -> Result<Self> {
        if language.len() > 0x3F {
            return Err(NdefError::FieldTooLong {
                field: "language code",
                len: language.len(),
                max: 0x3F,
            });
        }
        let mut payload = Vec::with_capacity(1 + language.len() + text.len());
        payload.push(language.len() as u8);
        payload.extend_from_slice(language.as_bytes());
        payload.extend_from_slice(text.as_bytes());
        Self::new(Tnf::WellKnown, RTD_TEXT.to_vec(), Vec::new(), payload)
    }

    /// Create a well-known URI record, abbreviating the scheme with the
    /// standard prefix table.
    ///
    /// # Errors
    ///
    /// Returns an error if the abbreviated URI exceeds the payload limit.
    pub fn uri(uri: &str) -> Result<Self> {
        // Longest matching prefix wins; index 0 (no abbreviation) otherwise.
        let (code, prefix) = URI_PREFIXES
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, prefix)| uri.starts_with(**prefix))
            .max_by_key(|(_, prefix)| prefix.len())
            .map_or((0, ""), |(code, prefix)| (code, *prefix));

        let rest = &uri[prefix.len()..];
        let mut payload = Vec::with_capacity(1 + rest.len());
        payload.push(code as u8);
        payload.extend_from_slice(rest.as_bytes());
        Self::new(Tnf::WellKnown, RTD_URI.to_vec(), Vec::new(), payload)
    }

    /// Create an application-identifier record for launching an app.
    ///
    /// # Errors
    ///
    /// Returns an error if the package name exceeds the payload limit.
    pub fn application(package: &str) -> Result<Self> {
        Self::new(
            Tnf::ExternalType,
            APPLICATION_RECORD_TYPE.to_vec(),
            Vec::new(),
            package.as_bytes().to_vec(),
        )
    }

    /// Create a MIME-typed record carrying raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the MIME type exceeds 255 bytes or the data
    /// exceeds the payload limit.
    pub fn mime(mime_type: &str, data: Vec<u8>) -> Result<Self> {
        Self::new(Tnf::MimeMedia, mime_type.as_bytes().to_vec(), Vec::new(), data)
    }

    /// Type name format of this record.
    pub fn tnf(&self) -> Tnf {
        self.tnf
    }

    /// Type field of this record.
    pub fn record_type(&self) -> &[u8] {
        &self.record_type
    }

    /// Id field of this record.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Payload of this record.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decode the text of a well-known text record.
    ///
    /// Returns `None` for any other record shape or an undecodable payload.
    pub fn to_text(&self) -> Option<String> {
        if self.tnf != Tnf::WellKnown || self.record_type != RTD_TEXT {
            return None;
        }
        let (&status, rest) = self.payload.split_first()?;
        let language_len = (status & 0x3F) as usize;
        if status & 0x80 != 0 {
            // UTF-16 text records are not produced by this core.
            return None;
        }
        let text = rest.get(language_len..)?;
        String::from_utf8(text.to_vec()).ok()
    }

    /// Decode the URI of a well-known URI record, expanding the
    /// abbreviation prefix.
    ///
    /// Returns `None` for any other record shape or an undecodable payload.
    pub fn to_uri(&self) -> Option<String> {
        if self.tnf != Tnf::WellKnown || self.record_type != RTD_URI {
            return None;
        }
        let (&code, rest) = self.payload.split_first()?;
        let prefix = URI_PREFIXES.get(code as usize).copied().unwrap_or("");
        let rest = std::str::from_utf8(rest).ok()?;
        Some(format!("{prefix}{rest}"))
    }

    /// Encoded size of this record in bytes.
    pub fn encoded_len(&self) -> usize {
        let payload_len_bytes = if self.payload.len() <= u8::MAX as usize {
            1
        } else {
            4
        };
        let id_bytes = if self.id.is_empty() {
            0
        } else {
            1 + self.id.len()
        };
        2 + payload_len_bytes + id_bytes + self.record_type.len() + self.payload.len()
    }

    /// Encode this record into `buf` with the given message-boundary flags.
    pub(crate) fn encode(&self, buf: &mut BytesMut, message_begin: bool, message_end: bool) {
        let short_record = self.payload.len() <= u8::MAX as usize;

        let mut header = self.tnf.as_u8();
        if message_begin {
            header |= flags::MB;
        }
        if message_end {
            header |= flags::ME;
        }
        if short_record {
            header |= flags::SR;
        }
        if !self.id.is_empty() {
            header |= flags::IL;
        }

        buf.put_u8(header);
        buf.put_u8(self.record_type.len() as u8);
        if short_record {
            buf.put_u8(self.payload.len() as u8);
        } else {
            buf.put_u32(self.payload.len() as u32);
        }
        if !self.id.is_empty() {
            buf.put_u8(self.id.len() as u8);
        }
        buf.put_slice(&self.record_type);
        buf.put_slice(&self.id);
        buf.put_slice(&self.payload);
    }

    /// Decode one record from the front of `input`.
    pub(crate) fn decode(input: &[u8]) -> Result<DecodedRecord> {
        let mut offset = 0usize;

        let header = take(input, &mut offset, 1)?[0];
        if header & flags::CF != 0 {
            return Err(NdefError::malformed("chunked records not supported"));
        }
        let tnf = Tnf::from_u8(header & flags::TNF_MASK)
            .ok_or_else(|| NdefError::malformed(format!("reserved TNF {}", header & flags::TNF_MASK)))?;

        let type_len = take(input, &mut offset, 1)?[0] as usize;
        let payload_len = if header & flags::SR != 0 {
            take(input, &mut offset, 1)?[0] as usize
        } else {
            let bytes = take(input, &mut offset, 4)?;
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
        };
        let id_len = if header & flags::IL != 0 {
            take(input, &mut offset, 1)?[0] as usize
        } else {
            0
        };

        let record_type = take(input, &mut offset, type_len)?.to_vec();
        let id = take(input, &mut offset, id_len)?.to_vec();
        let payload = take(input, &mut offset, payload_len)?.to_vec();

        Ok(DecodedRecord {
            record: NdefRecord {
                tnf,
                record_type,
                id,
                payload,
            },
            message_end: header & flags::ME != 0,
            consumed: offset,
        })
    }
}
