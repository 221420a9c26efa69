//! NDEF message: an ordered, non-empty sequence of records.

use crate::error::{NdefError, Result};
use crate::record::NdefRecord;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};

/// An NDEF message as stored on a tag.
///
/// The first record carries the message-begin flag and the last the
/// message-end flag; a message always holds at least one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefMessage {
    records: Vec<NdefRecord>,
}

impl NdefMessage {
    /// Create a message from records.
    ///
    /// # Errors
    ///
    /// Returns an error if `records` is empty.
    pub fn new(records: Vec<NdefRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(NdefError::EmptyMessage);
        }
        Ok(Self { records })
    }

    /// Create a single-record message.
    pub fn single(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// Records of this message, in order.
    pub fn records(&self) -> &[NdefRecord] {
        &self.records
    }

    /// Encoded size of the message in bytes.
    pub fn byte_len(&self) -> usize {
        self.records.iter().map(NdefRecord::encoded_len).sum()
    }

    /// Encode the message to its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.byte_len());
        let last = self.records.len().saturating_sub(1);
        for (index, record) in self.records.iter().enumerate() {
            record.encode(&mut buf, index == 0, index == last);
        }
        buf.to_vec()
    }

    /// Parse a message from its wire form.
    ///
    /// # Errors
    ///
    /// Returns an error on empty input, truncated records, a missing
    /// message-end flag, or bytes trailing the final record.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(NdefError::EmptyMessage);
        }

        let mut records = Vec::new();
        let mut rest = bytes;
        loop {
            let decoded = NdefRecord::decode(rest)?;
            rest = &rest[decoded.consumed..];
            let message_end = decoded.message_end;
            records.push(decoded.record);
            if message_end {
                break;
            }
            if rest.is_empty() {
                return Err(NdefError::malformed("missing message-end flag"));
            }
        }
        if !rest.is_empty() {
            return Err(NdefError::malformed("trailing bytes after message end"));
        }

        Ok(Self { records })
    }
}
