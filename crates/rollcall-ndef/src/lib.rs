//! NDEF message model and the tag write path.
//!
//! This crate owns everything that touches NDEF payloads: the record and
//! message binary codec, typed [`WriteRequest`]s and their encoding, the
//! generic connect-check-write-close sequence with its format fallback, the
//! single-shot write arming used by write mode, and check-in payload
//! extraction from scanned messages.

pub mod check_in;
pub mod error;
pub mod message;
pub mod record;
pub mod request;
pub mod writer;

pub use error::{NdefError, Result};
pub use message::NdefMessage;
pub use record::{NdefRecord, Tnf};
pub use request::WriteRequest;
pub use writer::{ArmedWriter, WriteOutcome, WriterOptions, write, write_with};
