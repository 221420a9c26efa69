//! Tag handle abstraction for the rollcall check-in core.
//!
//! A tag handle represents a momentarily-reachable physical proximity tag.
//! It exposes a byte identifier, the set of wire-level technologies the tag
//! advertises, and technology-specific session operations. Handles are valid
//! only for the duration of the proximity event that produced them and must
//! not be retained past the handling call.
//!
//! The crate follows the same shape as a hardware abstraction layer: a trait
//! contract ([`TagDevice`]), a mock implementation for development and
//! testing ([`MockTag`]), and an enum wrapper for concrete dispatch
//! ([`AnyTag`]).

pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;

pub use devices::AnyTag;
pub use error::{Result, TagError};
pub use mock::{MockTag, MockTagBuilder};
pub use traits::{NdefStatus, TagDevice, TechKind, TechProperties, UltralightKind};
