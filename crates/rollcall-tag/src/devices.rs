//! Enum wrapper for tag handle dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) is not object-safe, so
//! `Box<dyn TagDevice>` is unavailable. [`AnyTag`] provides concrete type
//! dispatch instead, which keeps the abstraction zero-cost and lets event
//! structs carry a tag handle without a generic parameter.

use crate::error::Result;
use crate::mock::MockTag;
use crate::traits::{NdefStatus, TagDevice, TechKind, TechProperties};

/// Enum wrapper for tag handle dispatch.
///
/// # Examples
///
/// ```
/// use rollcall_tag::{AnyTag, MockTag, TagDevice, TechKind};
///
/// let tag = MockTag::builder(vec![0x04, 0xA1])
///     .with_tech(TechKind::IsoDep)
///     .build();
/// let any_tag = AnyTag::Mock(tag);
///
/// assert!(any_tag.has_tech(TechKind::IsoDep));
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTag {
    /// Mock tag for development and testing.
    Mock(MockTag),
}

impl TagDevice for AnyTag {
    fn uid(&self) -> &[u8] {
        match self {
            Self::Mock(tag) => tag.uid(),
        }
    }

    fn tech_list(&self) -> &[TechKind] {
        match self {
            Self::Mock(tag) => tag.tech_list(),
        }
    }

    async fn connect(&self, tech: TechKind) -> Result<()> {
        match self {
            Self::Mock(tag) => tag.connect(tech).await,
        }
    }

    async fn transceive(&self, tech: TechKind, command: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Mock(tag) => tag.transceive(tech, command).await,
        }
    }

    async fn properties(&self, tech: TechKind) -> Result<TechProperties> {
        match self {
            Self::Mock(tag) => tag.properties(tech).await,
        }
    }

    async fn close(&self, tech: TechKind) -> Result<()> {
        match self {
            Self::Mock(tag) => tag.close(tech).await,
        }
    }

    async fn ndef_connect(&self) -> Result<Option<NdefStatus>> {
        match self {
            Self::Mock(tag) => tag.ndef_connect().await,
        }
    }

    async fn ndef_write(&self, message: &[u8]) -> Result<()> {
        match self {
            Self::Mock(tag) => tag.ndef_write(message).await,
        }
    }

    async fn ndef_close(&self) -> Result<()> {
        match self {
            Self::Mock(tag) => tag.ndef_close().await,
        }
    }

    async fn format_with(&self, message: &[u8]) -> Result<bool> {
        match self {
            Self::Mock(tag) => tag.format_with(message).await,
        }
    }
}
