//! Mock tag implementation for testing and development.
//!
//! [`MockTag`] simulates a physical proximity tag without radio hardware.
//! Tests script its technology list, per-technology attributes, transceive
//! responses and failure modes, then assert on its session accounting
//! (connect/close counts, written payloads) after driving the core against
//! it.

use crate::error::{Result, TagError};
use crate::traits::{NdefStatus, TagDevice, TechKind, TechProperties};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default transceive answer: an ISO 7816 success status word.
const STATUS_OK: [u8; 2] = [0x90, 0x00];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock proximity tag for testing and development.
///
/// # Examples
///
/// ```
/// use rollcall_tag::{MockTag, TagDevice, TechKind};
///
/// #[tokio::main]
/// async fn main() -> rollcall_tag::Result<()> {
///     let tag = MockTag::builder(vec![0x04, 0xA1])
///         .with_tech(TechKind::IsoDep)
///         .transceive_response(vec![0x90, 0x00])
///         .build();
///
///     tag.connect(TechKind::IsoDep).await?;
///     let response = tag.transceive(TechKind::IsoDep, &[0x00, 0xA4]).await?;
///     tag.close(TechKind::IsoDep).await?;
///
///     assert_eq!(response, vec![0x90, 0x00]);
///     assert_eq!(tag.close_count(TechKind::IsoDep), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTag {
    uid: Vec<u8>,
    techs: Vec<TechKind>,
    properties: HashMap<TechKind, TechProperties>,
    ndef: Option<NdefStatus>,
    formatable: bool,
    fail_connect: Option<String>,
    fail_transceive: Option<String>,
    fail_properties: Option<String>,
    transceive_responses: Mutex<VecDeque<Vec<u8>>>,
    state: Mutex<SessionState>,
    counters: Mutex<SessionCounters>,
    written: Mutex<Option<Vec<u8>>>,
}

#[derive(Debug, Default)]
struct SessionState {
    connected: HashSet<TechKind>,
    ndef_connected: bool,
}

#[derive(Debug, Default)]
struct SessionCounters {
    connects: HashMap<TechKind, usize>,
    closes: HashMap<TechKind, usize>,
    ndef_connects: usize,
    ndef_writes: usize,
    ndef_closes: usize,
    formats: usize,
}

impl MockTag {
    /// Create a builder for a mock tag with the given byte identifier.
    pub fn builder(uid: Vec<u8>) -> MockTagBuilder {
        MockTagBuilder::new(uid)
    }

    /// Number of `connect` calls seen for a technology.
    pub fn connect_count(&self, tech: TechKind) -> usize {
        lock(&self.counters).connects.get(&tech).copied().unwrap_or(0)
    }

    /// Number of `close` calls seen for a technology.
    pub fn close_count(&self, tech: TechKind) -> usize {
        lock(&self.counters).closes.get(&tech).copied().unwrap_or(0)
    }

    /// Number of `ndef_connect` calls seen.
    pub fn ndef_connect_count(&self) -> usize {
        lock(&self.counters).ndef_connects
    }

    /// Number of `ndef_write` calls seen.
    pub fn ndef_write_count(&self) -> usize {
        lock(&self.counters).ndef_writes
    }

    /// Number of `ndef_close` calls seen.
    pub fn ndef_close_count(&self) -> usize {
        lock(&self.counters).ndef_closes
    }

    /// Number of `format_with` calls that actually formatted the tag.
    pub fn format_count(&self) -> usize {
        lock(&self.counters).formats
    }

    /// The last message written or formatted onto the tag, if any.
    pub fn written_message(&self) -> Option<Vec<u8>> {
        lock(&self.written).clone()
    }

    /// Number of sessions currently left open.
    ///
    /// A well-behaved handling call leaves this at zero.
    pub fn open_session_count(&self) -> usize {
        let state = lock(&self.state);
        state.connected.len() + usize::from(state.ndef_connected)
    }
}

impl TagDevice for MockTag {
    fn uid(&self) -> &[u8] {
        &self.uid
    }

    fn tech_list(&self) -> &[TechKind] {
        &self.techs
    }

    async fn connect(&self, tech: TechKind) -> Result<()> {
        if !self.has_tech(tech) {
            return Err(TagError::tech_unavailable(tech));
        }
        if let Some(message) = &self.fail_connect {
            return Err(TagError::tag_lost(message.clone()));
        }
        lock(&self.state).connected.insert(tech);
        *lock(&self.counters).connects.entry(tech).or_default() += 1;
        Ok(())
    }

    async fn transceive(&self, tech: TechKind, _command: &[u8]) -> Result<Vec<u8>> {
        if !lock(&self.state).connected.contains(&tech) {
            return Err(TagError::not_connected(tech));
        }
        if let Some(message) = &self.fail_transceive {
            return Err(TagError::transceive(message.clone()));
        }
        Ok(lock(&self.transceive_responses)
            .pop_front()
            .unwrap_or_else(|| STATUS_OK.to_vec()))
    }

    async fn properties(&self, tech: TechKind) -> Result<TechProperties> {
        if !lock(&self.state).connected.contains(&tech) {
            return Err(TagError::not_connected(tech));
        }
        if let Some(message) = &self.fail_properties {
            return Err(TagError::transceive(message.clone()));
        }
        self.properties
            .get(&tech)
            .cloned()
            .ok_or_else(|| TagError::transceive(format!("no {tech} attributes scripted")))
    }

    async fn close(&self, tech: TechKind) -> Result<()> {
        if !lock(&self.state).connected.remove(&tech) {
            return Err(TagError::not_connected(tech));
        }
        *lock(&self.counters).closes.entry(tech).or_default() += 1;
        Ok(())
    }

    async fn ndef_connect(&self) -> Result<Option<NdefStatus>> {
        let Some(status) = self.ndef else {
            return Ok(None);
        };
        lock(&self.state).ndef_connected = true;
        lock(&self.counters).ndef_connects += 1;
        Ok(Some(status))
    }

    async fn ndef_write(&self, message: &[u8]) -> Result<()> {
        if !lock(&self.state).ndef_connected {
            return Err(TagError::not_connected(TechKind::Ndef));
        }
        match self.ndef {
            Some(status) if status.writable => {
                lock(&self.counters).ndef_writes += 1;
                *lock(&self.written) = Some(message.to_vec());
                Ok(())
            }
            _ => Err(TagError::ndef("tag is read-only")),
        }
    }

    async fn ndef_close(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if !state.ndef_connected {
            return Err(TagError::not_connected(TechKind::Ndef));
        }
        state.ndef_connected = false;
        drop(state);
        lock(&self.counters).ndef_closes += 1;
        Ok(())
    }

    async fn format_with(&self, message: &[u8]) -> Result<bool> {
        if !self.formatable {
            return Ok(false);
        }
        lock(&self.counters).formats += 1;
        *lock(&self.written) = Some(message.to_vec());
        Ok(true)
    }
}

/// Builder for scripting a [`MockTag`].
#[derive(Debug)]
pub struct MockTagBuilder {
    uid: Vec<u8>,
    techs: Vec<TechKind>,
    properties: HashMap<TechKind, TechProperties>,
    transceive_responses: VecDeque<Vec<u8>>,
    ndef: Option<NdefStatus>,
    formatable: bool,
    fail_connect: Option<String>,
    fail_transceive: Option<String>,
    fail_properties: Option<String>,
}

impl MockTagBuilder {
    fn new(uid: Vec<u8>) -> Self {
        Self {
            uid,
            techs: Vec::new(),
            properties: HashMap::new(),
            transceive_responses: VecDeque::new(),
            ndef: None,
            formatable: false,
            fail_connect: None,
            fail_transceive: None,
            fail_properties: None,
        }
    }

    /// Advertise a technology on the tag.
    pub fn with_tech(mut self, tech: TechKind) -> Self {
        if !self.techs.contains(&tech) {
            self.techs.push(tech);
        }
        self
    }

    /// Script the attributes of a technology session.
    ///
    /// The matching technology is advertised automatically.
    pub fn with_properties(self, properties: TechProperties) -> Self {
        let tech = match &properties {
            TechProperties::MifareClassic { .. } => TechKind::MifareClassic,
            TechProperties::MifareUltralight { .. } => TechKind::MifareUltralight,
            TechProperties::NfcA { .. } => TechKind::NfcA,
            TechProperties::NfcB { .. } => TechKind::NfcB,
            TechProperties::NfcF { .. } => TechKind::NfcF,
            TechProperties::NfcV { .. } => TechKind::NfcV,
        };
        let mut this = self.with_tech(tech);
        this.properties.insert(tech, properties);
        this
    }

    /// Queue a transceive response. Responses are consumed in order; when
    /// the queue is empty the tag answers with a success status word.
    pub fn transceive_response(mut self, response: Vec<u8>) -> Self {
        self.transceive_responses.push_back(response);
        self
    }

    /// Give the tag an NDEF message session.
    pub fn with_ndef(mut self, writable: bool, capacity: usize) -> Self {
        self.ndef = Some(NdefStatus { writable, capacity });
        self.with_tech(TechKind::Ndef)
    }

    /// Give the tag formatting capability.
    pub fn formatable(mut self) -> Self {
        self.formatable = true;
        self.with_tech(TechKind::NdefFormatable)
    }

    /// Make every `connect` fail as if the tag left the field.
    pub fn failing_connect(mut self, message: impl Into<String>) -> Self {
        self.fail_connect = Some(message.into());
        self
    }

    /// Make every `transceive` fail after a successful connect.
    pub fn failing_transceive(mut self, message: impl Into<String>) -> Self {
        self.fail_transceive = Some(message.into());
        self
    }

    /// Make every `properties` read fail after a successful connect.
    pub fn failing_properties(mut self, message: impl Into<String>) -> Self {
        self.fail_properties = Some(message.into());
        self
    }

    /// Build the mock tag.
    pub fn build(self) -> MockTag {
        MockTag {
            uid: self.uid,
            techs: self.techs,
            properties: self.properties,
            ndef: self.ndef,
            formatable: self.formatable,
            fail_connect: self.fail_connect,
            fail_transceive: self.fail_transceive,
            fail_properties: self.fail_properties,
            transceive_responses: Mutex::new(self.transceive_responses),
            state: Mutex::new(SessionState::default()),
            counters: Mutex::new(SessionCounters::default()),
            written: Mutex::new(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::UltralightKind;

    #[tokio::test]
    async fn test_mock_tag_connect_and_close_accounting() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_tech(TechKind::IsoDep)
            .build();

        tag.connect(TechKind::IsoDep).await.unwrap();
        assert_eq!(tag.open_session_count(), 1);

        tag.close(TechKind::IsoDep).await.unwrap();
        assert_eq!(tag.connect_count(TechKind::IsoDep), 1);
        assert_eq!(tag.close_count(TechKind::IsoDep), 1);
        assert_eq!(tag.open_session_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_tag_connect_unknown_tech() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_tech(TechKind::NfcA)
            .build();

        let result = tag.connect(TechKind::IsoDep).await;
        assert!(matches!(result, Err(TagError::TechUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_mock_tag_transceive_requires_connect() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_tech(TechKind::IsoDep)
            .build();

        let result = tag.transceive(TechKind::IsoDep, &[0x00]).await;
        assert!(matches!(result, Err(TagError::NotConnected { .. })));
    }

    #[tokio::test]
    async fn test_mock_tag_scripted_responses_in_order() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_tech(TechKind::IsoDep)
            .transceive_response(vec![0x01])
            .transceive_response(vec![0x02])
            .build();

        tag.connect(TechKind::IsoDep).await.unwrap();
        assert_eq!(tag.transceive(TechKind::IsoDep, &[]).await.unwrap(), vec![0x01]);
        assert_eq!(tag.transceive(TechKind::IsoDep, &[]).await.unwrap(), vec![0x02]);
        // Queue exhausted: falls back to the success status word.
        assert_eq!(
            tag.transceive(TechKind::IsoDep, &[]).await.unwrap(),
            STATUS_OK.to_vec()
        );
    }

    #[tokio::test]
    async fn test_mock_tag_failing_transceive() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_tech(TechKind::NfcV)
            .failing_transceive("tag moved away")
            .build();

        tag.connect(TechKind::NfcV).await.unwrap();
        let result = tag.transceive(TechKind::NfcV, &[]).await;
        assert!(matches!(result, Err(TagError::Transceive { .. })));

        // The session is still open and must still be closable.
        tag.close(TechKind::NfcV).await.unwrap();
        assert_eq!(tag.close_count(TechKind::NfcV), 1);
    }

    #[tokio::test]
    async fn test_mock_tag_properties() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_properties(TechProperties::MifareUltralight {
                kind: UltralightKind::UltralightC,
            })
            .build();

        assert!(tag.has_tech(TechKind::MifareUltralight));

        tag.connect(TechKind::MifareUltralight).await.unwrap();
        let props = tag.properties(TechKind::MifareUltralight).await.unwrap();
        assert_eq!(
            props,
            TechProperties::MifareUltralight {
                kind: UltralightKind::UltralightC
            }
        );
    }

    #[tokio::test]
    async fn test_mock_tag_ndef_write_roundtrip() {
        let tag = MockTag::builder(vec![0x04, 0xA1]).with_ndef(true, 64).build();

        let status = tag.ndef_connect().await.unwrap().unwrap();
        assert!(status.writable);
        assert_eq!(status.capacity, 64);

        tag.ndef_write(&[0xD1, 0x01]).await.unwrap();
        tag.ndef_close().await.unwrap();

        assert_eq!(tag.written_message(), Some(vec![0xD1, 0x01]));
        assert_eq!(tag.ndef_write_count(), 1);
        assert_eq!(tag.open_session_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_tag_ndef_write_read_only() {
        let tag = MockTag::builder(vec![0x04, 0xA1]).with_ndef(false, 64).build();

        tag.ndef_connect().await.unwrap();
        let result = tag.ndef_write(&[0x00]).await;
        assert!(matches!(result, Err(TagError::Ndef { .. })));
        assert!(tag.written_message().is_none());
    }

    #[tokio::test]
    async fn test_mock_tag_no_ndef_session() {
        let tag = MockTag::builder(vec![0x04, 0xA1])
            .with_tech(TechKind::NfcA)
            .build();

        assert!(tag.ndef_connect().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_tag_format() {
        let tag = MockTag::builder(vec![0x04, 0xA1]).formatable().build();

        assert!(tag.format_with(&[0xD1]).await.unwrap());
        assert_eq!(tag.format_count(), 1);
        assert_eq!(tag.written_message(), Some(vec![0xD1]));

        let bare = MockTag::builder(vec![0x04, 0xA1]).build();
        assert!(!bare.format_with(&[0xD1]).await.unwrap());
    }
}
