//! Integration tests for the reader engine.
//!
//! These verify the observer fan-out guarantees: initial and late-join
//! status delivery, duplicate-listener idempotence, per-listener panic
//! isolation, and the provisional-then-final outcome flow for a tap.

use rollcall_core::{Error, HardwareStatus, ReadOutcome};
use rollcall_reader::{
    AnyAdapter, DiscoveryAction, MockAdapter, ReaderEngine, ReaderListener, TapEvent,
};
use rollcall_tag::{AnyTag, MockTag, TechKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Everything a listener saw, in delivery order.
#[derive(Debug)]
enum Seen {
    Status(HardwareStatus),
    Tag(ReadOutcome),
    Error(String),
}

struct RecordingListener {
    seen_tx: mpsc::UnboundedSender<Seen>,
}

impl RecordingListener {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Seen>) {
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();
        (Arc::new(Self { seen_tx }), seen_rx)
    }
}

impl ReaderListener for RecordingListener {
    fn on_status_changed(&self, status: HardwareStatus) {
        let _ = self.seen_tx.send(Seen::Status(status));
    }

    fn on_tag_detected(&self, outcome: &ReadOutcome) {
        let _ = self.seen_tx.send(Seen::Tag(outcome.clone()));
    }

    fn on_error(&self, error: &Error) {
        let _ = self.seen_tx.send(Seen::Error(error.to_string()));
    }
}

/// A listener that panics on every delivery.
struct PanickingListener;

impl ReaderListener for PanickingListener {
    fn on_status_changed(&self, _status: HardwareStatus) {
        panic!("listener failure");
    }

    fn on_tag_detected(&self, _outcome: &ReadOutcome) {
        panic!("listener failure");
    }

    fn on_error(&self, _error: &Error) {
        panic!("listener failure");
    }
}

async fn recv(seen_rx: &mut mpsc::UnboundedReceiver<Seen>) -> Seen {
    timeout(Duration::from_secs(2), seen_rx.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("listener channel closed")
}

async fn assert_silent(seen_rx: &mut mpsc::UnboundedReceiver<Seen>) {
    assert!(
        timeout(Duration::from_millis(200), seen_rx.recv())
            .await
            .is_err(),
        "unexpected delivery"
    );
}

fn iso_dep_tag(uid: Vec<u8>) -> AnyTag {
    AnyTag::Mock(
        MockTag::builder(uid)
            .with_tech(TechKind::IsoDep)
            .transceive_response(vec![0x90, 0x00])
            .build(),
    )
}

#[tokio::test]
async fn test_initialize_broadcasts_status_to_registered_listeners() {
    let engine = ReaderEngine::new();
    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);

    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    assert!(matches!(
        recv(&mut seen_rx).await,
        Seen::Status(HardwareStatus::Enabled)
    ));
    assert_silent(&mut seen_rx).await;

    engine.shutdown().await;
}

#[tokio::test]
async fn test_late_join_receives_current_status_first() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    // Join after the initial broadcast already happened.
    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);

    // Immediately queue a status change behind the late-join delivery.
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(false))));

    assert!(matches!(
        recv(&mut seen_rx).await,
        Seen::Status(HardwareStatus::Enabled)
    ));
    assert!(matches!(
        recv(&mut seen_rx).await,
        Seen::Status(HardwareStatus::Disabled)
    ));

    engine.shutdown().await;
}

#[tokio::test]
async fn test_duplicate_add_listener_delivers_once() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(Arc::clone(&listener) as Arc<dyn ReaderListener>);
    engine.add_listener(listener);
    assert_eq!(engine.listener_count(), 1);

    // One late-join delivery, not two.
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));
    assert_silent(&mut seen_rx).await;

    engine.shutdown().await;
}

#[tokio::test]
async fn test_removed_listener_stops_receiving() {
    let engine = ReaderEngine::new();
    let (listener, mut seen_rx) = RecordingListener::new();

    let as_dyn: Arc<dyn ReaderListener> = listener;
    engine.add_listener(Arc::clone(&as_dyn));
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    engine.remove_listener(&as_dyn);
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(false))));
    assert_silent(&mut seen_rx).await;

    // Removing again is a harmless no-op.
    engine.remove_listener(&as_dyn);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_read_tag_delivers_provisional_then_final_outcome() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    let event = TapEvent::new(DiscoveryAction::Tech, Some(iso_dep_tag(vec![0x04, 0xA1])));
    let provisional = engine.read_tag(&event);

    assert!(provisional.success);
    assert_eq!(provisional.tag_type.as_deref(), Some("Processing..."));
    assert_eq!(provisional.tag_id.as_deref(), Some("04 A1"));

    // The final outcome arrives through the delivery task, strictly later.
    let Seen::Tag(outcome) = recv(&mut seen_rx).await else {
        panic!("expected a tag outcome");
    };
    assert!(outcome.success);
    assert_eq!(outcome.tag_id.as_deref(), Some("04 A1"));
    assert_eq!(outcome.tag_type.as_deref(), Some("ISO-DEP"));
    assert_eq!(outcome.data.as_deref(), Some("90 00"));

    // Exactly one final delivery per tap.
    assert_silent(&mut seen_rx).await;

    engine.shutdown().await;
}

#[tokio::test]
async fn test_read_tag_without_handle_is_not_broadcast() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    let outcome = engine.read_tag(&TapEvent::new(DiscoveryAction::Tag, None));
    assert!(!outcome.success);

    assert_silent(&mut seen_rx).await;
    engine.shutdown().await;
}

#[tokio::test]
async fn test_two_taps_both_deliver() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    engine.read_tag(&TapEvent::new(
        DiscoveryAction::Tech,
        Some(iso_dep_tag(vec![0x04, 0xA1])),
    ));
    engine.read_tag(&TapEvent::new(
        DiscoveryAction::Tech,
        Some(iso_dep_tag(vec![0x04, 0xA2])),
    ));

    // Classifications may interleave; deliveries serialize on the delivery
    // task and both arrive. Cross-tap order is not guaranteed.
    let mut ids = Vec::new();
    for _ in 0..2 {
        let Seen::Tag(outcome) = recv(&mut seen_rx).await else {
            panic!("expected a tag outcome");
        };
        ids.push(outcome.tag_id.unwrap());
    }
    ids.sort();
    assert_eq!(ids, vec!["04 A1".to_string(), "04 A2".to_string()]);

    engine.shutdown().await;
}

#[tokio::test]
async fn test_panicking_listener_does_not_block_others() {
    let engine = ReaderEngine::new();
    engine.add_listener(Arc::new(PanickingListener));
    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);

    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));
    assert!(matches!(
        recv(&mut seen_rx).await,
        Seen::Status(HardwareStatus::Enabled)
    ));

    // The delivery task survived the panic and keeps delivering.
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(false))));
    assert!(matches!(
        recv(&mut seen_rx).await,
        Seen::Status(HardwareStatus::Disabled)
    ));

    engine.shutdown().await;
}

#[tokio::test]
async fn test_capture_denial_reports_error_notification() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(
        MockAdapter::new(true).with_capture_denied("missing permission"),
    )));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    engine.enable_capture();

    let Seen::Error(message) = recv(&mut seen_rx).await else {
        panic!("expected an error notification");
    };
    assert!(message.contains("missing permission"));

    // The engine carries on; status is untouched.
    assert_eq!(engine.status(), Some(HardwareStatus::Enabled));
    engine.shutdown().await;
}

#[tokio::test]
async fn test_capture_refused_while_radio_disabled() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(false))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    engine.enable_capture();

    let Seen::Error(message) = recv(&mut seen_rx).await else {
        panic!("expected an error notification");
    };
    assert!(message.contains("Disabled"));

    engine.shutdown().await;
}

#[tokio::test]
async fn test_capture_without_adapter_is_noop() {
    let engine = ReaderEngine::new();
    engine.initialize(None);

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(
        recv(&mut seen_rx).await,
        Seen::Status(HardwareStatus::Unsupported)
    ));

    engine.enable_capture();
    engine.disable_capture();
    assert_silent(&mut seen_rx).await;

    engine.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_drains_pending_outcome() {
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    engine.read_tag(&TapEvent::new(
        DiscoveryAction::Tech,
        Some(iso_dep_tag(vec![0x04, 0xA1])),
    ));
    engine.shutdown().await;

    // The in-flight classification completed and its outcome was delivered
    // before the delivery task stopped.
    let Seen::Tag(outcome) = recv(&mut seen_rx).await else {
        panic!("expected a tag outcome");
    };
    assert!(outcome.success);
}

#[tokio::test]
async fn test_event_ndef_payload_is_tolerated() {
    // A tap that carries a platform-extracted NDEF payload alongside the
    // handle still classifies normally; the payload is only inspected for
    // check-in data.
    let engine = ReaderEngine::new();
    engine.initialize(Some(AnyAdapter::Mock(MockAdapter::new(true))));

    let (listener, mut seen_rx) = RecordingListener::new();
    engine.add_listener(listener);
    assert!(matches!(recv(&mut seen_rx).await, Seen::Status(_)));

    let payload = rollcall_ndef::NdefMessage::single(
        rollcall_ndef::NdefRecord::uri("https://example.com/checkin?userId=42").unwrap(),
    )
    .to_bytes();

    let event = TapEvent::new(DiscoveryAction::Ndef, Some(iso_dep_tag(vec![0x04, 0xA1])))
        .with_ndef_payload(payload);
    engine.read_tag(&event);

    let Seen::Tag(outcome) = recv(&mut seen_rx).await else {
        panic!("expected a tag outcome");
    };
    assert!(outcome.success);

    engine.shutdown().await;
}
