//! Reader engine: hardware status, capture registration, tap dispatch and
//! observer fan-out.
//!
//! # Architecture
//!
//! ```text
//! TapEvent ──► read_tag ──► classification task (tokio::spawn)
//!                 │                   │
//!                 ▼                   ▼
//!          provisional        ┌────────────────┐
//!            outcome          │ Delivery queue │──► delivery task ──► listeners
//!                             │ (mpsc)         │      (sequential fan-out)
//!          status/error ─────►└────────────────┘
//! ```
//!
//! Every observer notification funnels through one mpsc queue consumed by a
//! single delivery task, so listeners always run sequentially: never
//! concurrently with each other, and never concurrently with a late-join
//! status delivery.

use crate::adapter::{AnyAdapter, HardwareAdapter};
use crate::chain;
use crate::listener::ReaderListener;
use crate::registry::ObserverRegistry;
use rollcall_core::{Error, HardwareStatus, ReadOutcome, hex_bytes};
use rollcall_ndef::{NdefMessage, check_in};
use rollcall_tag::{AnyTag, TagDevice};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// How the platform routed a tag-discovered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryAction {
    /// The platform already recognized an NDEF message on the tag.
    Ndef,

    /// The platform matched on a specific technology.
    Tech,

    /// Fallback: a tag was discovered with no better match.
    Tag,
}

/// One tag-discovered notification from the platform.
///
/// Carries at most one tag handle. The handle is valid only for this event;
/// `read_tag` moves it into the single classification task that consumes it.
pub struct TapEvent {
    /// Correlation id for tracing.
    pub id: Uuid,

    /// How the platform routed the event.
    pub action: DiscoveryAction,

    /// The tag handle, when one is attached.
    pub tag: Option<Arc<AnyTag>>,

    /// Raw NDEF messages the platform already extracted from the tag.
    pub ndef_payloads: Vec<Vec<u8>>,
}

impl TapEvent {
    /// Create a tap event.
    pub fn new(action: DiscoveryAction, tag: Option<AnyTag>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            tag: tag.map(Arc::new),
            ndef_payloads: Vec::new(),
        }
    }

    /// Attach a raw NDEF message payload extracted by the platform.
    pub fn with_ndef_payload(mut self, payload: Vec<u8>) -> Self {
        self.ndef_payloads.push(payload);
        self
    }
}

/// Everything that crosses the delivery queue.
enum Notification {
    /// Broadcast a status to the current listener snapshot.
    Status(HardwareStatus),

    /// Late-join delivery to a single new listener.
    StatusFor {
        listener: Arc<dyn ReaderListener>,
        status: HardwareStatus,
    },

    /// Final outcome of one tap.
    TagDetected(ReadOutcome),

    /// Platform capability failure.
    PlatformError(Error),
}

/// Owns hardware availability status, dispatches tag-present events to the
/// handler chain off the calling task, and republishes results and status
/// transitions to all registered observers on one delivery task.
///
/// # Lifecycle
///
/// Create the engine inside a Tokio runtime, call [`initialize`] once the
/// platform adapter is known, and [`shutdown`] when tearing down. The engine
/// has no terminal state in between; it lives for the process lifetime.
///
/// [`initialize`]: ReaderEngine::initialize
/// [`shutdown`]: ReaderEngine::shutdown
pub struct ReaderEngine {
    registry: Arc<ObserverRegistry>,
    adapter: RwLock<Option<AnyAdapter>>,
    status: RwLock<Option<HardwareStatus>>,
    delivery_tx: mpsc::UnboundedSender<Notification>,
    delivery_task: JoinHandle<()>,
}

impl ReaderEngine {
    /// Create an engine and spawn its delivery task.
    ///
    /// Must be called within a Tokio runtime.
    pub fn new() -> Self {
        let registry = Arc::new(ObserverRegistry::new());
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
        let delivery_task = tokio::spawn(delivery_loop(Arc::clone(&registry), delivery_rx));

        Self {
            registry,
            adapter: RwLock::new(None),
            status: RwLock::new(None),
            delivery_tx,
            delivery_task,
        }
    }

    /// Bind the platform adapter, derive the initial status and broadcast
    /// it.
    ///
    /// Idempotent: calling again re-derives and re-broadcasts the status.
    pub fn initialize(&self, adapter: Option<AnyAdapter>) {
        let status = match &adapter {
            None => HardwareStatus::Unsupported,
            Some(adapter) if adapter.is_enabled() => HardwareStatus::Enabled,
            Some(_) => HardwareStatus::Disabled,
        };
        *write(&self.adapter) = adapter;
        self.update_status(status);
    }

    /// Current status, if the engine has been initialized.
    pub fn status(&self) -> Option<HardwareStatus> {
        *read(&self.status)
    }

    /// Whether a hardware adapter is bound.
    pub fn is_available(&self) -> bool {
        read(&self.adapter).is_some()
    }

    /// Register this process as the active foreground receiver for
    /// tag-present events.
    ///
    /// A platform denial is reported through the error channel, never
    /// thrown. A missing adapter makes this a no-op.
    pub fn enable_capture(&self) {
        let adapter = read(&self.adapter);
        let Some(adapter) = adapter.as_ref() else {
            debug!("no hardware adapter bound, capture request ignored");
            return;
        };

        let status = self.status().unwrap_or(HardwareStatus::Unsupported);
        if !status.is_enabled() {
            self.send(Notification::PlatformError(Error::adapter_unavailable(
                status,
            )));
            return;
        }

        match adapter.enable_foreground_capture() {
            Ok(()) => debug!("foreground capture enabled"),
            Err(error) => {
                warn!(%error, "failed to enable foreground capture");
                self.send(Notification::PlatformError(error));
            }
        }
    }

    /// Unregister the foreground receiver. No-op without an adapter.
    pub fn disable_capture(&self) {
        let adapter = read(&self.adapter);
        let Some(adapter) = adapter.as_ref() else {
            return;
        };
        match adapter.disable_foreground_capture() {
            Ok(()) => debug!("foreground capture disabled"),
            Err(error) => {
                warn!(%error, "failed to disable foreground capture");
                self.send(Notification::PlatformError(error));
            }
        }
    }

    /// Handle a tag-discovered event.
    ///
    /// Returns immediately: a failed outcome when the event carries no tag,
    /// otherwise a provisional `"Processing..."` outcome while
    /// classification runs on a background task. The final outcome reaches
    /// all listeners through the delivery task; callers must not treat the
    /// synchronous return value as final.
    pub fn read_tag(&self, event: &TapEvent) -> ReadOutcome {
        debug!(event = %event.id, action = ?event.action, "tag event received");

        for payload in &event.ndef_payloads {
            match NdefMessage::parse(payload) {
                Ok(message) => {
                    if let Some(user_id) = check_in::user_id(&message) {
                        info!(event = %event.id, %user_id, "check-in payload scanned");
                    }
                }
                Err(error) => {
                    debug!(event = %event.id, %error, "undecodable NDEF payload on event");
                }
            }
        }

        let Some(tag) = &event.tag else {
            return ReadOutcome::failure("no tag found");
        };

        let uid_hex = hex_bytes(tag.uid());
        debug!(
            event = %event.id,
            uid = %uid_hex,
            techs = ?tag.tech_list(),
            "scheduling classification"
        );

        let tag = Arc::clone(tag);
        let delivery_tx = self.delivery_tx.clone();
        let event_id = event.id;
        tokio::spawn(async move {
            let outcome = chain::classify(tag.as_ref()).await;
            debug!(event = %event_id, success = outcome.success, "classification finished");
            if delivery_tx.send(Notification::TagDetected(outcome)).is_err() {
                warn!(event = %event_id, "delivery loop stopped, dropping outcome");
            }
        });

        ReadOutcome::processing(uid_hex)
    }

    /// Register a listener.
    ///
    /// Duplicate registration is a no-op. When the engine already knows its
    /// status, the new listener receives it on the delivery task before any
    /// future broadcast reaches it.
    pub fn add_listener(&self, listener: Arc<dyn ReaderListener>) {
        if !self.registry.add(Arc::clone(&listener)) {
            return;
        }
        if let Some(status) = self.status() {
            self.send(Notification::StatusFor { listener, status });
        }
    }

    /// Unregister a listener. Safe to call for one that was never
    /// registered.
    pub fn remove_listener(&self, listener: &Arc<dyn ReaderListener>) {
        self.registry.remove(listener);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.len()
    }

    /// Stop the delivery task after draining queued notifications.
    ///
    /// In-flight classification tasks keep the queue alive until they
    /// finish, so their outcomes are still delivered before the task stops.
    pub async fn shutdown(self) {
        let Self {
            delivery_tx,
            delivery_task,
            ..
        } = self;
        drop(delivery_tx);
        if delivery_task.await.is_err() {
            warn!("delivery task terminated abnormally");
        }
    }

    fn update_status(&self, status: HardwareStatus) {
        *write(&self.status) = Some(status);
        debug!(%status, "hardware status updated");
        self.send(Notification::Status(status));
    }

    fn send(&self, notification: Notification) {
        if self.delivery_tx.send(notification).is_err() {
            warn!("delivery loop stopped, dropping notification");
        }
    }
}

impl Default for ReaderEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The single delivery task: consumes the queue and fans out sequentially
/// over a registry snapshot taken per notification.
async fn delivery_loop(
    registry: Arc<ObserverRegistry>,
    mut delivery_rx: mpsc::UnboundedReceiver<Notification>,
) {
    while let Some(notification) = delivery_rx.recv().await {
        match notification {
            Notification::Status(status) => {
                for listener in registry.snapshot() {
                    deliver(|| listener.on_status_changed(status), "status");
                }
            }
            Notification::StatusFor { listener, status } => {
                deliver(|| listener.on_status_changed(status), "status");
            }
            Notification::TagDetected(outcome) => {
                for listener in registry.snapshot() {
                    deliver(|| listener.on_tag_detected(&outcome), "tag");
                }
            }
            Notification::PlatformError(error) => {
                for listener in registry.snapshot() {
                    deliver(|| listener.on_error(&error), "error");
                }
            }
        }
    }
    debug!("delivery loop stopped");
}

/// Run one listener callback, isolating a panic so the remaining listeners
/// in the snapshot still get their delivery.
fn deliver<F: FnOnce()>(callback: F, what: &str) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        warn!(what, "listener panicked during delivery");
    }
}
