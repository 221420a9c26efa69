//! Observer contract for reader notifications.

use rollcall_core::{Error, HardwareStatus, ReadOutcome};

/// Observer of reader status, read results and platform errors.
///
/// All callbacks run sequentially on the engine's single delivery task, so
/// implementations need no synchronization of their own. A panicking
/// listener is isolated per delivery and cannot block the others.
pub trait ReaderListener: Send + Sync {
    /// Hardware availability changed.
    ///
    /// Also delivered once immediately after subscription when the engine
    /// already knows its status, so no observer starts blind.
    fn on_status_changed(&self, status: HardwareStatus);

    /// A tap produced its final read outcome.
    fn on_tag_detected(&self, outcome: &ReadOutcome);

    /// A platform capability failure occurred (adapter unavailable,
    /// capture registration denied). Distinct from per-tag failures, which
    /// arrive as failed outcomes through [`on_tag_detected`].
    ///
    /// [`on_tag_detected`]: ReaderListener::on_tag_detected
    fn on_error(&self, error: &Error);
}
