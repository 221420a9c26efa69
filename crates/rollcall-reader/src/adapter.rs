//! Platform hardware adapter binding.
//!
//! The adapter is the engine's view of the platform radio: an enabled bit
//! and the foreground capture registration calls. Like the tag handle, the
//! contract is a trait plus a mock plus an enum wrapper for dispatch.

use rollcall_core::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};

/// Platform proximity radio adapter.
pub trait HardwareAdapter: Send + Sync {
    /// Whether the radio is currently enabled in system settings.
    fn is_enabled(&self) -> bool;

    /// Register this process as the active foreground receiver for
    /// tag-present events.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform denies the registration.
    fn enable_foreground_capture(&self) -> Result<()>;

    /// Unregister the foreground receiver.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform rejects the call.
    fn disable_foreground_capture(&self) -> Result<()>;
}

/// Enum wrapper for adapter dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyAdapter {
    /// Mock adapter for development and testing.
    Mock(MockAdapter),
}

impl HardwareAdapter for AnyAdapter {
    fn is_enabled(&self) -> bool {
        match self {
            Self::Mock(adapter) => adapter.is_enabled(),
        }
    }

    fn enable_foreground_capture(&self) -> Result<()> {
        match self {
            Self::Mock(adapter) => adapter.enable_foreground_capture(),
        }
    }

    fn disable_foreground_capture(&self) -> Result<()> {
        match self {
            Self::Mock(adapter) => adapter.disable_foreground_capture(),
        }
    }
}

/// Mock adapter for development and testing.
#[derive(Debug)]
pub struct MockAdapter {
    enabled: AtomicBool,
    capturing: AtomicBool,
    deny_capture: Option<String>,
}

impl MockAdapter {
    /// Create a mock adapter with the given radio state.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            capturing: AtomicBool::new(false),
            deny_capture: None,
        }
    }

    /// Make every capture registration fail like a platform security denial.
    pub fn with_capture_denied(mut self, reason: impl Into<String>) -> Self {
        self.deny_capture = Some(reason.into());
        self
    }

    /// Flip the radio state, as if toggled in system settings.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether foreground capture is currently registered.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }
}

impl HardwareAdapter for MockAdapter {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn enable_foreground_capture(&self) -> Result<()> {
        if let Some(reason) = &self.deny_capture {
            return Err(Error::permission_denied(reason.clone()));
        }
        self.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disable_foreground_capture(&self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_adapter_capture_cycle() {
        let adapter = MockAdapter::new(true);
        assert!(adapter.is_enabled());
        assert!(!adapter.is_capturing());

        adapter.enable_foreground_capture().unwrap();
        assert!(adapter.is_capturing());

        adapter.disable_foreground_capture().unwrap();
        assert!(!adapter.is_capturing());
    }

    #[test]
    fn test_mock_adapter_denied_capture() {
        let adapter = MockAdapter::new(true).with_capture_denied("missing permission");

        let result = adapter.enable_foreground_capture();
        assert!(matches!(result, Err(Error::PermissionDenied { .. })));
        assert!(!adapter.is_capturing());
    }

    #[test]
    fn test_mock_adapter_toggle_enabled() {
        let adapter = MockAdapter::new(false);
        assert!(!adapter.is_enabled());
        adapter.set_enabled(true);
        assert!(adapter.is_enabled());
    }

    #[test]
    fn test_any_adapter_dispatch() {
        let adapter = AnyAdapter::Mock(MockAdapter::new(true));
        assert!(adapter.is_enabled());
        adapter.enable_foreground_capture().unwrap();
    }
}
