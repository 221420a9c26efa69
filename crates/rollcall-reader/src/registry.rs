//! Thread-safe observer registry with snapshot iteration.

use crate::listener::ReaderListener;
use std::sync::{Arc, PoisonError, RwLock};

fn same_listener(a: &Arc<dyn ReaderListener>, b: &Arc<dyn ReaderListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Registered observers, deduplicated by `Arc` identity.
///
/// Iteration happens over a snapshot: adding or removing a listener while a
/// fan-out is in flight never affects that fan-out.
pub struct ObserverRegistry {
    listeners: RwLock<Vec<Arc<dyn ReaderListener>>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener.
    ///
    /// Returns `false` when the same listener is already registered, in
    /// which case nothing changes.
    pub fn add(&self, listener: Arc<dyn ReaderListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if listeners.iter().any(|known| same_listener(known, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Unregister a listener. Safe to call for a listener that was never
    /// registered; returns whether anything was removed.
    pub fn remove(&self, listener: &Arc<dyn ReaderListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|known| !same_listener(known, listener));
        listeners.len() != before
    }

    /// Take a stable snapshot of the current listeners for iteration.
    pub fn snapshot(&self) -> Vec<Arc<dyn ReaderListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
