//! Tap reading pipeline for the rollcall check-in core.
//!
//! The [`ReaderEngine`] owns hardware availability status, dispatches
//! incoming tag-present events to the fixed-priority technology handler
//! chain on background tasks, and republishes results and status
//! transitions to all registered observers on one delivery task.

pub mod adapter;
pub mod chain;
pub mod engine;
pub mod listener;
pub mod registry;

pub use adapter::{AnyAdapter, HardwareAdapter, MockAdapter};
pub use engine::{DiscoveryAction, ReaderEngine, TapEvent};
pub use listener::ReaderListener;
pub use registry::ObserverRegistry;
