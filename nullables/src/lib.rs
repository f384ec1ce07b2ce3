//! Nullable infrastructure for deterministic testing.
//!
//! Time and event observation are the only external dependencies of the
//! governance core. This crate provides test-friendly stand-ins that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or the wall clock
//!
//! Usage: pass `NullClock::now()` where a host would pass the ledger time,
//! and subscribe a `RecordingListener` to capture notifications.

pub mod clock;
pub mod recorder;

pub use clock::NullClock;
pub use recorder::RecordingListener;
