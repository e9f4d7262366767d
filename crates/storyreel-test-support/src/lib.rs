//! Shared test doubles and utilities for the storyreel viewer engine.

mod clock;
mod continuation;
mod seen_store;

pub use clock::{ManualClock, epoch};
pub use continuation::ContinuationLog;
pub use seen_store::{CorruptSeenStore, FailingSeenStore, RecordingSeenStore};
