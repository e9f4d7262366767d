//! Test clock — deterministic `Clock` implementation for tests.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use storyreel_core::clock::Clock;

/// Fixed starting instant used across the test suites.
///
/// # Panics
///
/// Never panics; the literal date is valid.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A clock that only moves when a test advances it.
#[derive(Debug)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    /// Creates a clock stopped at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    /// Creates a clock stopped at [`epoch`].
    #[must_use]
    pub fn at_epoch() -> Self {
        Self::new(epoch())
    }

    /// Moves the clock forward by `ms` milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn advance_ms(&self, ms: i64) {
        let mut now = self.0.lock().unwrap();
        *now += TimeDelta::milliseconds(ms);
    }

    /// Sets the clock to `instant`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.0.lock().unwrap() = instant;
    }

    /// Milliseconds elapsed since [`epoch`].
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        (*self.0.lock().unwrap() - epoch()).num_milliseconds()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
