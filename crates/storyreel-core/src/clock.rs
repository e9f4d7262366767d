//! Clock abstraction for determinism.

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over system time for deterministic behavior.
///
/// Every deadline in the engine (autoplay, transition swap, long press) is
/// computed from this clock, so tests can drive time explicitly.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Converts a millisecond count into a `TimeDelta`.
#[must_use]
pub fn millis(ms: u64) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

/// Converts fractional seconds into a `TimeDelta`, rounding to the nearest
/// millisecond. Returns `None` for non-finite or non-positive input.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn seconds(secs: f64) -> Option<TimeDelta> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Some(TimeDelta::milliseconds((secs * 1000.0).round() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_rejects_non_finite_and_non_positive() {
        assert_eq!(seconds(f64::NAN), None);
        assert_eq!(seconds(f64::INFINITY), None);
        assert_eq!(seconds(0.0), None);
        assert_eq!(seconds(-1.0), None);
    }

    #[test]
    fn test_seconds_rounds_to_millis() {
        assert_eq!(seconds(3.0), Some(TimeDelta::milliseconds(3000)));
        assert_eq!(seconds(2.25), Some(TimeDelta::milliseconds(2250)));
    }

    #[test]
    fn test_millis_converts() {
        assert_eq!(millis(650), TimeDelta::milliseconds(650));
    }
}
