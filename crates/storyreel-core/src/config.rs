//! Viewer configuration.
//!
//! Every field has a default, so hosts can deserialize a partial document
//! (YAML or JSON) and get a complete configuration back.

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Recognized viewer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Swaps the left/right tap mapping.
    pub reverse_tap: bool,
    /// Rotated-panel ("cube") transitions instead of a linear slide.
    pub cube_effect: bool,
    /// Mirrors gesture and tap directions for right-to-left layouts.
    pub right_to_left: bool,
    /// Height in pixels of the top and bottom exclusion bands.
    pub pause_band: f64,
    /// Fraction of the surface width, from the left, that maps a tap to the
    /// previous item.
    pub tap_split_ratio: f64,
    /// Duration of a committed gesture transition.
    pub transition_duration_ms: u64,
    /// Display duration for images without an explicit duration.
    pub default_item_duration_seconds: f64,
    /// When false every tap advances, regardless of position.
    pub previous_tap: bool,
    /// When false the seen-set lives in memory only.
    pub persist_seen: bool,
    /// Upper bound (exclusive) on a fling's duration.
    pub fling_max_ms: u64,
    /// Lower bound (exclusive) on a fling's horizontal travel.
    pub fling_min_px: f64,
    /// A motionless press released within this window is a tap.
    pub tap_window_ms: u64,
    /// A press held this long is reported as a long press.
    pub long_press_ms: u64,
    /// Extra delay after the animation before panels are swapped.
    pub swap_grace_ms: u64,
    /// Duration of the snap-back animation after an uncommitted drag.
    pub snap_back_ms: u64,
    /// Language strings for relative time labels.
    pub labels: TimeLabels,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            reverse_tap: false,
            cube_effect: false,
            right_to_left: false,
            pause_band: 80.0,
            tap_split_ratio: 1.0 / 3.0,
            transition_duration_ms: 600,
            default_item_duration_seconds: 3.0,
            previous_tap: true,
            persist_seen: true,
            fling_max_ms: 300,
            fling_min_px: 25.0,
            tap_window_ms: 250,
            long_press_ms: 600,
            swap_grace_ms: 50,
            snap_back_ms: 300,
            labels: TimeLabels::default(),
        }
    }
}

impl ViewerConfig {
    /// Checks that every value is inside its accepted range.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Configuration` naming the first offending field.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if !(self.tap_split_ratio > 0.0 && self.tap_split_ratio < 1.0) {
            return Err(ViewerError::Configuration(format!(
                "tap_split_ratio must be in (0, 1), got {}",
                self.tap_split_ratio
            )));
        }
        if !self.default_item_duration_seconds.is_finite()
            || self.default_item_duration_seconds <= 0.0
        {
            return Err(ViewerError::Configuration(format!(
                "default_item_duration_seconds must be positive, got {}",
                self.default_item_duration_seconds
            )));
        }
        if !self.pause_band.is_finite() || self.pause_band < 0.0 {
            return Err(ViewerError::Configuration(format!(
                "pause_band must be non-negative, got {}",
                self.pause_band
            )));
        }
        if !self.fling_min_px.is_finite() || self.fling_min_px < 0.0 {
            return Err(ViewerError::Configuration(format!(
                "fling_min_px must be non-negative, got {}",
                self.fling_min_px
            )));
        }
        Ok(())
    }
}

/// Language strings used by relative time labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeLabels {
    /// Suffix for counts of seconds.
    pub seconds: String,
    /// Label for exactly one minute.
    pub minute: String,
    /// Suffix for counts of minutes.
    pub minutes: String,
    /// Label for exactly one hour.
    pub hour: String,
    /// Suffix for counts of hours.
    pub hours: String,
    /// Label for the previous day.
    pub yesterday: String,
    /// Suffix for counts of days.
    pub days: String,
}

impl Default for TimeLabels {
    fn default() -> Self {
        Self {
            seconds: "seconds ago".to_owned(),
            minute: "minute ago".to_owned(),
            minutes: "minutes ago".to_owned(),
            hour: "hour ago".to_owned(),
            hours: "hours ago".to_owned(),
            yesterday: "yesterday".to_owned(),
            days: "days ago".to_owned(),
        }
    }
}
