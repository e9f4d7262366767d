//! Pointer gesture interpretation.
//!
//! A gesture is one down, any number of moves and one up. The recognizer
//! turns it into a single [`GestureOutcome`]; live drag offsets are
//! reported along the way so the host can follow the finger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyreel_core::clock::millis;
use storyreel_core::config::ViewerConfig;
use storyreel_core::ids::Direction;

/// What the pointer landed on, as resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    /// The media surface itself.
    #[default]
    Background,
    /// The "previous item" affordance.
    PrevAffordance,
    /// The "next item" affordance.
    NextAffordance,
    /// Links, buttons and other interactive chrome.
    InteractiveOverlay,
}

/// A single pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Horizontal position within the surface, in pixels.
    pub x: f64,
    /// Vertical position within the surface, in pixels.
    pub y: f64,
    /// When the sample was taken.
    pub at: DateTime<Utc>,
    /// What the pointer is over.
    pub target: HitTarget,
}

impl PointerEvent {
    /// Creates a sample over the media surface.
    #[must_use]
    pub fn new(x: f64, y: f64, at: DateTime<Utc>) -> Self {
        Self {
            x,
            y,
            at,
            target: HitTarget::Background,
        }
    }

    /// Sets the hit target.
    #[must_use]
    pub fn on(mut self, target: HitTarget) -> Self {
        self.target = target;
        self
    }
}

/// Dimensions of the viewing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMetrics {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl SurfaceMetrics {
    /// Creates metrics.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which neighbor stories are staged and can be committed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// A previous story is staged.
    pub previous: bool,
    /// A next story is staged.
    pub next: bool,
}

impl Neighbors {
    fn has(self, direction: Direction) -> bool {
        match direction {
            Direction::Previous => self.previous,
            Direction::Next => self.next,
        }
    }
}

/// Interpretation of a completed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No gesture was being tracked.
    NoOp,
    /// Started in an exclusion band or on interactive chrome; the host
    /// handles it.
    PassThrough,
    /// The gesture was a vertical scroll.
    ScrollCancel,
    /// A drag that did not commit; the panel returns to rest.
    SnapBack,
    /// A fling or long drag towards a staged neighbor.
    CommitStory(Direction),
    /// A quick motionless press.
    Tap(Direction),
    /// Released on a previous/next affordance.
    Affordance(Direction),
    /// A motionless press held past the tap window; playback just resumes.
    Hold,
}

#[derive(Debug, Clone)]
struct Track {
    origin_x: f64,
    origin_y: f64,
    started_at: DateTime<Utc>,
    valid: bool,
    target: HitTarget,
    scroll: Option<bool>,
    moved: bool,
    long_press: bool,
}

/// Stateful recognizer for one pointer at a time.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    track: Option<Track>,
}

impl GestureRecognizer {
    /// Creates an idle recognizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a gesture. Returns true when the gesture is valid,
    /// meaning it began outside the top and bottom exclusion bands.
    pub fn down(
        &mut self,
        event: &PointerEvent,
        metrics: SurfaceMetrics,
        config: &ViewerConfig,
    ) -> bool {
        let valid =
            event.y >= config.pause_band && event.y <= metrics.height - config.pause_band;
        self.track = Some(Track {
            origin_x: event.x,
            origin_y: event.y,
            started_at: event.at,
            valid,
            target: event.target,
            scroll: None,
            moved: false,
            long_press: false,
        });
        valid
    }

    /// Feeds a move sample. Returns the horizontal offset from the origin
    /// when the host should follow it with the panel.
    ///
    /// Whether the gesture is a scroll is decided on the first sample that
    /// moved at all and never revisited.
    pub fn motion(&mut self, event: &PointerEvent) -> Option<f64> {
        let track = self.track.as_mut()?;
        if !track.valid || track.target != HitTarget::Background {
            return None;
        }
        let dx = event.x - track.origin_x;
        let dy = event.y - track.origin_y;
        if is_still(dx, dy) {
            return None;
        }
        track.moved = true;
        let scroll = *track.scroll.get_or_insert(dy.abs() > dx.abs());
        if scroll { None } else { Some(dx) }
    }

    /// Completes the gesture.
    pub fn up(
        &mut self,
        event: &PointerEvent,
        metrics: SurfaceMetrics,
        config: &ViewerConfig,
        neighbors: Neighbors,
    ) -> GestureOutcome {
        let Some(track) = self.track.take() else {
            return GestureOutcome::NoOp;
        };
        if !track.valid {
            return GestureOutcome::PassThrough;
        }
        match track.target {
            HitTarget::InteractiveOverlay => return GestureOutcome::PassThrough,
            HitTarget::PrevAffordance => return GestureOutcome::Affordance(Direction::Previous),
            HitTarget::NextAffordance => return GestureOutcome::Affordance(Direction::Next),
            HitTarget::Background => {}
        }
        if track.scroll == Some(true) {
            return GestureOutcome::ScrollCancel;
        }

        let held = event.at - track.started_at;
        if !track.moved {
            return if held < millis(config.tap_window_ms) {
                GestureOutcome::Tap(tap_direction(track.origin_x, metrics, config))
            } else {
                GestureOutcome::Hold
            };
        }

        let dx = event.x - track.origin_x;
        if config.cube_effect && dx.abs() > metrics.width {
            return GestureOutcome::SnapBack;
        }
        let is_fling = held < millis(config.fling_max_ms) && dx.abs() > config.fling_min_px;
        let is_drag = dx.abs() > metrics.width / 3.0;
        if !(is_fling || is_drag) {
            return GestureOutcome::SnapBack;
        }
        let direction = swipe_direction(dx, config.right_to_left);
        if neighbors.has(direction) {
            GestureOutcome::CommitStory(direction)
        } else {
            GestureOutcome::SnapBack
        }
    }

    /// Abandons the tracked gesture.
    pub fn cancel(&mut self) {
        self.track = None;
    }

    /// Returns true while a gesture is being tracked.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.track.is_some()
    }

    /// Returns true once the tracked gesture has been reported as a long
    /// press.
    #[must_use]
    pub fn is_long_press(&self) -> bool {
        self.track.as_ref().is_some_and(|track| track.long_press)
    }

    /// When the tracked gesture becomes a long press, if it has not yet.
    #[must_use]
    pub fn long_press_deadline(&self, config: &ViewerConfig) -> Option<DateTime<Utc>> {
        self.track
            .as_ref()
            .filter(|track| track.valid && !track.long_press)
            .map(|track| track.started_at + millis(config.long_press_ms))
    }

    /// Returns true exactly once, when the tracked gesture has been held for
    /// `long_press_ms`.
    pub fn long_press_due(&mut self, now: DateTime<Utc>, config: &ViewerConfig) -> bool {
        let due = self
            .long_press_deadline(config)
            .is_some_and(|deadline| now >= deadline);
        if let (true, Some(track)) = (due, self.track.as_mut()) {
            track.long_press = true;
        }
        due
    }
}

fn is_still(dx: f64, dy: f64) -> bool {
    dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON
}

fn swipe_direction(dx: f64, right_to_left: bool) -> Direction {
    let direction = if dx < 0.0 {
        Direction::Next
    } else {
        Direction::Previous
    };
    if right_to_left {
        direction.opposite()
    } else {
        direction
    }
}

fn tap_direction(x: f64, metrics: SurfaceMetrics, config: &ViewerConfig) -> Direction {
    if !config.previous_tap {
        return Direction::Next;
    }
    let direction = if x < metrics.width * config.tap_split_ratio {
        Direction::Previous
    } else {
        Direction::Next
    };
    if config.reverse_tap == config.right_to_left {
        direction
    } else {
        direction.opposite()
    }
}
