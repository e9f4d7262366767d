//! Autoplay countdown for the active item.
//!
//! At most one timer is live. Images run for their own duration or the
//! configured default. Videos wait, armed, until the host reports the
//! measured duration.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};
use storyreel_core::clock::seconds;
use storyreel_core::ids::StoryId;
use tracing::debug;

use super::story::{Item, MediaKind};

/// The item a timer belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AutoplayTarget {
    /// Story holding the item.
    pub story_id: StoryId,
    /// Item position within the story.
    pub index: usize,
}

impl AutoplayTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(story_id: StoryId, index: usize) -> Self {
        Self { story_id, index }
    }
}

/// Lifecycle of one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    /// Waiting for a usable duration.
    Armed,
    /// Counting down towards its deadline.
    Running,
    /// The deadline passed and the advance was reported.
    Fired,
    /// Stopped before firing.
    Cancelled,
}

#[derive(Debug, Clone)]
struct Timer {
    target: AutoplayTarget,
    phase: TimerPhase,
    started_at: DateTime<Utc>,
    duration: Option<TimeDelta>,
}

impl Timer {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        self.duration.map(|duration| self.started_at + duration)
    }
}

/// Drives automatic advancement through a story's items.
#[derive(Debug)]
pub struct AutoplayDriver {
    default_duration: TimeDelta,
    timer: Option<Timer>,
    measured: HashMap<AutoplayTarget, TimeDelta>,
    failed: HashSet<AutoplayTarget>,
}

impl AutoplayDriver {
    /// Creates a driver whose images default to `default_seconds`.
    #[must_use]
    pub fn new(default_seconds: f64) -> Self {
        Self {
            default_duration: seconds(default_seconds).unwrap_or(TimeDelta::seconds(3)),
            timer: None,
            measured: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    /// Replaces any live timer with a fresh one for `item`, starting at
    /// `now`. Returns the phase the new timer starts in.
    pub fn arm(&mut self, target: AutoplayTarget, item: &Item, now: DateTime<Utc>) -> TimerPhase {
        let duration = if self.failed.contains(&target) {
            None
        } else {
            self.measured
                .get(&target)
                .copied()
                .or_else(|| match item.kind {
                    MediaKind::Image => Some(
                        item.duration_seconds
                            .and_then(seconds)
                            .unwrap_or(self.default_duration),
                    ),
                    MediaKind::Video => item.duration_seconds.and_then(seconds),
                })
        };
        let phase = if duration.is_some() {
            TimerPhase::Running
        } else {
            TimerPhase::Armed
        };
        debug!(story_id = %target.story_id, index = target.index, ?phase, "autoplay armed");
        self.timer = Some(Timer {
            target,
            phase,
            started_at: now,
            duration,
        });
        phase
    }

    /// Records a measured media duration. When it belongs to the live timer,
    /// the timer restarts from `now` with the measured duration. Returns
    /// true if the live timer was re-armed.
    ///
    /// Non-finite or non-positive durations are ignored and leave the timer
    /// as it was.
    pub fn duration_known(
        &mut self,
        target: &AutoplayTarget,
        duration_seconds: f64,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(duration) = seconds(duration_seconds) else {
            debug!(story_id = %target.story_id, index = target.index, duration_seconds, "unusable media duration");
            return false;
        };
        if self.failed.contains(target) {
            return false;
        }
        self.measured.insert(target.clone(), duration);
        match &mut self.timer {
            Some(timer)
                if &timer.target == target
                    && matches!(timer.phase, TimerPhase::Armed | TimerPhase::Running) =>
            {
                timer.phase = TimerPhase::Running;
                timer.started_at = now;
                timer.duration = Some(duration);
                true
            }
            _ => false,
        }
    }

    /// Records that an item's media failed to load. The item keeps no
    /// timer from now on. Returns true if its live timer was stopped.
    pub fn media_failed(&mut self, target: &AutoplayTarget) -> bool {
        self.failed.insert(target.clone());
        match &mut self.timer {
            Some(timer)
                if &timer.target == target
                    && matches!(timer.phase, TimerPhase::Armed | TimerPhase::Running) =>
            {
                timer.phase = TimerPhase::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Stops the live timer, if any.
    pub fn cancel(&mut self) {
        if let Some(timer) = &mut self.timer
            && matches!(timer.phase, TimerPhase::Armed | TimerPhase::Running)
        {
            timer.phase = TimerPhase::Cancelled;
        }
    }

    /// Reports the target whose deadline has passed, moving its timer to
    /// `Fired`. Each timer fires at most once.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<AutoplayTarget> {
        let timer = self.timer.as_mut()?;
        if timer.phase != TimerPhase::Running {
            return None;
        }
        let deadline = timer.deadline()?;
        if now < deadline {
            return None;
        }
        timer.phase = TimerPhase::Fired;
        Some(timer.target.clone())
    }

    /// Deadline of the running timer.
    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timer
            .as_ref()
            .filter(|timer| timer.phase == TimerPhase::Running)
            .and_then(Timer::deadline)
    }

    /// Phase of the most recent timer.
    #[must_use]
    pub fn phase(&self) -> Option<TimerPhase> {
        self.timer.as_ref().map(|timer| timer.phase)
    }

    /// Target of the most recent timer.
    #[must_use]
    pub fn target(&self) -> Option<&AutoplayTarget> {
        self.timer.as_ref().map(|timer| &timer.target)
    }

    /// Fraction of the running timer that has elapsed, in `[0, 1]`. A fired
    /// timer reports 1; anything else reports 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let Some(timer) = &self.timer else {
            return 0.0;
        };
        match (timer.phase, timer.duration) {
            (TimerPhase::Fired, _) => 1.0,
            (TimerPhase::Running, Some(duration)) => {
                let elapsed = (now - timer.started_at).num_milliseconds() as f64;
                let total = duration.num_milliseconds() as f64;
                (elapsed / total).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}
