//! Panel staging and story-to-story transitions.
//!
//! Up to three panels are staged around the open story. A committed
//! transition animates towards the neighbor's resting position and is
//! followed by a swap at a scheduled deadline, never on an animation event.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use storyreel_core::clock::millis;
use storyreel_core::config::ViewerConfig;
use storyreel_core::error::ViewerError;
use storyreel_core::ids::{Direction, StoryId};

const CUBE_REST_SCALE: f64 = 0.95;
const CUBE_TURNING_SCALE: f64 = 0.93;

/// Position of a staged panel relative to the open story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelSlot {
    /// The story before the open one.
    Previous,
    /// The open story.
    Viewing,
    /// The story after the open one.
    Next,
}

impl From<Direction> for PanelSlot {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Previous => Self::Previous,
            Direction::Next => Self::Next,
        }
    }
}

/// Transform applied to the panel strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transform {
    /// Linear horizontal slide.
    Translate {
        /// Offset in pixels.
        px: f64,
    },
    /// Rotated-panel ("cube") turn.
    Rotate {
        /// Rotation in degrees.
        degrees: f64,
        /// Uniform scale applied while turning.
        scale: f64,
    },
}

/// Whether a transition was started by a gesture or programmatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    /// Fling or drag release.
    Gesture,
    /// Story end, affordance or host request.
    Programmatic,
}

/// A committed transition waiting for its swap.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlight {
    /// Direction of travel.
    pub direction: Direction,
    /// The story that becomes the open one.
    pub target: StoryId,
    /// When the swap happens.
    pub swap_at: DateTime<Utc>,
}

/// Panel changes produced by a swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapOutcome {
    /// Direction of travel.
    pub direction: Direction,
    /// Panel pushed out of the strip.
    pub discarded: Option<StoryId>,
    /// Former viewing panel and the slot it moved to.
    pub demoted: Option<(StoryId, PanelSlot)>,
    /// The new viewing panel.
    pub promoted: StoryId,
}

/// Stages panels and sequences transitions between them.
#[derive(Debug)]
pub struct TransitionController {
    cube: bool,
    right_to_left: bool,
    width: f64,
    duration: TimeDelta,
    grace: TimeDelta,
    previous: Option<StoryId>,
    viewing: Option<StoryId>,
    next: Option<StoryId>,
    in_flight: Option<InFlight>,
}

impl TransitionController {
    /// Creates a controller with no staged panels.
    #[must_use]
    pub fn new(config: &ViewerConfig, width: f64) -> Self {
        Self {
            cube: config.cube_effect,
            right_to_left: config.right_to_left,
            width,
            duration: millis(config.transition_duration_ms),
            grace: millis(config.swap_grace_ms),
            previous: None,
            viewing: None,
            next: None,
            in_flight: None,
        }
    }

    /// Updates the surface width used for offsets.
    pub fn resize(&mut self, width: f64) {
        self.width = width;
    }

    fn slot_mut(&mut self, slot: PanelSlot) -> &mut Option<StoryId> {
        match slot {
            PanelSlot::Previous => &mut self.previous,
            PanelSlot::Viewing => &mut self.viewing,
            PanelSlot::Next => &mut self.next,
        }
    }

    /// Story staged in `slot`.
    #[must_use]
    pub fn panel(&self, slot: PanelSlot) -> Option<&StoryId> {
        match slot {
            PanelSlot::Previous => self.previous.as_ref(),
            PanelSlot::Viewing => self.viewing.as_ref(),
            PanelSlot::Next => self.next.as_ref(),
        }
    }

    /// Slot a story is staged in.
    #[must_use]
    pub fn slot_of(&self, story_id: &StoryId) -> Option<PanelSlot> {
        [PanelSlot::Previous, PanelSlot::Viewing, PanelSlot::Next]
            .into_iter()
            .find(|&slot| self.panel(slot) == Some(story_id))
    }

    /// Stages a panel for `story_id` in `slot`.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::DuplicatePanel` if the story is already staged,
    /// and `ViewerError::InvalidState` if the slot is occupied. Nothing
    /// changes on error.
    pub fn stage(&mut self, story_id: StoryId, slot: PanelSlot) -> Result<(), ViewerError> {
        if self.slot_of(&story_id).is_some() {
            return Err(ViewerError::DuplicatePanel(story_id));
        }
        let target = self.slot_mut(slot);
        if let Some(occupant) = target {
            return Err(ViewerError::InvalidState(format!(
                "{slot:?} slot already holds {occupant}"
            )));
        }
        *target = Some(story_id);
        Ok(())
    }

    /// Transform at rest.
    #[must_use]
    pub fn rest(&self) -> Transform {
        if self.cube {
            Transform::Rotate {
                degrees: 0.0,
                scale: CUBE_REST_SCALE,
            }
        } else {
            Transform::Translate { px: 0.0 }
        }
    }

    /// Transform following a live drag of `dx` pixels. `None` while a
    /// transition is in flight or when a cube turn would pass ±90°.
    #[must_use]
    pub fn live_offset(&self, dx: f64) -> Option<Transform> {
        if self.in_flight.is_some() {
            return None;
        }
        if !self.cube {
            return Some(Transform::Translate { px: dx });
        }
        let degrees = dx / self.width * 90.0;
        if degrees.abs() > 90.0 {
            return None;
        }
        Some(Transform::Rotate {
            degrees,
            scale: CUBE_TURNING_SCALE,
        })
    }

    /// Commits a transition towards the neighbor in `direction`. Returns the
    /// target transform and the animation duration in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::InvalidState` if a transition is already in
    /// flight, and `ViewerError::NoNeighbor` if no panel is staged in that
    /// direction.
    pub fn commit(
        &mut self,
        direction: Direction,
        origin: TransitionOrigin,
        now: DateTime<Utc>,
    ) -> Result<(Transform, TimeDelta), ViewerError> {
        if self.in_flight.is_some() {
            return Err(ViewerError::InvalidState("transition in flight".into()));
        }
        let viewing = self
            .viewing
            .clone()
            .ok_or_else(|| ViewerError::InvalidState("no viewing panel".into()))?;
        let target = self
            .panel(direction.into())
            .cloned()
            .ok_or(ViewerError::NoNeighbor {
                story_id: viewing,
                direction,
            })?;

        let duration = match origin {
            TransitionOrigin::Gesture => self.duration,
            TransitionOrigin::Programmatic => TimeDelta::zero(),
        };
        let sign = match (direction, self.right_to_left) {
            (Direction::Next, false) | (Direction::Previous, true) => -1.0,
            (Direction::Previous, false) | (Direction::Next, true) => 1.0,
        };
        let transform = if self.cube {
            Transform::Rotate {
                degrees: sign * 90.0,
                scale: CUBE_TURNING_SCALE,
            }
        } else {
            Transform::Translate {
                px: sign * self.width,
            }
        };
        self.in_flight = Some(InFlight {
            direction,
            target,
            swap_at: now + duration + self.grace,
        });
        Ok((transform, duration))
    }

    /// The committed transition, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    /// Returns true while a committed transition awaits its swap.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// When the pending swap happens.
    #[must_use]
    pub fn swap_deadline(&self) -> Option<DateTime<Utc>> {
        self.in_flight.as_ref().map(|flight| flight.swap_at)
    }

    /// Performs the swap once its deadline has passed: the panel behind the
    /// outgoing story is discarded, the outgoing story takes its place and
    /// the target becomes the viewing panel. The slot ahead is left empty
    /// for the caller to stage.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Option<SwapOutcome> {
        if self.swap_deadline().is_none_or(|deadline| now < deadline) {
            return None;
        }
        let flight = self.in_flight.take()?;
        let behind = PanelSlot::from(flight.direction.opposite());
        let ahead = PanelSlot::from(flight.direction);

        let discarded = self.slot_mut(behind).take();
        let outgoing = self.viewing.take();
        let promoted = self.slot_mut(ahead).take().unwrap_or(flight.target);
        *self.slot_mut(behind) = outgoing.clone();
        self.viewing = Some(promoted.clone());

        Some(SwapOutcome {
            direction: flight.direction,
            discarded,
            demoted: outgoing.map(|id| (id, behind)),
            promoted,
        })
    }

    /// Releases every staged panel and abandons any pending swap. Returns
    /// the released stories.
    pub fn release_all(&mut self) -> Vec<StoryId> {
        self.in_flight = None;
        [
            self.previous.take(),
            self.viewing.take(),
            self.next.take(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
