//! Script documents: timed input for a replay.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use storyreel_core::ids::{Direction, StoryId};
use storyreel_viewer::application::session::Key;
use storyreel_viewer::domain::gesture::{HitTarget, PointerEvent};

/// One scripted input, applied `at_ms` after the replay starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    /// Offset from the start of the replay.
    pub at_ms: u64,
    /// What happens.
    pub action: Action,
}

/// Pointer coordinates for the pointer actions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Pointer {
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels.
    pub y: f64,
    /// What the pointer is over.
    #[serde(default)]
    pub target: HitTarget,
}

impl Pointer {
    /// The pointer sample at `at`.
    #[must_use]
    pub fn event(self, at: DateTime<Utc>) -> PointerEvent {
        PointerEvent::new(self.x, self.y, at).on(self.target)
    }
}

/// Input the script can feed the viewer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Open the viewer on a story.
    Open {
        /// Story to open.
        story_id: StoryId,
    },
    /// Close the viewer.
    Close,
    /// Advance one item.
    NextItem,
    /// Go back one item.
    PreviousItem,
    /// End the open story.
    NextStory {
        /// Which neighbor to move to.
        #[serde(default = "forward")]
        direction: Direction,
    },
    /// Pointer pressed.
    PointerDown(Pointer),
    /// Pointer moved.
    PointerMove(Pointer),
    /// Pointer released.
    PointerUp(Pointer),
    /// Keyboard input.
    Key {
        /// The key pressed.
        key: Key,
    },
    /// The host measured a video.
    MediaDuration {
        /// Story holding the item.
        story_id: StoryId,
        /// Item position.
        index: usize,
        /// Measured length.
        seconds: f64,
    },
    /// The host failed to load an item's media.
    MediaError {
        /// Story holding the item.
        story_id: StoryId,
        /// Item position.
        index: usize,
    },
    /// The surface changed size.
    Resize {
        /// New width in pixels.
        width: f64,
        /// New height in pixels.
        height: f64,
    },
}

fn forward() -> Direction {
    Direction::Next
}

impl Action {
    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Close => "close",
            Self::NextItem => "next_item",
            Self::PreviousItem => "previous_item",
            Self::NextStory { .. } => "next_story",
            Self::PointerDown(_) => "pointer_down",
            Self::PointerMove(_) => "pointer_move",
            Self::PointerUp(_) => "pointer_up",
            Self::Key { .. } => "key",
            Self::MediaDuration { .. } => "media_duration",
            Self::MediaError { .. } => "media_error",
            Self::Resize { .. } => "resize",
        }
    }
}

/// Orders steps by time, keeping the written order for equal times.
#[must_use]
pub fn ordered(steps: &[Step]) -> Vec<Step> {
    let mut steps = steps.to_vec();
    steps.sort_by_key(|step| step.at_ms);
    steps
}
