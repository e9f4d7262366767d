//! Viewer error types.

use thiserror::Error;

use crate::ids::{Direction, StoryId};

/// Top-level error type for the viewer engine.
///
/// None of these escape the navigation session: the session absorbs each one
/// into a no-op and logs it.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// A story id is not known to the store.
    #[error("story not found: {0}")]
    StoryNotFound(StoryId),

    /// An item cursor fell outside a story's items.
    #[error("item index {index} out of range for story {story_id} with {len} items")]
    ItemOutOfRange {
        /// The story whose items were indexed.
        story_id: StoryId,
        /// The rejected index.
        index: usize,
        /// The number of items in the story.
        len: usize,
    },

    /// No neighbor story exists in the requested direction.
    #[error("story {story_id} has no {direction} neighbor")]
    NoNeighbor {
        /// The story the lookup started from.
        story_id: StoryId,
        /// The requested direction.
        direction: Direction,
    },

    /// A panel for this story is already staged.
    #[error("panel already staged for story {0}")]
    DuplicatePanel(StoryId),

    /// The request is not valid in the current session state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Seen-state storage failed or held unreadable data.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A configuration value is out of range.
    #[error("configuration error: {0}")]
    Configuration(String),
}
