//! Commands emitted for the host's rendering layer.

use serde::Serialize;
use storyreel_core::ids::StoryId;

use super::transition::{PanelSlot, Transform};

/// One instruction for the rendering layer. Commands are queued by the
/// session and drained by the host in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    /// Show the viewer surface, opened on `story_id`.
    ShowViewer {
        /// The story being opened.
        story_id: StoryId,
    },
    /// Hide the viewer surface.
    HideViewer,
    /// Create a panel for a story in a slot.
    MaterializePanel {
        /// Story the panel renders.
        story_id: StoryId,
        /// Where the panel sits.
        slot: PanelSlot,
        /// Item the panel shows first.
        active_item: usize,
        /// Seen flag of each item, for the progress pointers.
        seen_items: Vec<bool>,
    },
    /// Move an existing panel into another slot.
    PromotePanel {
        /// Story the panel renders.
        story_id: StoryId,
        /// New slot.
        slot: PanelSlot,
    },
    /// Destroy a panel.
    DestroyPanel {
        /// Story the panel rendered.
        story_id: StoryId,
    },
    /// Transform the panel strip.
    SetOffset {
        /// Target transform.
        transform: Transform,
        /// Animation length; zero applies immediately.
        duration_ms: i64,
    },
    /// Update one item's progress pointer.
    SetItemState {
        /// Story holding the item.
        story_id: StoryId,
        /// Item position.
        index: usize,
        /// Whether the item is the one being shown.
        active: bool,
        /// Whether the item has been seen.
        seen: bool,
    },
    /// Flag a story as seen in the timeline.
    MarkStorySeen {
        /// The story.
        story_id: StoryId,
    },
    /// Replace the relative time label of the viewing panel.
    SetTimeLabel {
        /// Story holding the active item.
        story_id: StoryId,
        /// Rendered label.
        label: String,
    },
    /// Toggle the paused presentation.
    SetPaused {
        /// True while paused.
        paused: bool,
    },
    /// Toggle the long-press presentation.
    SetLongPress {
        /// True while held.
        active: bool,
    },
    /// Start or resume an item's media.
    PlayMedia {
        /// Story holding the item.
        story_id: StoryId,
        /// Item position.
        index: usize,
    },
    /// Pause an item's media.
    PauseMedia {
        /// Story holding the item.
        story_id: StoryId,
        /// Item position.
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_serialize_with_a_command_tag() {
        // Arrange
        let command = RenderCommand::SetOffset {
            transform: Transform::Translate { px: -320.0 },
            duration_ms: 600,
        };

        // Act
        let json = serde_json::to_value(&command).unwrap();

        // Assert
        assert_eq!(
            json,
            serde_json::json!({
                "command": "set_offset",
                "transform": { "kind": "translate", "px": -320.0 },
                "duration_ms": 600
            })
        );
    }

    #[test]
    fn test_unit_command_serializes_as_tag_only() {
        let json = serde_json::to_string(&RenderCommand::HideViewer).unwrap();
        assert_eq!(json, r#"{"command":"hide_viewer"}"#);
    }
}
