//! Story and item records, and the ordered store that holds them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyreel_core::error::ViewerError;
use storyreel_core::ids::{Direction, ItemId, StoryId};

/// Kind of media an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image, shown for a fixed duration.
    Image,
    /// Video, shown for its measured duration.
    Video,
}

/// One media unit inside a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier, unique within its story.
    pub id: ItemId,
    /// Media kind.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Media source.
    pub src: String,
    /// Thumbnail shown on the progress pointer.
    #[serde(default)]
    pub preview: Option<String>,
    /// Optional call-to-action link.
    #[serde(default)]
    pub link: Option<String>,
    /// Label for the call-to-action link.
    #[serde(default)]
    pub link_text: Option<String>,
    /// Display duration. Images fall back to the configured default; videos
    /// are re-timed once their real duration is measured.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    /// Publication time, rendered as a relative label.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Whether the viewer has already moved past this item.
    #[serde(default, rename = "seen")]
    pub seen_within_story: bool,
}

impl Item {
    /// Creates an unseen image item.
    #[must_use]
    pub fn image(id: impl Into<ItemId>, src: impl Into<String>) -> Self {
        Self::with_kind(id.into(), MediaKind::Image, src.into())
    }

    /// Creates an unseen video item.
    #[must_use]
    pub fn video(id: impl Into<ItemId>, src: impl Into<String>) -> Self {
        Self::with_kind(id.into(), MediaKind::Video, src.into())
    }

    fn with_kind(id: ItemId, kind: MediaKind, src: String) -> Self {
        Self {
            id,
            kind,
            src,
            preview: None,
            link: None,
            link_text: None,
            duration_seconds: None,
            published_at: None,
            seen_within_story: false,
        }
    }

    /// Sets the display duration.
    #[must_use]
    pub fn lasting(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Sets the publication time.
    #[must_use]
    pub fn published(mut self, at: DateTime<Utc>) -> Self {
        self.published_at = Some(at);
        self
    }

    /// Marks the item as already seen.
    #[must_use]
    pub fn seen(mut self) -> Self {
        self.seen_within_story = true;
        self
    }
}

/// An ordered sequence of items by one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier, unique within the store.
    pub id: StoryId,
    /// Author display name.
    #[serde(default)]
    pub name: String,
    /// Author avatar.
    #[serde(default)]
    pub photo: Option<String>,
    /// Link shown on the author header.
    #[serde(default)]
    pub link: Option<String>,
    /// True for the signed-in user's own story.
    #[serde(default)]
    pub own_story: bool,
    /// Time of the most recent item.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Items in playback order.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Cursor into `items`.
    #[serde(default)]
    pub current_item: usize,
    /// Whether the whole story has been watched to its end.
    #[serde(default)]
    pub seen: bool,
}

impl Story {
    /// Creates an empty, unseen story.
    #[must_use]
    pub fn new(id: impl Into<StoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo: None,
            link: None,
            own_story: false,
            last_updated: None,
            items: Vec::new(),
            current_item: 0,
            seen: false,
        }
    }

    /// Replaces the story's items.
    #[must_use]
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Index the viewer resumes at: the first unseen item, or the last item
    /// when every item has been seen. `None` for a story without items.
    #[must_use]
    pub fn continuation_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        Some(
            self.items
                .iter()
                .position(|item| !item.seen_within_story)
                .unwrap_or(self.items.len() - 1),
        )
    }

    /// Returns the item under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Item> {
        self.items.get(self.current_item)
    }

    /// Returns the position of an item by id.
    #[must_use]
    pub fn item_index(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Seen flag of each item, in order.
    #[must_use]
    pub fn seen_flags(&self) -> Vec<bool> {
        self.items.iter().map(|item| item.seen_within_story).collect()
    }
}

/// Where an inserted record lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// After every existing record.
    #[default]
    Append,
    /// Before every existing record.
    Prepend,
}

/// Stories in rendered order. Neighbor lookups follow this order.
#[derive(Debug, Clone, Default)]
pub struct StoryStore {
    stories: Vec<Story>,
}

impl StoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Returns true when the store holds no stories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Stories in rendered order.
    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.stories.iter()
    }

    /// Looks up a story by id.
    #[must_use]
    pub fn get(&self, id: &StoryId) -> Option<&Story> {
        self.stories.iter().find(|story| &story.id == id)
    }

    /// Looks up a story by id for mutation.
    pub fn get_mut(&mut self, id: &StoryId) -> Option<&mut Story> {
        self.stories.iter_mut().find(|story| &story.id == id)
    }

    /// Rendered position of a story.
    #[must_use]
    pub fn position(&self, id: &StoryId) -> Option<usize> {
        self.stories.iter().position(|story| &story.id == id)
    }

    /// The story adjacent to `id` in `direction`, if any.
    #[must_use]
    pub fn neighbor(&self, id: &StoryId, direction: Direction) -> Option<&Story> {
        let position = self.position(id)?;
        let target = position.checked_add_signed(direction.step())?;
        self.stories.get(target)
    }

    /// Moves a story's cursor. Returns false, changing nothing, when the
    /// story is unknown or the index is out of range.
    pub fn set_cursor(&mut self, id: &StoryId, index: usize) -> bool {
        match self.get_mut(id) {
            Some(story) if index < story.items.len() => {
                story.current_item = index;
                true
            }
            _ => false,
        }
    }

    /// Inserts a story, or replaces an existing one in place keeping its
    /// position. Returns true when the story was new.
    pub fn upsert(&mut self, mut story: Story, placement: Placement) -> bool {
        if let Some(existing) = self.get_mut(&story.id) {
            story.current_item = story
                .current_item
                .min(story.items.len().saturating_sub(1));
            *existing = story;
            return false;
        }
        story.current_item = 0;
        match placement {
            Placement::Append => self.stories.push(story),
            Placement::Prepend => self.stories.insert(0, story),
        }
        true
    }

    /// Removes a story, returning it.
    pub fn remove(&mut self, id: &StoryId) -> Option<Story> {
        let position = self.position(id)?;
        Some(self.stories.remove(position))
    }

    /// Adds an item to a story. A duplicate item id is ignored and reported
    /// as `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::StoryNotFound` if the story is unknown.
    pub fn add_item(
        &mut self,
        story_id: &StoryId,
        item: Item,
        placement: Placement,
    ) -> Result<bool, ViewerError> {
        let story = self
            .get_mut(story_id)
            .ok_or_else(|| ViewerError::StoryNotFound(story_id.clone()))?;
        if story.item_index(&item.id).is_some() {
            return Ok(false);
        }
        match placement {
            Placement::Append => story.items.push(item),
            Placement::Prepend => {
                let had_items = !story.items.is_empty();
                story.items.insert(0, item);
                if had_items {
                    story.current_item += 1;
                }
            }
        }
        Ok(true)
    }

    /// Removes an item from a story, keeping the cursor on the same item
    /// where possible.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::StoryNotFound` if the story is unknown.
    pub fn remove_item(
        &mut self,
        story_id: &StoryId,
        item_id: &ItemId,
    ) -> Result<Option<Item>, ViewerError> {
        let story = self
            .get_mut(story_id)
            .ok_or_else(|| ViewerError::StoryNotFound(story_id.clone()))?;
        let Some(index) = story.item_index(item_id) else {
            return Ok(None);
        };
        let removed = story.items.remove(index);
        if index < story.current_item {
            story.current_item -= 1;
        }
        story.current_item = story
            .current_item
            .min(story.items.len().saturating_sub(1));
        Ok(Some(removed))
    }

    /// Moves every seen story to the end, preserving relative order within
    /// the unseen and seen groups.
    pub fn move_seen_to_end(&mut self) {
        let (unseen, seen): (Vec<Story>, Vec<Story>) =
            self.stories.drain(..).partition(|story| !story.seen);
        self.stories = unseen;
        self.stories.extend(seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, seen_flags: &[bool]) -> Story {
        let items = seen_flags
            .iter()
            .enumerate()
            .map(|(i, &seen)| {
                let item = Item::image(format!("{id}-{i}"), format!("{id}-{i}.jpg"));
                if seen { item.seen() } else { item }
            })
            .collect();
        Story::new(id, id).with_items(items)
    }

    fn ids(store: &StoryStore) -> Vec<&str> {
        store.iter().map(|story| story.id.as_str()).collect()
    }

    #[test]
    fn test_continuation_index_is_first_unseen_item() {
        // Arrange
        let partially_seen = story("a", &[true, true, false, false]);

        // Act
        let index = partially_seen.continuation_index();

        // Assert
        assert_eq!(index, Some(2));
    }

    #[test]
    fn test_continuation_index_is_last_item_when_all_seen() {
        let fully_seen = story("a", &[true, true, true]);
        assert_eq!(fully_seen.continuation_index(), Some(2));
    }

    #[test]
    fn test_continuation_index_is_none_without_items() {
        assert_eq!(Story::new("empty", "Empty").continuation_index(), None);
    }

    #[test]
    fn test_neighbor_follows_rendered_order() {
        // Arrange
        let mut store = StoryStore::new();
        store.upsert(story("a", &[false]), Placement::Append);
        store.upsert(story("b", &[false]), Placement::Append);
        store.upsert(story("c", &[false]), Placement::Append);

        // Act
        let before_b = store.neighbor(&StoryId::new("b"), Direction::Previous);
        let after_b = store.neighbor(&StoryId::new("b"), Direction::Next);
        let after_c = store.neighbor(&StoryId::new("c"), Direction::Next);
        let before_a = store.neighbor(&StoryId::new("a"), Direction::Previous);

        // Assert
        assert_eq!(before_b.map(|s| s.id.as_str()), Some("a"));
        assert_eq!(after_b.map(|s| s.id.as_str()), Some("c"));
        assert!(after_c.is_none());
        assert!(before_a.is_none());
    }

    #[test]
    fn test_set_cursor_out_of_range_is_a_silent_no_op() {
        // Arrange
        let mut store = StoryStore::new();
        store.upsert(story("a", &[false, false]), Placement::Append);
        let id = StoryId::new("a");

        // Act
        let accepted = store.set_cursor(&id, 1);
        let rejected = store.set_cursor(&id, 2);

        // Assert
        assert!(accepted);
        assert!(!rejected);
        assert_eq!(store.get(&id).map(|s| s.current_item), Some(1));
        assert!(!store.set_cursor(&StoryId::new("missing"), 0));
    }

    #[test]
    fn test_upsert_updates_in_place_and_prepend_inserts_first() {
        // Arrange
        let mut store = StoryStore::new();
        store.upsert(story("a", &[false]), Placement::Append);
        store.upsert(story("b", &[false]), Placement::Append);

        // Act
        let inserted = store.upsert(story("z", &[false]), Placement::Prepend);
        let updated = store.upsert(story("a", &[false, false]), Placement::Prepend);

        // Assert
        assert!(inserted);
        assert!(!updated);
        assert_eq!(ids(&store), vec!["z", "a", "b"]);
        assert_eq!(store.get(&StoryId::new("a")).map(|s| s.items.len()), Some(2));
    }

    #[test]
    fn test_add_item_ignores_duplicates() {
        // Arrange
        let mut store = StoryStore::new();
        store.upsert(story("a", &[false]), Placement::Append);
        let id = StoryId::new("a");

        // Act
        let first = store.add_item(&id, Item::image("extra", "x.jpg"), Placement::Append);
        let duplicate = store.add_item(&id, Item::image("extra", "y.jpg"), Placement::Append);

        // Assert
        assert!(matches!(first, Ok(true)));
        assert!(matches!(duplicate, Ok(false)));
        assert_eq!(store.get(&id).map(|s| s.items.len()), Some(2));
    }

    #[test]
    fn test_add_item_to_unknown_story_fails() {
        let mut store = StoryStore::new();
        let result = store.add_item(
            &StoryId::new("ghost"),
            Item::image("i", "i.jpg"),
            Placement::Append,
        );
        assert!(matches!(result, Err(ViewerError::StoryNotFound(_))));
    }

    #[test]
    fn test_remove_item_keeps_cursor_on_same_item() {
        // Arrange
        let mut store = StoryStore::new();
        store.upsert(story("a", &[false, false, false]), Placement::Append);
        let id = StoryId::new("a");
        store.set_cursor(&id, 2);

        // Act
        let removed = store.remove_item(&id, &ItemId::new("a-0")).unwrap();

        // Assert
        assert_eq!(removed.map(|item| item.id), Some(ItemId::new("a-0")));
        let story = store.get(&id).unwrap();
        assert_eq!(story.current_item, 1);
        assert_eq!(story.current().map(|item| item.id.as_str()), Some("a-2"));
    }

    #[test]
    fn test_move_seen_to_end_preserves_relative_order() {
        // Arrange
        let mut store = StoryStore::new();
        for (id, seen) in [("a", true), ("b", false), ("c", true), ("d", false)] {
            let mut s = story(id, &[false]);
            s.seen = seen;
            store.upsert(s, Placement::Append);
        }

        // Act
        store.move_seen_to_end();

        // Assert
        assert_eq!(ids(&store), vec!["b", "d", "a", "c"]);
    }
}
