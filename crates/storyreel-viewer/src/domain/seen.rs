//! Seen-state tracking.
//!
//! The tracker keeps two documents per viewer instance: a story id to seen
//! flag map, and the ids of items the viewer has moved past in each story.
//! Both are read once at construction and rewritten synchronously whenever a
//! mark changes them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use storyreel_core::error::ViewerError;
use storyreel_core::ids::{ItemId, StoryId, ViewerId};
use storyreel_core::seen_store::{SeenStore, seen_items_key, seen_stories_key};
use tracing::warn;

use super::story::Story;

/// Persisted record of which stories and items have been seen.
pub struct SeenTracker {
    store: Option<Arc<dyn SeenStore>>,
    stories_key: String,
    items_key: String,
    stories: BTreeMap<StoryId, bool>,
    items: BTreeMap<StoryId, BTreeSet<ItemId>>,
}

impl std::fmt::Debug for SeenTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeenTracker")
            .field("persistent", &self.store.is_some())
            .field("stories", &self.stories)
            .field("items", &self.items)
            .finish()
    }
}

impl SeenTracker {
    /// Loads the seen-state of `viewer_id` from `store`. Pass `None` to keep
    /// the state in memory only.
    ///
    /// Unreadable or unparseable documents are logged and treated as empty.
    #[must_use]
    pub fn load(viewer_id: &ViewerId, store: Option<Arc<dyn SeenStore>>) -> Self {
        let stories_key = seen_stories_key(viewer_id);
        let items_key = seen_items_key(viewer_id);
        let (stories, items) = match &store {
            Some(store) => (
                read_document(store.as_ref(), &stories_key),
                read_document(store.as_ref(), &items_key),
            ),
            None => (BTreeMap::new(), BTreeMap::new()),
        };
        Self {
            store,
            stories_key,
            items_key,
            stories,
            items,
        }
    }

    /// Creates an empty tracker that never persists.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(&ViewerId::new("memory"), None)
    }

    /// Returns true if the story has been recorded as seen.
    #[must_use]
    pub fn is_seen(&self, story_id: &StoryId) -> bool {
        self.stories.get(story_id).copied().unwrap_or(false)
    }

    /// Returns true if the item has been recorded as seen.
    #[must_use]
    pub fn is_item_seen(&self, story_id: &StoryId, item_id: &ItemId) -> bool {
        self.items
            .get(story_id)
            .is_some_and(|seen| seen.contains(item_id))
    }

    /// The story-level seen map.
    #[must_use]
    pub fn stories(&self) -> &BTreeMap<StoryId, bool> {
        &self.stories
    }

    /// Marks a story as seen. Returns false, without writing, when it
    /// already was.
    pub fn mark_seen(&mut self, story_id: &StoryId) -> bool {
        if self.is_seen(story_id) {
            return false;
        }
        self.stories.insert(story_id.clone(), true);
        self.persist(&self.stories_key, &self.stories);
        true
    }

    /// Marks an item as seen within its story. Returns false, without
    /// writing, when it already was.
    pub fn mark_item_seen(&mut self, story_id: &StoryId, item_id: &ItemId) -> bool {
        let inserted = self
            .items
            .entry(story_id.clone())
            .or_default()
            .insert(item_id.clone());
        if inserted {
            self.persist(&self.items_key, &self.items);
        }
        inserted
    }

    /// Merges persisted state into a story supplied by the host.
    ///
    /// A persisted `true` wins over the supplied flag. A story with no entry
    /// is recorded with its supplied flag. Items already recorded as seen are
    /// flagged; items the host supplies as seen are recorded.
    pub fn reconcile(&mut self, story: &mut Story) {
        match self.stories.get(&story.id).copied() {
            Some(true) => story.seen = true,
            Some(false) if story.seen => {
                self.stories.insert(story.id.clone(), true);
                self.persist(&self.stories_key, &self.stories);
            }
            Some(false) => {}
            None => {
                self.stories.insert(story.id.clone(), story.seen);
                self.persist(&self.stories_key, &self.stories);
            }
        }

        let mut recorded = false;
        for item in &mut story.items {
            if self.is_item_seen(&story.id, &item.id) {
                item.seen_within_story = true;
            } else if item.seen_within_story {
                self.items
                    .entry(story.id.clone())
                    .or_default()
                    .insert(item.id.clone());
                recorded = true;
            }
        }
        if recorded {
            self.persist(&self.items_key, &self.items);
        }
    }

    fn persist<T: Serialize>(&self, key: &str, document: &T) {
        let Some(store) = &self.store else {
            return;
        };
        let result = serde_json::to_string(document)
            .map_err(|e| ViewerError::Persistence(format!("serialization failed: {e}")))
            .and_then(|json| store.write(key, &json));
        if let Err(error) = result {
            warn!(key, %error, "seen-state write failed; keeping in-memory state");
        }
    }
}

fn read_document<T: DeserializeOwned + Default>(store: &dyn SeenStore, key: &str) -> T {
    let parsed = store.read(key).and_then(|document| match document {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| ViewerError::Persistence(format!("unreadable document: {e}"))),
        None => Ok(T::default()),
    });
    parsed.unwrap_or_else(|error| {
        warn!(key, %error, "seen-state load failed; starting empty");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::Item;
    use storyreel_test_support::{CorruptSeenStore, FailingSeenStore, RecordingSeenStore};

    fn viewer() -> ViewerId {
        ViewerId::new("home")
    }

    #[test]
    fn test_mark_item_seen_is_idempotent() {
        // Arrange
        let store = Arc::new(RecordingSeenStore::new());
        let mut tracker = SeenTracker::load(&viewer(), Some(store.clone()));
        let story = StoryId::new("ramon");
        let item = ItemId::new("ramon-1");

        // Act
        let first = tracker.mark_item_seen(&story, &item);
        let second = tracker.mark_item_seen(&story, &item);

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(store.writes().len(), 1);
        assert!(tracker.is_item_seen(&story, &item));
    }

    #[test]
    fn test_mark_seen_persists_story_map() {
        // Arrange
        let store = Arc::new(RecordingSeenStore::new());
        let mut tracker = SeenTracker::load(&viewer(), Some(store.clone()));

        // Act
        tracker.mark_seen(&StoryId::new("gorillaz"));
        tracker.mark_seen(&StoryId::new("gorillaz"));

        // Assert
        assert_eq!(store.writes().len(), 1);
        assert_eq!(
            store.document("storyreel-home-seen-stories").as_deref(),
            Some(r#"{"gorillaz":true}"#)
        );
    }

    #[test]
    fn test_load_reads_both_documents() {
        // Arrange
        let store = Arc::new(RecordingSeenStore::with_documents(&[
            ("storyreel-home-seen-stories", r#"{"a":true,"b":false}"#),
            ("storyreel-home-seen-items", r#"{"b":["b-0"]}"#),
        ]));

        // Act
        let tracker = SeenTracker::load(&viewer(), Some(store));

        // Assert
        assert!(tracker.is_seen(&StoryId::new("a")));
        assert!(!tracker.is_seen(&StoryId::new("b")));
        assert!(tracker.is_item_seen(&StoryId::new("b"), &ItemId::new("b-0")));
        assert!(!tracker.is_item_seen(&StoryId::new("b"), &ItemId::new("b-1")));
    }

    #[test]
    fn test_failing_store_degrades_to_memory() {
        // Arrange
        let mut tracker = SeenTracker::load(&viewer(), Some(Arc::new(FailingSeenStore)));

        // Act
        let changed = tracker.mark_seen(&StoryId::new("a"));

        // Assert
        assert!(changed);
        assert!(tracker.is_seen(&StoryId::new("a")));
    }

    #[test]
    fn test_corrupt_documents_load_as_empty() {
        let tracker = SeenTracker::load(&viewer(), Some(Arc::new(CorruptSeenStore)));
        assert!(tracker.stories().is_empty());
    }

    #[test]
    fn test_in_memory_tracker_never_writes() {
        let mut tracker = SeenTracker::in_memory();
        assert!(tracker.mark_seen(&StoryId::new("a")));
        assert!(tracker.is_seen(&StoryId::new("a")));
    }

    #[test]
    fn test_reconcile_applies_persisted_flags() {
        // Arrange
        let store = Arc::new(RecordingSeenStore::with_documents(&[
            ("storyreel-home-seen-stories", r#"{"a":true}"#),
            ("storyreel-home-seen-items", r#"{"a":["a-0"]}"#),
        ]));
        let mut tracker = SeenTracker::load(&viewer(), Some(store));
        let mut story = Story::new("a", "A").with_items(vec![
            Item::image("a-0", "0.jpg"),
            Item::image("a-1", "1.jpg"),
        ]);

        // Act
        tracker.reconcile(&mut story);

        // Assert
        assert!(story.seen);
        assert_eq!(story.seen_flags(), vec![true, false]);
        assert_eq!(story.continuation_index(), Some(1));
    }

    #[test]
    fn test_reconcile_records_unknown_story_as_supplied() {
        // Arrange
        let store = Arc::new(RecordingSeenStore::new());
        let mut tracker = SeenTracker::load(&viewer(), Some(store.clone()));
        let mut story = Story::new("fresh", "Fresh");

        // Act
        tracker.reconcile(&mut story);

        // Assert
        assert!(!story.seen);
        assert_eq!(tracker.stories().get(&StoryId::new("fresh")), Some(&false));
        assert_eq!(
            store.document("storyreel-home-seen-stories").as_deref(),
            Some(r#"{"fresh":false}"#)
        );
    }
}
