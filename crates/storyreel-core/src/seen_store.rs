//! Seen-state storage abstraction.
//!
//! A store is a durable key-value slot holding serialized documents, in the
//! manner of browser local storage. The seen tracker owns the document
//! format; stores only move strings.

use crate::error::ViewerError;
use crate::ids::ViewerId;

/// Repository trait for reading and writing seen-state documents.
pub trait SeenStore: Send + Sync {
    /// Reads the document stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Persistence` if the backing storage is
    /// unavailable.
    fn read(&self, key: &str) -> Result<Option<String>, ViewerError>;

    /// Overwrites the document stored under `key`. Returns only after the
    /// write is durable.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Persistence` if the write fails.
    fn write(&self, key: &str, document: &str) -> Result<(), ViewerError>;
}

/// Storage key for the story-level seen map of a viewer instance.
#[must_use]
pub fn seen_stories_key(viewer_id: &ViewerId) -> String {
    format!("storyreel-{viewer_id}-seen-stories")
}

/// Storage key for the per-story seen item ids of a viewer instance.
#[must_use]
pub fn seen_items_key(viewer_id: &ViewerId) -> String {
    format!("storyreel-{viewer_id}-seen-items")
}
