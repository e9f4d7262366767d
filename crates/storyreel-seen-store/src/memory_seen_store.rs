//! In-memory implementation of the `SeenStore` trait.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use storyreel_core::error::ViewerError;
use storyreel_core::seen_store::SeenStore;

/// A store that keeps documents for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct InMemorySeenStore {
    slots: Mutex<HashMap<String, String>>,
}

impl InMemorySeenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeenStore for InMemorySeenStore {
    fn read(&self, key: &str) -> Result<Option<String>, ViewerError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ViewerError> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), document.to_owned());
        Ok(())
    }
}
