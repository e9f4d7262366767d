//! Test stores — mock `SeenStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use storyreel_core::error::ViewerError;
use storyreel_core::seen_store::SeenStore;

/// A store that keeps documents in memory and records every write, so tests
/// can assert on persistence side effects.
#[derive(Debug, Default)]
pub struct RecordingSeenStore {
    slots: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
}

impl RecordingSeenStore {
    /// Creates an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `key → document` slots.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_documents(documents: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut slots = store.slots.lock().unwrap();
            for (key, document) in documents {
                slots.insert((*key).to_owned(), (*document).to_owned());
            }
        }
        store
    }

    /// Returns a snapshot of every write, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().unwrap().clone()
    }

    /// Returns the current document under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn document(&self, key: &str) -> Option<String> {
        self.slots.lock().unwrap().get(key).cloned()
    }
}

impl SeenStore for RecordingSeenStore {
    fn read(&self, key: &str) -> Result<Option<String>, ViewerError> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ViewerError> {
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_owned(), document.to_owned());
        self.writes
            .lock()
            .unwrap()
            .push((key.to_owned(), document.to_owned()));
        Ok(())
    }
}

/// A store whose reads and writes always fail. Useful for testing the
/// degrade-to-memory path.
#[derive(Debug)]
pub struct FailingSeenStore;

impl SeenStore for FailingSeenStore {
    fn read(&self, _key: &str) -> Result<Option<String>, ViewerError> {
        Err(ViewerError::Persistence("storage unavailable".into()))
    }

    fn write(&self, _key: &str, _document: &str) -> Result<(), ViewerError> {
        Err(ViewerError::Persistence("storage unavailable".into()))
    }
}

/// A store that returns unparseable documents for every key and accepts
/// writes silently.
#[derive(Debug)]
pub struct CorruptSeenStore;

impl SeenStore for CorruptSeenStore {
    fn read(&self, _key: &str) -> Result<Option<String>, ViewerError> {
        Ok(Some("{not json".to_owned()))
    }

    fn write(&self, _key: &str, _document: &str) -> Result<(), ViewerError> {
        Ok(())
    }
}
