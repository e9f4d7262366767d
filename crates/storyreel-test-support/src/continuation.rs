//! Continuation log — captures continuations handed to session hooks so a
//! test can decide when (or whether) the host resumes them.

use std::sync::{Arc, Mutex};

use storyreel_core::continuation::Continuation;
use storyreel_core::ids::StoryId;

#[derive(Debug)]
struct HeldContinuation {
    hook: &'static str,
    story_id: StoryId,
    continuation: Continuation,
}

/// Shared, cloneable record of hook invocations and their continuations.
#[derive(Debug, Clone, Default)]
pub struct ContinuationLog {
    held: Arc<Mutex<Vec<HeldContinuation>>>,
}

impl ContinuationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hook call without resuming its continuation.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn hold(&self, hook: &'static str, story_id: &StoryId, continuation: Continuation) {
        self.held.lock().unwrap().push(HeldContinuation {
            hook,
            story_id: story_id.clone(),
            continuation,
        });
    }

    /// Records a hook call and resumes its continuation immediately.
    pub fn pass(&self, hook: &'static str, story_id: &StoryId, continuation: Continuation) {
        continuation.resume();
        self.hold(hook, story_id, continuation);
    }

    /// Story ids passed to `hook`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn calls(&self, hook: &str) -> Vec<StoryId> {
        self.held
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.hook == hook)
            .map(|h| h.story_id.clone())
            .collect()
    }

    /// Hook names in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn hooks(&self) -> Vec<&'static str> {
        self.held.lock().unwrap().iter().map(|h| h.hook).collect()
    }

    /// Number of recorded continuations not yet resumed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.held
            .lock()
            .unwrap()
            .iter()
            .filter(|h| !h.continuation.is_resumed())
            .count()
    }

    /// Resumes the oldest unresumed continuation recorded for `hook`.
    /// Returns false if there is none.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn resume_next(&self, hook: &str) -> bool {
        let held = self.held.lock().unwrap();
        match held
            .iter()
            .find(|h| h.hook == hook && !h.continuation.is_resumed())
        {
            Some(h) => {
                h.continuation.resume();
                true
            }
            None => false,
        }
    }

    /// Returns a clone of the most recent continuation recorded for `hook`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn last(&self, hook: &str) -> Option<Continuation> {
        self.held
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|h| h.hook == hook)
            .map(|h| h.continuation.clone())
    }
}
