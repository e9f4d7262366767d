//! Host interception hooks.
//!
//! Gating hooks receive a [`Continuation`] and the step they guard only
//! happens once it is resumed. Every hook is optional; an absent gating hook
//! resumes at once.

use std::fmt;

use storyreel_core::continuation::Continuation;
use storyreel_core::ids::{Direction, ItemId, StoryId};

type GateHook = Box<dyn FnMut(&StoryId, Continuation)>;
type ItemGateHook = Box<dyn FnMut(&StoryId, Option<&StoryId>, Continuation)>;
type ViewHook = Box<dyn FnMut(&StoryId)>;
type ItemViewedHook = Box<dyn FnMut(&StoryId, &ItemId)>;

/// The set of hooks a session calls.
#[derive(Default)]
pub struct SessionCallbacks {
    on_open: Option<GateHook>,
    on_view: Option<ViewHook>,
    on_end: Option<GateHook>,
    on_close: Option<GateHook>,
    on_next_item: Option<ItemGateHook>,
    on_navigate_item: Option<ItemGateHook>,
    on_item_viewed: Option<ItemViewedHook>,
}

impl fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCallbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_view", &self.on_view.is_some())
            .field("on_end", &self.on_end.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_next_item", &self.on_next_item.is_some())
            .field("on_navigate_item", &self.on_navigate_item.is_some())
            .field("on_item_viewed", &self.on_item_viewed.is_some())
            .finish()
    }
}

impl SessionCallbacks {
    /// Creates a set with no hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gates opening a story.
    #[must_use]
    pub fn on_open(mut self, hook: impl FnMut(&StoryId, Continuation) + 'static) -> Self {
        self.on_open = Some(Box::new(hook));
        self
    }

    /// Notified whenever a story's item is shown.
    #[must_use]
    pub fn on_view(mut self, hook: impl FnMut(&StoryId) + 'static) -> Self {
        self.on_view = Some(Box::new(hook));
        self
    }

    /// Gates leaving a story at its end.
    #[must_use]
    pub fn on_end(mut self, hook: impl FnMut(&StoryId, Continuation) + 'static) -> Self {
        self.on_end = Some(Box::new(hook));
        self
    }

    /// Gates closing the viewer.
    #[must_use]
    pub fn on_close(mut self, hook: impl FnMut(&StoryId, Continuation) + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Gates moving forward one item. Receives the current story and the
    /// story after it.
    #[must_use]
    pub fn on_next_item(
        mut self,
        hook: impl FnMut(&StoryId, Option<&StoryId>, Continuation) + 'static,
    ) -> Self {
        self.on_next_item = Some(Box::new(hook));
        self
    }

    /// Gates moving one item in either direction. Takes precedence over
    /// `on_next_item`.
    #[must_use]
    pub fn on_navigate_item(
        mut self,
        hook: impl FnMut(&StoryId, Option<&StoryId>, Continuation) + 'static,
    ) -> Self {
        self.on_navigate_item = Some(Box::new(hook));
        self
    }

    /// Notified with the item id each time an item becomes active.
    #[must_use]
    pub fn on_item_viewed(mut self, hook: impl FnMut(&StoryId, &ItemId) + 'static) -> Self {
        self.on_item_viewed = Some(Box::new(hook));
        self
    }

    pub(crate) fn open(&mut self, story_id: &StoryId, continuation: Continuation) {
        gate(self.on_open.as_mut(), story_id, continuation);
    }

    pub(crate) fn end(&mut self, story_id: &StoryId, continuation: Continuation) {
        gate(self.on_end.as_mut(), story_id, continuation);
    }

    pub(crate) fn close(&mut self, story_id: &StoryId, continuation: Continuation) {
        gate(self.on_close.as_mut(), story_id, continuation);
    }

    pub(crate) fn navigate_item(
        &mut self,
        story_id: &StoryId,
        next_story: Option<&StoryId>,
        direction: Direction,
        continuation: Continuation,
    ) {
        if let Some(hook) = self.on_navigate_item.as_mut() {
            hook(story_id, next_story, continuation);
        } else if let (Direction::Next, Some(hook)) = (direction, self.on_next_item.as_mut()) {
            hook(story_id, next_story, continuation);
        } else {
            continuation.resume();
        }
    }

    pub(crate) fn view(&mut self, story_id: &StoryId) {
        if let Some(hook) = self.on_view.as_mut() {
            hook(story_id);
        }
    }

    pub(crate) fn item_viewed(&mut self, story_id: &StoryId, item_id: &ItemId) {
        if let Some(hook) = self.on_item_viewed.as_mut() {
            hook(story_id, item_id);
        }
    }
}

fn gate(hook: Option<&mut GateHook>, story_id: &StoryId, continuation: Continuation) {
    match hook {
        Some(hook) => hook(story_id, continuation),
        None => continuation.resume(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use storyreel_core::continuation::ContinuationMailbox;

    #[test]
    fn test_absent_gate_resumes_immediately() {
        // Arrange
        let mailbox = ContinuationMailbox::new();
        let mut callbacks = SessionCallbacks::new();
        let continuation = mailbox.issue();

        // Act
        callbacks.open(&StoryId::new("a"), continuation.clone());

        // Assert
        assert!(continuation.is_resumed());
        assert_eq!(mailbox.drain(), vec![continuation.token()]);
    }

    #[test]
    fn test_forward_navigation_falls_back_to_next_item_hook() {
        // Arrange
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mailbox = ContinuationMailbox::new();
        let mut callbacks = SessionCallbacks::new().on_next_item(move |story, next, _c| {
            log.borrow_mut()
                .push((story.to_string(), next.map(ToString::to_string)));
        });
        let forward = mailbox.issue();
        let backward = mailbox.issue();

        // Act
        callbacks.navigate_item(
            &StoryId::new("a"),
            Some(&StoryId::new("b")),
            Direction::Next,
            forward.clone(),
        );
        callbacks.navigate_item(&StoryId::new("a"), None, Direction::Previous, backward.clone());

        // Assert
        assert_eq!(
            seen.borrow().as_slice(),
            &[("a".to_owned(), Some("b".to_owned()))]
        );
        assert!(!forward.is_resumed());
        assert!(backward.is_resumed());
    }

    #[test]
    fn test_debug_lists_installed_hooks() {
        let callbacks = SessionCallbacks::new().on_view(|_| {});
        let rendered = format!("{callbacks:?}");
        assert!(rendered.contains("on_view: true"));
        assert!(rendered.contains("on_open: false"));
    }
}
