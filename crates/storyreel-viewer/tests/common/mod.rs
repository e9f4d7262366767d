//! Shared test helpers for navigation session integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use storyreel_core::clock::Clock;
use storyreel_core::config::ViewerConfig;
use storyreel_core::continuation::Continuation;
use storyreel_core::ids::{ItemId, StoryId, ViewerId};
use storyreel_core::seen_store::SeenStore;
use storyreel_test_support::{ContinuationLog, ManualClock, RecordingSeenStore};
use storyreel_viewer::application::session::NavigationSession;
use storyreel_viewer::domain::callbacks::SessionCallbacks;
use storyreel_viewer::domain::gesture::{GestureOutcome, PointerEvent, SurfaceMetrics};
use storyreel_viewer::domain::render::RenderCommand;
use storyreel_viewer::domain::story::{Item, Placement, Story};

/// Gating hooks a harness can be told to hold.
pub const ON_OPEN: &str = "on_open";
pub const ON_END: &str = "on_end";
pub const ON_CLOSE: &str = "on_close";
pub const ON_NAVIGATE_ITEM: &str = "on_navigate_item";

/// A session wired to a manual clock, a recording store and a continuation
/// log.
pub struct Harness {
    pub session: NavigationSession,
    pub clock: Arc<ManualClock>,
    pub log: ContinuationLog,
    pub store: Arc<RecordingSeenStore>,
    pub viewed: Rc<RefCell<Vec<StoryId>>>,
    pub items_viewed: Rc<RefCell<Vec<(StoryId, ItemId)>>>,
}

impl Harness {
    /// Moves the clock forward and runs due work.
    pub fn advance(&mut self, ms: i64) {
        self.clock.advance_ms(ms);
        self.session.tick();
    }

    /// Drags from the middle of the surface by `dx` over `ms`.
    pub fn swipe(&mut self, dx: f64, ms: i64) -> GestureOutcome {
        let start = self.clock.now();
        self.session.pointer_down(PointerEvent::new(150.0, 400.0, start));
        self.clock.advance_ms(ms);
        let end = self.clock.now();
        self.session
            .pointer_move(PointerEvent::new(150.0 + dx, 400.0, end));
        self.session
            .pointer_up(PointerEvent::new(150.0 + dx, 400.0, end))
    }

    /// A quick motionless press at `x`.
    pub fn tap(&mut self, x: f64) -> GestureOutcome {
        let start = self.clock.now();
        self.session.pointer_down(PointerEvent::new(x, 400.0, start));
        self.clock.advance_ms(100);
        let end = self.clock.now();
        self.session.pointer_up(PointerEvent::new(x, 400.0, end))
    }

    /// Resumes the oldest held continuation for `hook` and drains it.
    pub fn resume(&mut self, hook: &str) -> bool {
        let resumed = self.log.resume_next(hook);
        self.session.tick();
        resumed
    }

    /// Drains render commands.
    pub fn commands(&mut self) -> Vec<RenderCommand> {
        self.session.take_render_commands()
    }

    /// Seen flags of a story's items.
    pub fn seen_flags(&self, story_id: &str) -> Vec<bool> {
        self.session
            .stories()
            .get(&StoryId::new(story_id))
            .map(Story::seen_flags)
            .unwrap_or_default()
    }
}

/// Surface used by every session test.
pub fn metrics() -> SurfaceMetrics {
    SurfaceMetrics::new(300.0, 800.0)
}

/// A story of `count` three-second images named `{id}-{n}`.
pub fn image_story(id: &str, count: usize) -> Story {
    let items = (0..count)
        .map(|n| Item::image(format!("{id}-{n}"), format!("{id}-{n}.jpg")))
        .collect();
    Story::new(id, id).with_items(items)
}

fn route(
    log: &ContinuationLog,
    hook: &'static str,
    hold: bool,
) -> impl FnMut(&StoryId, Continuation) + 'static {
    let log = log.clone();
    move |story_id, continuation| {
        if hold {
            log.hold(hook, story_id, continuation);
        } else {
            log.pass(hook, story_id, continuation);
        }
    }
}

/// Builds a harness with default config whose hooks hold the listed gates
/// and pass the rest.
pub fn harness(stories: Vec<Story>, held: &[&'static str]) -> Harness {
    harness_with(stories, held, ViewerConfig::default(), Arc::new(RecordingSeenStore::new()))
}

/// Builds a harness with explicit config and seen store.
pub fn harness_with(
    stories: Vec<Story>,
    held: &[&'static str],
    config: ViewerConfig,
    store: Arc<RecordingSeenStore>,
) -> Harness {
    let clock = Arc::new(ManualClock::at_epoch());
    let log = ContinuationLog::new();
    let viewed = Rc::new(RefCell::new(Vec::new()));
    let items_viewed = Rc::new(RefCell::new(Vec::new()));

    let navigate_log = log.clone();
    let hold_navigate = held.contains(&ON_NAVIGATE_ITEM);
    let view_log = Rc::clone(&viewed);
    let item_log = Rc::clone(&items_viewed);
    let callbacks = SessionCallbacks::new()
        .on_open(route(&log, ON_OPEN, held.contains(&ON_OPEN)))
        .on_end(route(&log, ON_END, held.contains(&ON_END)))
        .on_close(route(&log, ON_CLOSE, held.contains(&ON_CLOSE)))
        .on_navigate_item(move |story_id, _next, continuation| {
            if hold_navigate {
                navigate_log.hold(ON_NAVIGATE_ITEM, story_id, continuation);
            } else {
                navigate_log.pass(ON_NAVIGATE_ITEM, story_id, continuation);
            }
        })
        .on_view(move |story_id| view_log.borrow_mut().push(story_id.clone()))
        .on_item_viewed(move |story_id, item_id| {
            item_log
                .borrow_mut()
                .push((story_id.clone(), item_id.clone()));
        });

    let seen_store: Arc<dyn SeenStore> = store.clone();
    let mut session = NavigationSession::new(
        ViewerId::new("home"),
        config,
        metrics(),
        clock.clone(),
        Some(seen_store),
        callbacks,
    )
    .unwrap();
    for story in stories {
        session.upsert_story(story, Placement::Append);
    }

    Harness {
        session,
        clock,
        log,
        store,
        viewed,
        items_viewed,
    }
}
