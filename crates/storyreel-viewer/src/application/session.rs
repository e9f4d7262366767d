//! The navigation session.
//!
//! One `NavigationSession` owns everything about a viewer: the timeline,
//! seen-state, autoplay, gesture tracking, staged panels and the host hooks.
//! It is the single serialization point for input. Every public operation
//! either commits, waits on a host continuation, or is ignored; no error
//! escapes it.
//!
//! The host drives time by calling [`NavigationSession::tick`] at
//! [`NavigationSession::next_deadline`], and after resuming a continuation
//! outside of a hook call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyreel_core::clock::{Clock, millis};
use storyreel_core::config::ViewerConfig;
use storyreel_core::continuation::{ContinuationMailbox, GateToken};
use storyreel_core::error::ViewerError;
use storyreel_core::ids::{Direction, ItemId, StoryId, ViewerId};
use storyreel_core::seen_store::SeenStore;
use tracing::{debug, info, instrument, warn};

use crate::domain::autoplay::{AutoplayDriver, AutoplayTarget};
use crate::domain::callbacks::SessionCallbacks;
use crate::domain::gesture::{
    GestureOutcome, GestureRecognizer, Neighbors, PointerEvent, SurfaceMetrics,
};
use crate::domain::render::RenderCommand;
use crate::domain::seen::SeenTracker;
use crate::domain::story::{Item, Placement, Story, StoryStore};
use crate::domain::time_label::time_ago;
use crate::domain::transition::{PanelSlot, TransitionController, TransitionOrigin};

/// Lifecycle of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing is shown.
    Closed,
    /// Waiting for the host to allow opening.
    Opening,
    /// A story is shown and accepts input.
    Viewing,
    /// A story transition is animating.
    Transitioning,
    /// Waiting for the host to allow closing.
    Closing,
}

/// What became of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// The request took effect.
    Committed,
    /// The request is waiting for a host continuation.
    AwaitingHost,
    /// The request was not valid now and changed nothing.
    Ignored,
}

/// Keyboard input the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    /// Closes the viewer.
    Escape,
    /// Advances one item.
    Space,
    /// Goes back one item.
    ArrowLeft,
    /// Advances one item.
    ArrowRight,
}

#[derive(Debug, Clone)]
enum GatedAction {
    Open(StoryId),
    NavigateItem {
        story_id: StoryId,
        from: usize,
        to: usize,
        direction: Direction,
    },
    End {
        story_id: StoryId,
        direction: Direction,
    },
    Close(StoryId),
}

#[derive(Debug)]
struct PendingGate {
    token: GateToken,
    action: GatedAction,
}

/// State machine for one viewer instance.
pub struct NavigationSession {
    viewer_id: ViewerId,
    config: ViewerConfig,
    clock: Arc<dyn Clock>,
    metrics: SurfaceMetrics,
    store: StoryStore,
    seen: SeenTracker,
    autoplay: AutoplayDriver,
    gesture: GestureRecognizer,
    transition: TransitionController,
    callbacks: SessionCallbacks,
    mailbox: ContinuationMailbox,
    pending: Option<PendingGate>,
    state: SessionState,
    open_story: Option<StoryId>,
    paused: bool,
    uncommitted_commands: Vec<RenderCommand>,
}

impl NavigationSession {
    /// Creates a closed session and loads the viewer's seen-state from
    /// `seen_store`. The store is ignored when `persist_seen` is off.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Configuration` if `config` fails validation.
    pub fn new(
        viewer_id: ViewerId,
        config: ViewerConfig,
        metrics: SurfaceMetrics,
        clock: Arc<dyn Clock>,
        seen_store: Option<Arc<dyn SeenStore>>,
        callbacks: SessionCallbacks,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        let seen_store = seen_store.filter(|_| config.persist_seen);
        let seen = SeenTracker::load(&viewer_id, seen_store);
        Ok(Self {
            autoplay: AutoplayDriver::new(config.default_item_duration_seconds),
            transition: TransitionController::new(&config, metrics.width),
            viewer_id,
            config,
            clock,
            metrics,
            store: StoryStore::new(),
            seen,
            gesture: GestureRecognizer::new(),
            callbacks,
            mailbox: ContinuationMailbox::new(),
            pending: None,
            state: SessionState::Closed,
            open_story: None,
            paused: false,
            uncommitted_commands: Vec::new(),
        })
    }

    /// The viewer instance id.
    #[must_use]
    pub fn viewer_id(&self) -> &ViewerId {
        &self.viewer_id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The story being viewed.
    #[must_use]
    pub fn open_story(&self) -> Option<&StoryId> {
        self.open_story.as_ref()
    }

    /// Cursor of the story being viewed.
    #[must_use]
    pub fn current_item(&self) -> Option<usize> {
        self.current_position().map(|(_, index)| index)
    }

    /// The timeline.
    #[must_use]
    pub fn stories(&self) -> &StoryStore {
        &self.store
    }

    /// Seen-state.
    #[must_use]
    pub fn seen(&self) -> &SeenTracker {
        &self.seen
    }

    /// Autoplay state.
    #[must_use]
    pub fn autoplay(&self) -> &AutoplayDriver {
        &self.autoplay
    }

    /// Staged panels and in-flight transition.
    #[must_use]
    pub fn transition(&self) -> &TransitionController {
        &self.transition
    }

    /// Returns true while a gesture holds playback.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns true while a gated step waits on the host.
    #[must_use]
    pub fn is_awaiting_host(&self) -> bool {
        self.pending.is_some()
    }

    /// Elapsed fraction of the active item's autoplay timer.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.autoplay.progress(self.clock.now())
    }

    /// Drains queued render commands, oldest first.
    pub fn take_render_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.uncommitted_commands)
    }

    /// Earliest moment `tick` has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        let autoplay = self
            .autoplay
            .deadline()
            .filter(|_| {
                self.state == SessionState::Viewing && !self.paused && self.pending.is_none()
            });
        [
            autoplay,
            self.transition.swap_deadline(),
            self.gesture.long_press_deadline(&self.config),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Adds a story, or updates it in place. Persisted seen-state is merged
    /// into the supplied record.
    pub fn upsert_story(&mut self, story: Story, placement: Placement) -> Dispatch {
        let result = self.try_upsert_story(story, placement);
        Self::absorb("upsert_story", result)
    }

    /// Removes a story that is not staged in a panel.
    pub fn remove_story(&mut self, story_id: &StoryId) -> Dispatch {
        let result = self.try_remove_story(story_id);
        Self::absorb("remove_story", result)
    }

    /// Adds an item to a story that is not staged in a panel.
    pub fn add_item(&mut self, story_id: &StoryId, item: Item, placement: Placement) -> Dispatch {
        let result = self.try_add_item(story_id, item, placement);
        Self::absorb("add_item", result)
    }

    /// Removes an item from a story that is not staged in a panel.
    pub fn remove_item(&mut self, story_id: &StoryId, item_id: &ItemId) -> Dispatch {
        let result = self.try_remove_item(story_id, item_id);
        Self::absorb("remove_item", result)
    }

    /// Moves seen stories to the end of the timeline. Only while closed.
    pub fn move_seen_to_end(&mut self) -> Dispatch {
        let result = self.expect_state(SessionState::Closed).map(|()| {
            self.store.move_seen_to_end();
            Dispatch::Committed
        });
        Self::absorb("move_seen_to_end", result)
    }

    fn try_upsert_story(
        &mut self,
        mut story: Story,
        placement: Placement,
    ) -> Result<Dispatch, ViewerError> {
        if self.state != SessionState::Closed {
            if self.store.get(&story.id).is_none() {
                return Err(ViewerError::InvalidState(
                    "stories cannot be inserted while the viewer is open".into(),
                ));
            }
            self.ensure_not_staged(&story.id)?;
        }
        self.seen.reconcile(&mut story);
        let story_id = story.id.clone();
        if self.store.upsert(story, placement) {
            debug!(%story_id, ?placement, "story added");
        }
        Ok(Dispatch::Committed)
    }

    fn try_remove_story(&mut self, story_id: &StoryId) -> Result<Dispatch, ViewerError> {
        self.ensure_not_staged(story_id)?;
        self.store
            .remove(story_id)
            .map(|_| Dispatch::Committed)
            .ok_or_else(|| ViewerError::StoryNotFound(story_id.clone()))
    }

    fn try_add_item(
        &mut self,
        story_id: &StoryId,
        mut item: Item,
        placement: Placement,
    ) -> Result<Dispatch, ViewerError> {
        self.ensure_not_staged(story_id)?;
        if self.seen.is_item_seen(story_id, &item.id) {
            item.seen_within_story = true;
        }
        if self.store.add_item(story_id, item, placement)? {
            Ok(Dispatch::Committed)
        } else {
            Ok(Dispatch::Ignored)
        }
    }

    fn try_remove_item(
        &mut self,
        story_id: &StoryId,
        item_id: &ItemId,
    ) -> Result<Dispatch, ViewerError> {
        self.ensure_not_staged(story_id)?;
        match self.store.remove_item(story_id, item_id)? {
            Some(_) => Ok(Dispatch::Committed),
            None => Ok(Dispatch::Ignored),
        }
    }

    fn ensure_not_staged(&self, story_id: &StoryId) -> Result<(), ViewerError> {
        if self.state != SessionState::Closed && self.transition.slot_of(story_id).is_some() {
            return Err(ViewerError::InvalidState(format!(
                "story {story_id} is staged in a panel"
            )));
        }
        Ok(())
    }

    /// Opens the viewer on `story_id`, resuming at its first unseen item.
    #[instrument(skip(self), fields(viewer_id = %self.viewer_id))]
    pub fn open(&mut self, story_id: &StoryId) -> Dispatch {
        let result = self.try_open(story_id);
        Self::absorb("open", result)
    }

    /// Advances one item, or ends the story from its last item. `manual`
    /// distinguishes user input from autoplay.
    pub fn next_item(&mut self, manual: bool) -> Dispatch {
        let result = self.request_item(Direction::Next, manual);
        Self::absorb("next_item", result)
    }

    /// Moves one item in `direction`. Backward at the first item does
    /// nothing; forward past the last item ends the story.
    pub fn navigate_item(&mut self, direction: Direction) -> Dispatch {
        let result = self.request_item(direction, true);
        Self::absorb("navigate_item", result)
    }

    /// Ends the open story and moves to its neighbor in `direction`, or
    /// closes the viewer when there is none.
    #[instrument(skip(self), fields(viewer_id = %self.viewer_id))]
    pub fn next_story(&mut self, direction: Direction) -> Dispatch {
        let result = self.try_next_story(direction);
        Self::absorb("next_story", result)
    }

    /// Closes the viewer. Supersedes a pending item or story-end gate.
    #[instrument(skip(self), fields(viewer_id = %self.viewer_id))]
    pub fn close(&mut self) -> Dispatch {
        let result = self.try_close();
        Self::absorb("close", result)
    }

    fn try_open(&mut self, story_id: &StoryId) -> Result<Dispatch, ViewerError> {
        self.expect_state(SessionState::Closed)?;
        let story = self
            .store
            .get(story_id)
            .ok_or_else(|| ViewerError::StoryNotFound(story_id.clone()))?;
        if story.items.is_empty() {
            return Err(ViewerError::ItemOutOfRange {
                story_id: story_id.clone(),
                index: 0,
                len: 0,
            });
        }
        info!(%story_id, "opening story");
        self.state = SessionState::Opening;
        Ok(self.gate(GatedAction::Open(story_id.clone())))
    }

    fn request_item(&mut self, direction: Direction, manual: bool) -> Result<Dispatch, ViewerError> {
        let story_id = self.idle_story()?;
        let story = self
            .store
            .get(&story_id)
            .ok_or_else(|| ViewerError::StoryNotFound(story_id.clone()))?;
        let from = story.current_item;
        let len = story.items.len();

        match from.checked_add_signed(direction.step()) {
            Some(to) if to < len => {
                debug!(%story_id, from, to, manual, "item navigation requested");
                self.autoplay.cancel();
                Ok(self.gate(GatedAction::NavigateItem {
                    story_id,
                    from,
                    to,
                    direction,
                }))
            }
            _ if direction == Direction::Next => self.try_next_story(Direction::Next),
            _ => Err(ViewerError::InvalidState(format!(
                "story {story_id} is already at its first item"
            ))),
        }
    }

    fn try_next_story(&mut self, direction: Direction) -> Result<Dispatch, ViewerError> {
        let story_id = self.idle_story()?;
        info!(%story_id, %direction, "story end requested");
        self.autoplay.cancel();
        Ok(self.gate(GatedAction::End {
            story_id,
            direction,
        }))
    }

    /// Moves straight to a neighbor story without `on_end`.
    fn try_move_story(
        &mut self,
        direction: Direction,
        origin: TransitionOrigin,
    ) -> Result<Dispatch, ViewerError> {
        self.idle_story()?;
        self.begin_transition(direction, origin)
    }

    fn try_close(&mut self) -> Result<Dispatch, ViewerError> {
        self.expect_state(SessionState::Viewing)?;
        let story_id = self
            .open_story
            .clone()
            .ok_or_else(|| ViewerError::InvalidState("no open story".into()))?;
        if let Some(superseded) = self.pending.take() {
            debug!(token = superseded.token, "pending gate superseded by close");
        }
        self.autoplay.cancel();
        self.gesture.cancel();
        self.pause_current_media();
        self.state = SessionState::Closing;
        Ok(self.gate(GatedAction::Close(story_id)))
    }

    /// Hands a continuation to the hook guarding `action` and drains the
    /// mailbox, so a hook that resumes at once commits before returning.
    fn gate(&mut self, action: GatedAction) -> Dispatch {
        let continuation = self.mailbox.issue();
        let token = continuation.token();
        match &action {
            GatedAction::Open(story_id) => self.callbacks.open(story_id, continuation),
            GatedAction::NavigateItem {
                story_id,
                direction,
                ..
            } => {
                let next_story = self
                    .store
                    .neighbor(story_id, Direction::Next)
                    .map(|story| story.id.clone());
                self.callbacks
                    .navigate_item(story_id, next_story.as_ref(), *direction, continuation);
            }
            GatedAction::End { story_id, .. } => self.callbacks.end(story_id, continuation),
            GatedAction::Close(story_id) => self.callbacks.close(story_id, continuation),
        }
        self.pending = Some(PendingGate { token, action });
        self.drain_continuations();

        if self.pending.as_ref().is_some_and(|gate| gate.token == token) {
            Dispatch::AwaitingHost
        } else {
            Dispatch::Committed
        }
    }

    fn drain_continuations(&mut self) {
        loop {
            let tokens = self.mailbox.drain();
            if tokens.is_empty() {
                break;
            }
            for token in tokens {
                match self.pending.take() {
                    Some(gate) if gate.token == token => self.resolve(gate.action),
                    other => {
                        self.pending = other;
                        debug!(token, "stale continuation ignored");
                    }
                }
            }
        }
    }

    fn resolve(&mut self, action: GatedAction) {
        let result = match action {
            GatedAction::Open(story_id) => self.finish_open(&story_id),
            GatedAction::NavigateItem {
                story_id,
                from,
                to,
                direction,
            } => self.finish_navigate_item(&story_id, from, to, direction),
            GatedAction::End {
                story_id,
                direction,
            } => self.finish_end(&story_id, direction),
            GatedAction::Close(story_id) => self.finish_close(&story_id),
        };
        if let Err(error) = result {
            debug!(%error, "gated step abandoned");
        }
    }

    fn finish_open(&mut self, story_id: &StoryId) -> Result<(), ViewerError> {
        self.expect_state(SessionState::Opening)?;
        let Some(index) = self
            .store
            .get(story_id)
            .and_then(Story::continuation_index)
        else {
            self.state = SessionState::Closed;
            return Err(ViewerError::StoryNotFound(story_id.clone()));
        };
        self.store.set_cursor(story_id, index);
        self.open_story = Some(story_id.clone());
        self.push(RenderCommand::ShowViewer {
            story_id: story_id.clone(),
        });
        self.stage_panel(story_id.clone(), PanelSlot::Viewing);
        self.stage_neighbor(story_id, Direction::Previous);
        self.stage_neighbor(story_id, Direction::Next);
        self.state = SessionState::Viewing;
        info!(%story_id, index, "story opened");
        self.activate_current();
        Ok(())
    }

    fn finish_navigate_item(
        &mut self,
        story_id: &StoryId,
        from: usize,
        to: usize,
        direction: Direction,
    ) -> Result<(), ViewerError> {
        self.expect_state(SessionState::Viewing)?;
        if self.open_story.as_ref() != Some(story_id) {
            return Err(ViewerError::InvalidState(format!(
                "story {story_id} is no longer open"
            )));
        }
        let story = self
            .store
            .get_mut(story_id)
            .ok_or_else(|| ViewerError::StoryNotFound(story_id.clone()))?;
        let len = story.items.len();
        if story.current_item != from || to >= len {
            return Err(ViewerError::ItemOutOfRange {
                story_id: story_id.clone(),
                index: to,
                len,
            });
        }
        let left = story
            .items
            .get_mut(from)
            .ok_or_else(|| ViewerError::ItemOutOfRange {
                story_id: story_id.clone(),
                index: from,
                len,
            })?;
        if direction == Direction::Next {
            left.seen_within_story = true;
        }
        let left_id = left.id.clone();
        let left_seen = left.seen_within_story;

        if direction == Direction::Next {
            self.seen.mark_item_seen(story_id, &left_id);
        }
        self.push(RenderCommand::SetItemState {
            story_id: story_id.clone(),
            index: from,
            active: false,
            seen: left_seen,
        });
        self.push(RenderCommand::PauseMedia {
            story_id: story_id.clone(),
            index: from,
        });
        self.store.set_cursor(story_id, to);
        self.activate_current();
        Ok(())
    }

    fn finish_end(&mut self, story_id: &StoryId, direction: Direction) -> Result<(), ViewerError> {
        self.expect_state(SessionState::Viewing)?;
        if self.open_story.as_ref() != Some(story_id) {
            return Err(ViewerError::InvalidState(format!(
                "story {story_id} is no longer open"
            )));
        }
        let last = self.store.get_mut(story_id).and_then(|story| {
            story.seen = true;
            let index = story.current_item;
            let item = story.items.get_mut(index)?;
            item.seen_within_story = true;
            Some((index, item.id.clone()))
        });
        if let Some((index, item_id)) = last {
            self.seen.mark_item_seen(story_id, &item_id);
            self.push(RenderCommand::SetItemState {
                story_id: story_id.clone(),
                index,
                active: false,
                seen: true,
            });
        }
        if self.seen.mark_seen(story_id) {
            self.push(RenderCommand::MarkStorySeen {
                story_id: story_id.clone(),
            });
        }
        if self.transition.panel(direction.into()).is_none() {
            info!(%story_id, %direction, "no neighbor story; closing");
            return self.try_close().map(|_| ());
        }
        self.begin_transition(direction, TransitionOrigin::Programmatic)
            .map(|_| ())
    }

    fn finish_close(&mut self, story_id: &StoryId) -> Result<(), ViewerError> {
        self.expect_state(SessionState::Closing)?;
        for released in self.transition.release_all() {
            self.push(RenderCommand::DestroyPanel {
                story_id: released,
            });
        }
        self.clear_pause();
        self.push(RenderCommand::HideViewer);
        self.state = SessionState::Closed;
        self.open_story = None;
        info!(%story_id, "viewer closed");
        Ok(())
    }

    fn begin_transition(
        &mut self,
        direction: Direction,
        origin: TransitionOrigin,
    ) -> Result<Dispatch, ViewerError> {
        let (transform, duration) = self
            .transition
            .commit(direction, origin, self.clock.now())?;
        self.autoplay.cancel();
        self.gesture.cancel();
        self.pause_current_media();
        self.push(RenderCommand::SetOffset {
            transform,
            duration_ms: duration.num_milliseconds(),
        });
        self.state = SessionState::Transitioning;
        info!(%direction, ?origin, "story transition committed");
        Ok(Dispatch::Committed)
    }

    fn complete_swap(&mut self, now: DateTime<Utc>) {
        let Some(swap) = self.transition.complete(now) else {
            return;
        };
        if let Some(discarded) = swap.discarded {
            self.push(RenderCommand::DestroyPanel {
                story_id: discarded,
            });
        }
        if let Some((demoted, slot)) = swap.demoted {
            self.push(RenderCommand::PromotePanel {
                story_id: demoted,
                slot,
            });
        }
        self.push(RenderCommand::PromotePanel {
            story_id: swap.promoted.clone(),
            slot: PanelSlot::Viewing,
        });
        let rest = self.transition.rest();
        self.push(RenderCommand::SetOffset {
            transform: rest,
            duration_ms: 0,
        });
        self.stage_neighbor(&swap.promoted, swap.direction);

        self.open_story = Some(swap.promoted.clone());
        self.state = SessionState::Viewing;
        match self
            .store
            .get(&swap.promoted)
            .and_then(Story::continuation_index)
        {
            Some(index) => {
                self.store.set_cursor(&swap.promoted, index);
                info!(story_id = %swap.promoted, index, "story transition completed");
                self.activate_current();
            }
            None => {
                warn!(story_id = %swap.promoted, "promoted story has no items; closing");
                let result = self.try_close();
                Self::absorb("close", result);
            }
        }
    }

    fn stage_neighbor(&mut self, story_id: &StoryId, direction: Direction) {
        if let Some(neighbor) = self
            .store
            .neighbor(story_id, direction)
            .map(|story| story.id.clone())
        {
            self.stage_panel(neighbor, direction.into());
        }
    }

    fn stage_panel(&mut self, story_id: StoryId, slot: PanelSlot) {
        let Some(story) = self.store.get(&story_id) else {
            return;
        };
        let active_item = if slot == PanelSlot::Viewing {
            story.current_item
        } else {
            story.continuation_index().unwrap_or(0)
        };
        let seen_items = story.seen_flags();
        match self.transition.stage(story_id.clone(), slot) {
            Ok(()) => self.push(RenderCommand::MaterializePanel {
                story_id,
                slot,
                active_item,
                seen_items,
            }),
            Err(error) => debug!(%error, "panel not staged"),
        }
    }

    /// Pointer pressed. A valid press pauses playback.
    pub fn pointer_down(&mut self, event: PointerEvent) {
        if self.state != SessionState::Viewing || self.pending.is_some() {
            debug!(state = ?self.state, "pointer down ignored");
            return;
        }
        if self.gesture.down(&event, self.metrics, &self.config) {
            self.pause();
        }
    }

    /// Pointer moved. Horizontal drags move the panel strip.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        if self.state != SessionState::Viewing {
            return;
        }
        if let Some(dx) = self.gesture.motion(&event)
            && let Some(transform) = self.transition.live_offset(dx)
        {
            self.push(RenderCommand::SetOffset {
                transform,
                duration_ms: 0,
            });
        }
    }

    /// Pointer released. Returns how the gesture was interpreted.
    pub fn pointer_up(&mut self, event: PointerEvent) -> GestureOutcome {
        if self.state != SessionState::Viewing {
            self.gesture.cancel();
            return GestureOutcome::NoOp;
        }
        let neighbors = Neighbors {
            previous: self.transition.panel(PanelSlot::Previous).is_some(),
            next: self.transition.panel(PanelSlot::Next).is_some(),
        };
        let was_long_press = self.gesture.is_long_press();
        let outcome = self
            .gesture
            .up(&event, self.metrics, &self.config, neighbors);
        if was_long_press {
            self.push(RenderCommand::SetLongPress { active: false });
        }
        debug!(?outcome, "gesture completed");

        match outcome {
            GestureOutcome::NoOp
            | GestureOutcome::PassThrough
            | GestureOutcome::ScrollCancel
            | GestureOutcome::Hold => self.resume(),
            GestureOutcome::SnapBack => {
                self.snap_back();
                self.resume();
            }
            GestureOutcome::CommitStory(direction) => {
                self.clear_pause();
                let result = self.try_move_story(direction, TransitionOrigin::Gesture);
                if Self::absorb("swipe", result) == Dispatch::Ignored {
                    self.snap_back();
                    self.resume_playback();
                }
            }
            GestureOutcome::Affordance(Direction::Previous) if self.current_item() == Some(0) => {
                self.resume();
                let result =
                    self.try_move_story(Direction::Previous, TransitionOrigin::Programmatic);
                Self::absorb("previous_affordance", result);
            }
            GestureOutcome::Tap(direction) | GestureOutcome::Affordance(direction) => {
                self.resume();
                let result = self.request_item(direction, true);
                Self::absorb("tap", result);
            }
        }
        outcome
    }

    /// Keyboard input.
    pub fn key(&mut self, key: Key) -> Dispatch {
        match key {
            Key::Escape => self.close(),
            Key::Space | Key::ArrowRight => self.next_item(true),
            Key::ArrowLeft => self.navigate_item(Direction::Previous),
        }
    }

    /// The host measured an item's media duration. Returns true when the
    /// live autoplay timer was re-armed with it.
    pub fn media_duration(&mut self, story_id: &StoryId, index: usize, seconds: f64) -> bool {
        let target = AutoplayTarget::new(story_id.clone(), index);
        self.autoplay
            .duration_known(&target, seconds, self.clock.now())
    }

    /// The host could not load an item's media. The item stays on screen
    /// without autoplay until the viewer moves on.
    pub fn media_error(&mut self, story_id: &StoryId, index: usize) -> bool {
        warn!(%story_id, index, "media failed to load");
        let target = AutoplayTarget::new(story_id.clone(), index);
        self.autoplay.media_failed(&target)
    }

    /// The viewing surface changed size.
    pub fn resize(&mut self, metrics: SurfaceMetrics) {
        self.metrics = metrics;
        self.transition.resize(metrics.width);
    }

    /// Runs all work that is due: resumed continuations, the transition
    /// swap, autoplay and long-press detection.
    pub fn tick(&mut self) {
        self.drain_continuations();
        let now = self.clock.now();

        if self.state == SessionState::Transitioning {
            self.complete_swap(now);
        }

        if self.state == SessionState::Viewing
            && !self.paused
            && self.pending.is_none()
            && let Some(target) = self.autoplay.poll(now)
        {
            if self.current_position() == Some((target.story_id.clone(), target.index)) {
                debug!(story_id = %target.story_id, index = target.index, "autoplay fired");
                let result = self.request_item(Direction::Next, false);
                Self::absorb("autoplay", result);
            } else {
                debug!(story_id = %target.story_id, index = target.index, "stale autoplay ignored");
            }
        }

        if self.state == SessionState::Viewing && self.gesture.long_press_due(now, &self.config) {
            self.push(RenderCommand::SetLongPress { active: true });
        }
    }

    fn activate_current(&mut self) {
        let Some((story_id, index)) = self.current_position() else {
            return;
        };
        let Some(item) = self
            .store
            .get(&story_id)
            .and_then(|story| story.items.get(index))
            .cloned()
        else {
            return;
        };
        let now = self.clock.now();
        self.push(RenderCommand::SetItemState {
            story_id: story_id.clone(),
            index,
            active: true,
            seen: item.seen_within_story,
        });
        if let Some(published) = item.published_at {
            self.push(RenderCommand::SetTimeLabel {
                story_id: story_id.clone(),
                label: time_ago(published, now, &self.config.labels),
            });
        }
        self.push(RenderCommand::PlayMedia {
            story_id: story_id.clone(),
            index,
        });
        self.autoplay
            .arm(AutoplayTarget::new(story_id.clone(), index), &item, now);
        self.callbacks.view(&story_id);
        self.callbacks.item_viewed(&story_id, &item.id);
    }

    fn snap_back(&mut self) {
        let rest = self.transition.rest();
        self.push(RenderCommand::SetOffset {
            transform: rest,
            duration_ms: millis(self.config.snap_back_ms).num_milliseconds(),
        });
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.autoplay.cancel();
        self.push(RenderCommand::SetPaused { paused: true });
        self.pause_current_media();
    }

    fn resume(&mut self) {
        if self.clear_pause() {
            self.resume_playback();
        }
    }

    /// Leaves the paused presentation. Returns true if it was paused.
    fn clear_pause(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.paused = false;
        self.push(RenderCommand::SetPaused { paused: false });
        true
    }

    /// Plays the current item again and restarts its timer in full.
    fn resume_playback(&mut self) {
        let Some((story_id, index)) = self.current_position() else {
            return;
        };
        let Some(item) = self
            .store
            .get(&story_id)
            .and_then(|story| story.items.get(index))
            .cloned()
        else {
            return;
        };
        self.push(RenderCommand::PlayMedia {
            story_id: story_id.clone(),
            index,
        });
        self.autoplay
            .arm(AutoplayTarget::new(story_id, index), &item, self.clock.now());
    }

    fn pause_current_media(&mut self) {
        if let Some((story_id, index)) = self.current_position() {
            self.push(RenderCommand::PauseMedia { story_id, index });
        }
    }

    fn current_position(&self) -> Option<(StoryId, usize)> {
        let story_id = self.open_story.as_ref()?;
        let story = self.store.get(story_id)?;
        Some((story_id.clone(), story.current_item))
    }

    fn idle_story(&self) -> Result<StoryId, ViewerError> {
        self.expect_state(SessionState::Viewing)?;
        if self.pending.is_some() {
            return Err(ViewerError::InvalidState("a gated step is pending".into()));
        }
        self.open_story
            .clone()
            .ok_or_else(|| ViewerError::InvalidState("no open story".into()))
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), ViewerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ViewerError::InvalidState(format!(
                "expected {expected:?}, session is {:?}",
                self.state
            )))
        }
    }

    fn push(&mut self, command: RenderCommand) {
        self.uncommitted_commands.push(command);
    }

    fn absorb(operation: &'static str, result: Result<Dispatch, ViewerError>) -> Dispatch {
        result.unwrap_or_else(|error| {
            debug!(operation, %error, "request ignored");
            Dispatch::Ignored
        })
    }
}
