//! Replays a script against a navigation session.
//!
//! Between two scripted steps the runner ticks the session at every
//! deadline it reports, so autoplay, transition swaps and long presses fire
//! at the times they would with a live host.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyreel_core::clock::{Clock, millis};
use storyreel_core::ids::{Direction, StoryId, ViewerId};
use storyreel_viewer::application::session::{NavigationSession, SessionState};
use storyreel_viewer::domain::callbacks::SessionCallbacks;
use storyreel_viewer::domain::gesture::SurfaceMetrics;
use storyreel_viewer::domain::render::RenderCommand;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::script::{Action, Step, ordered};

/// Upper bound on ticks between two steps, so a session that keeps
/// reporting the same deadline cannot stall the replay.
const MAX_TICKS_PER_STRETCH: usize = 10_000;

/// A clock the runner moves by hand.
#[derive(Debug)]
pub struct ScriptClock(Mutex<DateTime<Utc>>);

impl ScriptClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    /// Moves the clock to `instant`. The clock never goes backwards.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        if instant > *now {
            *now = instant;
        }
    }
}

impl Clock for ScriptClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How scripted time relates to wall time.
#[derive(Debug, Clone)]
pub enum Pace {
    /// Jump the script clock straight to each step and deadline.
    Simulated(Arc<ScriptClock>),
    /// Sleep until each step and deadline on the session's own clock.
    Realtime,
}

/// Hooks that log each host decision and allow it at once.
#[must_use]
pub fn host_callbacks() -> SessionCallbacks {
    SessionCallbacks::new()
        .on_open(|story_id, continuation| {
            info!(%story_id, "host allowed open");
            continuation.resume();
        })
        .on_end(|story_id, continuation| {
            info!(%story_id, "host allowed story end");
            continuation.resume();
        })
        .on_close(|story_id, continuation| {
            info!(%story_id, "host allowed close");
            continuation.resume();
        })
        .on_view(|story_id| debug!(%story_id, "story viewed"))
        .on_item_viewed(|story_id, item_id| info!(%story_id, %item_id, "item viewed"))
}

#[derive(Serialize)]
struct CommandLine<'a> {
    at_ms: i64,
    #[serde(flatten)]
    command: &'a RenderCommand,
}

/// State of the session when the replay finished.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// The viewer instance.
    pub viewer_id: ViewerId,
    /// Final lifecycle state.
    pub state: SessionState,
    /// Story still open, if any.
    pub open_story: Option<StoryId>,
    /// Story-level seen map.
    pub seen: BTreeMap<StoryId, bool>,
    /// Number of render commands written.
    pub commands: usize,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a Summary,
}

/// Drives one session through a script, writing JSON lines to `out`.
pub struct Replay<W> {
    session: NavigationSession,
    clock: Arc<dyn Clock>,
    pace: Pace,
    started_at: DateTime<Utc>,
    out: W,
    emitted: usize,
}

impl<W: Write> Replay<W> {
    /// Prepares a replay. Scripted offsets count from `clock.now()`.
    #[must_use]
    pub fn new(session: NavigationSession, clock: Arc<dyn Clock>, pace: Pace, out: W) -> Self {
        let started_at = clock.now();
        Self {
            session,
            clock,
            pace,
            started_at,
            out,
            emitted: 0,
        }
    }

    /// The session being driven.
    #[must_use]
    pub fn session(&self) -> &NavigationSession {
        &self.session
    }

    /// Returns the output sink.
    #[must_use]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Applies every step in time order, then lets the session run until it
    /// reports no further deadline. Writes a summary line last.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Output` or `AppError::Encode` if a line cannot be
    /// written.
    pub async fn run(&mut self, steps: &[Step]) -> Result<Summary, AppError> {
        for step in ordered(steps) {
            let at = self.started_at + millis(step.at_ms);
            self.run_until(Some(at)).await?;
            self.advance_to(at).await;
            self.apply(&step.action, at);
            self.flush()?;
        }
        self.run_until(None).await?;

        let summary = Summary {
            viewer_id: self.session.viewer_id().clone(),
            state: self.session.state(),
            open_story: self.session.open_story().cloned(),
            seen: self.session.seen().stories().clone(),
            commands: self.emitted,
        };
        serde_json::to_writer(&mut self.out, &SummaryLine { summary: &summary })?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        info!(commands = summary.commands, state = ?summary.state, "replay finished");
        Ok(summary)
    }

    /// Ticks the session at each deadline up to and including `until`, or
    /// until it has none left when `until` is `None`.
    async fn run_until(&mut self, until: Option<DateTime<Utc>>) -> Result<(), AppError> {
        let mut ticks = 0;
        while let Some(deadline) = self.session.next_deadline()
            && until.is_none_or(|until| deadline <= until)
        {
            if ticks == MAX_TICKS_PER_STRETCH {
                warn!(%deadline, "session keeps reporting deadlines; moving on");
                break;
            }
            ticks += 1;
            self.advance_to(deadline).await;
            self.session.tick();
            self.flush()?;
        }
        Ok(())
    }

    async fn advance_to(&self, instant: DateTime<Utc>) {
        match &self.pace {
            Pace::Simulated(clock) => clock.set(instant),
            Pace::Realtime => {
                let wait = (instant - self.clock.now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;
            }
        }
    }

    fn apply(&mut self, action: &Action, at: DateTime<Utc>) {
        let session = &mut self.session;
        let dispatch = match action {
            Action::Open { story_id } => Some(session.open(story_id)),
            Action::Close => Some(session.close()),
            Action::NextItem => Some(session.next_item(true)),
            Action::PreviousItem => Some(session.navigate_item(Direction::Previous)),
            Action::NextStory { direction } => Some(session.next_story(*direction)),
            Action::Key { key } => Some(session.key(*key)),
            Action::PointerDown(pointer) => {
                session.pointer_down(pointer.event(at));
                None
            }
            Action::PointerMove(pointer) => {
                session.pointer_move(pointer.event(at));
                None
            }
            Action::PointerUp(pointer) => {
                let outcome = session.pointer_up(pointer.event(at));
                debug!(?outcome, "gesture interpreted");
                None
            }
            Action::MediaDuration {
                story_id,
                index,
                seconds,
            } => {
                let rearmed = session.media_duration(story_id, *index, *seconds);
                debug!(%story_id, index, rearmed, "media duration reported");
                None
            }
            Action::MediaError { story_id, index } => {
                let stopped = session.media_error(story_id, *index);
                debug!(%story_id, index, stopped, "media error reported");
                None
            }
            Action::Resize { width, height } => {
                session.resize(SurfaceMetrics::new(*width, *height));
                None
            }
        };
        info!(action = action.name(), ?dispatch, "step applied");
    }

    fn flush(&mut self) -> Result<(), AppError> {
        let at_ms = (self.clock.now() - self.started_at).num_milliseconds();
        for command in self.session.take_render_commands() {
            serde_json::to_writer(
                &mut self.out,
                &CommandLine {
                    at_ms,
                    command: &command,
                },
            )?;
            self.out.write_all(b"\n")?;
            self.emitted += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_script_clock_never_goes_backwards() {
        // Arrange
        let clock = ScriptClock::new(t0());

        // Act
        clock.set(t0() + TimeDelta::seconds(5));
        clock.set(t0() + TimeDelta::seconds(1));

        // Assert
        assert_eq!(clock.now(), t0() + TimeDelta::seconds(5));
    }

    #[test]
    fn test_command_line_flattens_the_command() {
        let command = RenderCommand::SetPaused { paused: true };
        let line = serde_json::to_string(&CommandLine {
            at_ms: 1200,
            command: &command,
        })
        .unwrap();
        assert_eq!(line, r#"{"at_ms":1200,"command":"set_paused","paused":true}"#);
    }
}
