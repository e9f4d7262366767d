//! Wiring from settings to a finished replay.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use storyreel_core::clock::{Clock, SystemClock};
use storyreel_core::config::ViewerConfig;
use storyreel_core::seen_store::SeenStore;
use storyreel_seen_store::{FileSeenStore, InMemorySeenStore};
use storyreel_viewer::application::session::NavigationSession;
use storyreel_viewer::domain::gesture::SurfaceMetrics;
use storyreel_viewer::domain::story::{Placement, Story};
use tracing::info;

use crate::documents::load_document;
use crate::error::AppError;
use crate::runner::{Pace, Replay, ScriptClock, Summary, host_callbacks};
use crate::script::Step;
use crate::settings::Settings;

/// Surface size until the script resizes it.
pub const DEFAULT_SURFACE: SurfaceMetrics = SurfaceMetrics {
    width: 375.0,
    height: 667.0,
};

/// Loads the documents named by `settings`, replays the script and writes
/// JSON lines to `out`.
///
/// # Errors
///
/// Returns an error if a document cannot be loaded, the configuration is
/// invalid, the seen-state directory cannot be created or output fails.
pub async fn run(settings: &Settings, out: impl Write) -> Result<Summary, AppError> {
    let config = match &settings.config {
        Some(path) => load_document(path)?,
        None => ViewerConfig::default(),
    };
    let stories: Vec<Story> = load_document(&settings.timeline)?;
    let steps: Vec<Step> = load_document(&settings.script)?;
    info!(stories = stories.len(), steps = steps.len(), "documents loaded");

    let seen_store: Arc<dyn SeenStore> = match &settings.data_dir {
        Some(dir) => Arc::new(FileSeenStore::open(dir)?),
        None => Arc::new(InMemorySeenStore::new()),
    };

    let (clock, pace) = if settings.realtime {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        (clock, Pace::Realtime)
    } else {
        let script_clock = Arc::new(ScriptClock::new(Utc::now()));
        let clock: Arc<dyn Clock> = script_clock.clone();
        (clock, Pace::Simulated(script_clock))
    };

    let mut session = NavigationSession::new(
        settings.viewer_id.clone(),
        config,
        DEFAULT_SURFACE,
        Arc::clone(&clock),
        Some(seen_store),
        host_callbacks(),
    )?;
    for story in stories {
        session.upsert_story(story, Placement::Append);
    }

    let mut replay = Replay::new(session, clock, pace, out);
    replay.run(&steps).await
}
