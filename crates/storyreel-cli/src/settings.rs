//! Runtime settings read from the environment.

use std::path::PathBuf;

use storyreel_core::ids::ViewerId;

use crate::error::AppError;

/// Path of the timeline document. Required.
pub const TIMELINE_VAR: &str = "STORYREEL_TIMELINE";
/// Path of the script document. Required.
pub const SCRIPT_VAR: &str = "STORYREEL_SCRIPT";
/// Path of a viewer configuration document.
pub const CONFIG_VAR: &str = "STORYREEL_CONFIG";
/// `true` to replay against the wall clock.
pub const REALTIME_VAR: &str = "STORYREEL_REALTIME";
/// Directory for persisted seen-state. In-memory when unset.
pub const DATA_DIR_VAR: &str = "STORYREEL_DATA_DIR";
/// Viewer instance id. Generated when unset.
pub const VIEWER_ID_VAR: &str = "STORYREEL_VIEWER_ID";

/// Everything the runner needs to know before it starts.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Timeline document (JSON or YAML).
    pub timeline: PathBuf,
    /// Script document (JSON or YAML).
    pub script: PathBuf,
    /// Optional viewer configuration document.
    pub config: Option<PathBuf>,
    /// Sleep until each scripted time instead of jumping to it.
    pub realtime: bool,
    /// Where seen-state is persisted across runs.
    pub data_dir: Option<PathBuf>,
    /// Scopes persisted seen-state.
    pub viewer_id: ViewerId,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            get(name)
                .map(PathBuf::from)
                .ok_or_else(|| AppError::Config(format!("{name} environment variable must be set")))
        };

        let realtime = match get(REALTIME_VAR).as_deref().map(str::trim) {
            None | Some("0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "{REALTIME_VAR} must be true or false, got {other:?}"
                )));
            }
        };

        Ok(Self {
            timeline: required(TIMELINE_VAR)?,
            script: required(SCRIPT_VAR)?,
            config: get(CONFIG_VAR).map(PathBuf::from),
            realtime,
            data_dir: get(DATA_DIR_VAR).map(PathBuf::from),
            viewer_id: get(VIEWER_ID_VAR).map_or_else(ViewerId::generate, ViewerId::new),
        })
    }
}
