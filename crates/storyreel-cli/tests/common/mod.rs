//! Shared test helpers for script runner integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use storyreel_cli::app;
use storyreel_cli::runner::Summary;
use storyreel_cli::settings::Settings;
use storyreel_core::ids::ViewerId;

/// A scratch directory holding the documents for one run.
pub struct Workspace {
    pub dir: PathBuf,
}

impl Workspace {
    /// Creates an empty scratch directory.
    pub fn create() -> Self {
        let dir = std::env::temp_dir().join(format!("storyreel-cli-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    /// Writes `contents` to `name` inside the workspace.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Settings for a simulated run of `timeline` and `script`.
    pub fn settings(&self, timeline: &Path, script: &Path) -> Settings {
        Settings {
            timeline: timeline.to_path_buf(),
            script: script.to_path_buf(),
            config: None,
            realtime: false,
            data_dir: None,
            viewer_id: ViewerId::new("home"),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

/// Runs the replay and returns the summary with every output line parsed.
pub async fn replay(settings: &Settings) -> (Summary, Vec<serde_json::Value>) {
    let mut out = Vec::new();
    let summary = app::run(settings, &mut out).await.unwrap();
    let lines = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (summary, lines)
}

/// The command lines, without the trailing summary.
pub fn commands(lines: &[serde_json::Value]) -> &[serde_json::Value] {
    &lines[..lines.len() - 1]
}

/// The first command line with the given `command` tag.
pub fn first<'a>(lines: &'a [serde_json::Value], command: &str) -> Option<&'a serde_json::Value> {
    lines.iter().find(|line| line["command"] == command)
}

/// Two stories: `a` with two images and `b` with one.
pub const TIMELINE: &str = r"
- id: a
  name: Alice
  items:
    - { id: a-0, type: image, src: a0.jpg }
    - { id: a-1, type: image, src: a1.jpg }
- id: b
  name: Bob
  items:
    - { id: b-0, type: image, src: b0.jpg }
";
