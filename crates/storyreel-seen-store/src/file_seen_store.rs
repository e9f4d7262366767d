//! File-backed implementation of the `SeenStore` trait.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use storyreel_core::error::ViewerError;
use storyreel_core::seen_store::SeenStore;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling file that is synced and then renamed
/// over the target, so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileSeenStore {
    dir: PathBuf,
}

impl FileSeenStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ViewerError::Persistence` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ViewerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ViewerError::Persistence(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    /// Returns the directory this store writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ViewerError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(ViewerError::Persistence(format!(
                "invalid storage key: {key:?}"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SeenStore for FileSeenStore {
    fn read(&self, key: &str) -> Result<Option<String>, ViewerError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ViewerError::Persistence(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, key: &str, document: &str) -> Result<(), ViewerError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let result = (|| -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(document.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        })();
        result.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "seen-state write failed");
            ViewerError::Persistence(format!("cannot write {}: {e}", path.display()))
        })
    }
}
