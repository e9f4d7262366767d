//! Loading of timeline, script and configuration documents.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Document syntax, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.json` files.
    Json,
    /// Everything else; YAML also accepts plain JSON.
    Yaml,
}

impl Format {
    /// Picks the format for `path`.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Parses `text` in this format.
    ///
    /// # Errors
    ///
    /// Returns the parser's diagnostic when `text` does not match `T`.
    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// Reads and parses the document at `path`.
///
/// # Errors
///
/// Returns `AppError::Read` if the file cannot be read and
/// `AppError::Parse` if its contents do not match `T`.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Format::for_path(path)
        .parse(&text)
        .map_err(|message| AppError::Parse {
            path: path.to_path_buf(),
            message,
        })
}
