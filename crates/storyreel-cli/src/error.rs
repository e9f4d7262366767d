//! Storyreel CLI — error types.

use std::path::PathBuf;

use storyreel_core::error::ViewerError;
use thiserror::Error;

/// Startup and runtime errors for the script runner.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input document could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The document that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An input document is not valid JSON or YAML for its schema.
    #[error("cannot parse {}: {message}", path.display())]
    Parse {
        /// The document that failed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The viewer engine refused to start.
    #[error("viewer error: {0}")]
    Viewer(#[from] ViewerError),

    /// Writing output failed.
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    /// An output line could not be encoded.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
