//! Typed errors for the redaction engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Only input and
//! persistence failures reach the caller; detector and flagger problems
//! degrade to "no spans" inside the pipeline.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::pipeline::RedactionResult;

/// Errors surfaced to callers of the engine.
#[derive(Debug, Error)]
pub enum RedactError {
    /// Source document could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Plain-text input was not valid UTF-8
    #[error("{} is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    /// PDF container is corrupt or uses features we cannot decode
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Output files could not be written.
    ///
    /// The in-memory result is handed back so the caller can persist it.
    #[error("failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        result: Box<RedactionResult>,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bad configuration value (mode overrides, env vars)
    #[error("config error: {0}")]
    Config(String),
}

impl From<lopdf::Error> for RedactError {
    fn from(e: lopdf::Error) -> Self {
        RedactError::Pdf(e.to_string())
    }
}

/// Errors a flagger may report. These never escape the pipeline.
#[derive(Debug, Error)]
pub enum FlaggerError {
    /// The flagger ran and failed
    #[error("flagger failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The flagger did not answer in time
    #[error("flagger timed out after {0:?}")]
    Timeout(Duration),

    /// The flagger panicked
    #[error("flagger panicked")]
    Panicked,

    /// The flagger returned something unusable
    #[error("malformed flagger output: {0}")]
    Malformed(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, RedactError>;
