//! Error types for the studio roster.

use thiserror::Error;

/// Errors surfaced by the roster core.
///
/// Config problems are always recoverable (the caller falls back to the
/// compiled-in defaults); data problems are fatal to the content view and
/// surface a retryable error state.
#[derive(Debug, Error)]
pub enum RosterError {
    /// A static configuration resource could not be loaded.
    #[error("Failed to load config resource '{resource}': {reason}")]
    ConfigLoad { resource: String, reason: String },

    /// The member or taxonomy data could not be loaded.
    #[error("Failed to load {resource} data: {reason}")]
    DataLoad { resource: String, reason: String },

    /// Both the primary and the fallback clipboard paths failed.
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    /// Filesystem failure while reading a data file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file held malformed JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;
