//! Error types for the sprite archive and cache.

use crate::art::PrepareError;

/// Errors that can occur while fetching, reading or rendering sprites.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Archive download failed with status {status}: {url}")]
    Status {
        /// HTTP status code returned by the server
        status: u16,
        url: String,
    },

    #[error("Network error: {message} (after {attempts} attempts)")]
    NetworkError {
        /// Human-readable network error message
        message: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid sprite archive: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("Sprite archive has no entry '{0}'")]
    MissingEntry(String),

    #[error("Invalid form database: {0}")]
    DatabaseError(#[from] serde_json::Error),

    #[error("Form database not found. Run `pokesprite generate` first.")]
    DatabaseMissing,

    #[error("Unknown form '{0}'. Use `pokesprite list` to see all forms.")]
    UnknownForm(String),

    #[error(transparent)]
    Prepare(#[from] PrepareError),
}
