//! Error types for archive access.

use thiserror::Error;

/// Errors that can occur when sourcing records from an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Archive answered with a non-2xx status
    #[error("Archive returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Failed to parse archive response
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Item has no recognised audio files
    #[error("No audio files in item: {0}")]
    NoAudioFiles(String),

    /// Registry is empty
    #[error("No music providers registered")]
    NoProviders,

    /// Invalid archive URL
    #[error("Invalid archive URL: {0}")]
    InvalidUrl(String),

    /// Invalid sourcing settings
    #[error("Invalid archive configuration: {0}")]
    InvalidConfig(String),
}

impl ArchiveError {
    /// Whether the request was aborted by the per-request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ArchiveError::Request(e) if e.is_timeout())
    }
}

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;
