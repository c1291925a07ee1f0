//! Error types for the transport

use thiserror::Error;

/// Transport errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Audio bytes could not be fetched
    #[error("Failed to fetch audio: {0}")]
    Fetch(String),

    /// Fetched bytes could not be decoded
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Audio output rejected the request
    #[error("Audio engine error: {0}")]
    Engine(String),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
