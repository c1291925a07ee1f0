//! Error types for the record store

use needledrop_archive::ArchiveError;
use needledrop_core::Scene;
use needledrop_playback::PlaybackError;
use thiserror::Error;

/// Store-level errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Action not allowed from the current scene
    #[error("Cannot {action} from the {from} scene")]
    InvalidTransition { from: Scene, action: &'static str },

    /// Leaving the store needs at least one selected record
    #[error("No records selected")]
    NoRecordsSelected,

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
