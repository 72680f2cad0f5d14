//! Error types shared by the store, the storage layer and the API

use std::path::PathBuf;
use thiserror::Error;

/// Rejected user input or a persisted record that breaks a timer invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name and duration are required")]
    EmptyName,
    #[error("Duration must be a positive whole number of seconds, got `{0}`")]
    InvalidDuration(String),
    #[error("Remaining time {remaining}s exceeds duration {duration}s")]
    RemainingExceedsDuration { remaining: u32, duration: u32 },
    #[error("Completed timer still has {0}s remaining")]
    CompletedWithTimeLeft(u32),
    #[error("Timer is marked running but has no time left")]
    RunningWithoutTimeLeft,
}

/// Failures of the key-value storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access storage key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Storage key `{key}` does not hold valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode value for storage key `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error for timer and history operations
#[derive(Debug, Error)]
pub enum TimerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No history to export")]
    EmptyHistory,
    #[error("Failed to write export file {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Share command failed: {0}")]
    Share(String),
    #[error("Failed to lock {0} state")]
    Poisoned(&'static str),
}

impl TimerError {
    /// Whether the error is a user-facing notice rather than an internal failure
    pub fn is_user_facing(&self) -> bool {
        matches!(self, TimerError::Validation(_) | TimerError::EmptyHistory)
    }
}
