//! Error types for the learning crate.

use thiserror::Error;

/// Errors that can occur while recording learning data.
#[derive(Debug, Error)]
pub enum LearningError {
    /// Storage error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
