//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur while saving or resuming an FSM
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The checkpoint belongs to a different machine or hardware id
    #[error("Checkpoint of {found} cannot resume {expected}")]
    WrongTarget { expected: String, found: String },

    /// Checkpoint data is internally inconsistent
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),
}
