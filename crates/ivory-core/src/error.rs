//! Error types for the note model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid pitch format: {0:?}")]
    InvalidPitchFormat(String),

    #[error("Key index {0} out of range (0-87)")]
    IndexOutOfRange(usize),

    #[error("Expected a vector of {expected} values, got {actual}")]
    InvalidVectorLength { expected: usize, actual: usize },

    #[error("No training windows generated; every song needs more than {sequence_length} notes")]
    EmptyCorpus { sequence_length: usize },

    #[error("Invalid note event: {0}")]
    InvalidNoteEvent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
