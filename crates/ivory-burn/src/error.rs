//! Error types for the sequence model.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Model not initialized; call initialize() first")]
    ModelNotInitialized,

    #[error("Model not trained; train it or load a snapshot first")]
    ModelNotTrained,

    #[error("Model already initialized")]
    AlreadyInitialized,

    #[error("Generation needs at least one seed note")]
    EmptySeed,

    #[error("Generation step {step} failed: {reason}")]
    GenerationStep { step: usize, reason: String },

    #[error("Training cancelled after {completed_epochs} epoch(s)")]
    Cancelled { completed_epochs: usize },

    #[error("Note model error: {0}")]
    Core(#[from] ivory_core::Error),

    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Backend initialization failed: {0}")]
    BackendInit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Snapshot(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Snapshot(e.to_string())
    }
}

impl From<burn::record::RecorderError> for Error {
    fn from(e: burn::record::RecorderError) -> Self {
        Error::Snapshot(format!("{e:?}"))
    }
}
