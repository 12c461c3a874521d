//! Centralized error type for the ivory umbrella crate.
//!
//! Wraps both subsystem errors so `?` propagates across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ivory_core::Error),

    #[error("Model: {0}")]
    Model(#[from] ivory_burn::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
