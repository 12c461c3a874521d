//! Integration test modules for Ivory
//!
//! - codec: pitch/index mapping and one-hot encoding
//! - corpus: sliding windows over songs
//! - model: end-to-end training and generation
//! - persistence: snapshot stores and reload
//! - studio: the facade over catalog, recordings, and model

pub mod codec;
pub mod corpus;
pub mod model;
pub mod persistence;
pub mod studio;
