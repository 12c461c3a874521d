//! # Ivory - Piano Next-Note Prediction
//!
//! Learns short-range melodic patterns from piano songs and continues a
//! performance one note at a time.
//!
//! ## Architecture
//!
//! Ivory is an umbrella crate that coordinates:
//! - **ivory-core** - Note data model (pitch codec, songs, catalog, training corpus, MIDI export)
//! - **ivory-burn** - LSTM sequence model on Burn (training, sampling, snapshots)
//!
//! ## Quick Start
//!
//! ```ignore
//! use ivory::prelude::*;
//!
//! // Restores the saved model if the store has one
//! let mut studio = Studio::builder()
//!     .store(Arc::new(DirectoryStore::new("snapshots")?))
//!     .build()?;
//!
//! if !studio.is_trained() {
//!     studio.train_catalog(|_, m| println!("epoch {} loss {:.3}", m.epoch, m.loss))?;
//! }
//!
//! let recording = Recording::load("recording.json")?;
//! let continuation = studio.continue_recording(&recording)?;
//! ivory::core::midi::write_smf(&continuation, 120.0, "continuation.mid")?;
//! ```

/// Re-export of ivory-core for direct access
pub use ivory_core as core;

/// Re-export of ivory-burn for direct access
pub use ivory_burn as model;

// Note data model
pub use ivory_core::{
    catalog, midi, one_hot, GenerationConfig, NoteEvent, Pitch, Recording, Song, SongMetadata,
    TrainingConfig, DEFAULT_SNAPSHOT_NAME, NUM_KEYS, SEQUENCE_LENGTH,
};

// Sequence model
pub use ivory_burn::{
    CancelToken, DevicePlacement, DirectoryStore, EpochMetrics, MemoryStore, ModelConfig,
    ModelState, ModelSummary, NoteModel, SequenceNetworkConfig, SnapshotStore, TrainingHistory,
};

mod error;
pub use error::{Error, Result};

mod builder;
mod studio;

pub use builder::StudioBuilder;
pub use studio::{
    Studio, CATALOG_TRAIN_BATCH, CATALOG_TRAIN_EPOCHS, CONTINUATION_TEMPERATURE,
    RECORDING_CONTINUATION, RECORDING_SEED_NOTES, SONG_CONTINUATION, SONG_SEED_NOTES,
};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Studio, StudioBuilder};

    pub use crate::{Error, Result};

    pub use crate::{
        DirectoryStore, EpochMetrics, MemoryStore, ModelConfig, NoteEvent, NoteModel, Recording,
        SnapshotStore, Song,
    };

    pub use std::sync::Arc;
}
