//! Test helpers and fixtures for Ivory integration tests
//!
//! Models built here are deliberately tiny (eight units per layer) so a
//! training run finishes in well under a second on the CPU backend.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `PROB_EPSILON` (1e-4): softmax outputs summing to one
//! - `PREDICTION_EPSILON` (1e-6): predictions before and after a snapshot round trip
//! - `TIME_EPSILON` (1e-9): note times after shifting

#![allow(dead_code)]

pub mod tolerances;

use ivory::prelude::*;
use ivory::{SequenceNetworkConfig, TrainingConfig};

/// Fixed seed so corpus shuffles and sampling repeat.
pub const TEST_SEED: u64 = 7;

/// Notes in [`nine_note_song`].
pub const NINE_NOTES: [&str; 9] = ["C4", "D4", "E4", "F4", "G4", "F4", "E4", "D4", "C4"];

pub fn small_network() -> SequenceNetworkConfig {
    SequenceNetworkConfig::new()
        .with_lstm1_units(8)
        .with_lstm2_units(8)
        .with_dense1_units(8)
        .with_dense2_units(8)
}

/// One epoch, batch size one, no augmentation.
pub fn quick_training() -> TrainingConfig {
    TrainingConfig {
        epochs: 1,
        batch_size: 1,
        augment: false,
        ..Default::default()
    }
}

pub fn test_config() -> ModelConfig {
    ModelConfig {
        seed: Some(TEST_SEED),
        training: quick_training(),
        ..Default::default()
    }
}

/// Half-second notes, back to back.
pub fn notes(pitches: &[&str]) -> Vec<NoteEvent> {
    pitches
        .iter()
        .enumerate()
        .map(|(i, p)| NoteEvent::from_name(*p, i as f64 * 0.5, 0.5).expect("valid test note"))
        .collect()
}

pub fn song(name: &str, pitches: &[&str]) -> Song {
    Song::new(name, notes(pitches))
}

pub fn nine_note_song() -> Song {
    song("Nine Notes", &NINE_NOTES)
}

pub fn test_model(store: Arc<dyn SnapshotStore>) -> NoteModel {
    NoteModel::new(test_config(), store)
        .and_then(|m| m.with_network(small_network()))
        .expect("Failed to create test model")
}

/// Initialized (untrained) studio over an in-memory store and an empty catalog.
pub fn test_studio() -> Studio {
    test_studio_with(Arc::new(MemoryStore::new()))
}

pub fn test_studio_with(store: Arc<dyn SnapshotStore>) -> Studio {
    Studio::builder()
        .config(test_config())
        .network(small_network())
        .store(store)
        .catalog(Vec::new())
        .build()
        .expect("Failed to create test studio")
}

/// Flat `[4, 88]` window for the given pitches.
pub fn window(pitches: &[&str]) -> Vec<f32> {
    pitches
        .iter()
        .flat_map(|p| ivory::one_hot(p).to_vec())
        .collect()
}

/// Asserts every onset is strictly later than the one before it.
pub fn assert_strictly_increasing(notes: &[NoteEvent], after: f64) {
    let mut previous = after;
    for note in notes {
        assert!(
            note.time() > previous,
            "note at {} does not follow {}",
            note.time(),
            previous
        );
        previous = note.time();
    }
}
