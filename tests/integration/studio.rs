//! Studio facade integration tests

use approx::assert_abs_diff_eq;
use ivory::prelude::*;
use ivory::{
    catalog, CancelToken, ModelState, CATALOG_TRAIN_EPOCHS, RECORDING_CONTINUATION,
    SONG_CONTINUATION,
};

use crate::helpers::tolerances::TIME_EPSILON;
use crate::helpers::*;

fn trained_studio() -> Studio {
    let mut studio = test_studio();
    studio.train(&[nine_note_song()], |_, _| {}).unwrap();
    studio
}

#[test]
fn test_builder_defaults() {
    let studio = Studio::builder()
        .seed(TEST_SEED)
        .network(small_network())
        .build()
        .unwrap();
    assert_eq!(studio.model().state(), ModelState::Initialized);
    assert!(!studio.is_trained());
    assert_eq!(studio.catalog().len(), 10);
}

#[test]
fn test_builder_restores_saved_model() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    {
        let mut studio = test_studio_with(store.clone());
        studio.train(&[nine_note_song()], |_, _| {}).unwrap();
    }

    let studio = test_studio_with(store);
    assert!(studio.is_trained());
    assert_eq!(studio.history().len(), 1);
}

#[test]
fn test_train_uses_configured_epochs() {
    let mut studio = test_studio();
    let mut calls = 0;
    let run = studio
        .train(&[nine_note_song()], |_, _| calls += 1)
        .unwrap();
    assert_eq!(run.len(), 1);
    assert_eq!(calls, 1);
    assert!(studio.is_trained());
}

#[test]
fn test_cancelled_training_leaves_model_untrained() {
    let mut studio = test_studio();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = studio.train_cancellable(
        &[nine_note_song()],
        &quick_training(),
        &mut |_: f32, _: &EpochMetrics| {},
        &cancel,
    );
    assert!(matches!(
        result,
        Err(Error::Model(ivory::model::Error::Cancelled { completed_epochs: 0 }))
    ));
    assert!(!studio.is_trained());
}

#[test]
fn test_train_catalog() {
    let songs = catalog::builtin().unwrap();
    let mut studio = Studio::builder()
        .config(test_config())
        .network(small_network())
        .catalog(songs[..2].to_vec())
        .build()
        .unwrap();

    let mut calls = 0;
    let run = studio.train_catalog(|_, _| calls += 1).unwrap();
    // Catalog runs use their own epoch count, not the configured one.
    assert_eq!(run.len(), CATALOG_TRAIN_EPOCHS);
    assert_eq!(calls, CATALOG_TRAIN_EPOCHS);
    assert!(studio.is_trained());
}

#[test]
fn test_quick_train_on_recording() {
    let mut studio = test_studio();
    let recording = Recording::new(notes(&NINE_NOTES));

    let mut last_fraction = 0.0;
    let run = studio
        .quick_train(&recording, |fraction, _| last_fraction = fraction)
        .unwrap();
    assert_eq!(run.len(), 30);
    assert_eq!(last_fraction, 1.0);
    assert!(studio.is_trained());
}

#[test]
fn test_continue_recording_starts_after_it_ends() {
    let studio = trained_studio();
    let recording = Recording::new(notes(&NINE_NOTES));
    let end = recording.end_time();

    let continuation = studio.continue_recording(&recording).unwrap();
    assert!(!continuation.is_empty());
    assert!(continuation.len() <= RECORDING_CONTINUATION);
    assert!(continuation[0].time() > end - TIME_EPSILON);
    assert_strictly_increasing(&continuation, end - TIME_EPSILON);
}

#[test]
fn test_continue_recording_keeps_generated_spacing() {
    // Two studios with the same seed and weights draw the same notes.
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    {
        let mut studio = test_studio_with(store.clone());
        studio.train(&[nine_note_song()], |_, _| {}).unwrap();
    }
    let recording = Recording::new(notes(&NINE_NOTES));
    let seed = recording.tail(ivory::RECORDING_SEED_NOTES);

    let raw = test_studio_with(store.clone())
        .generate(seed, RECORDING_CONTINUATION, ivory::CONTINUATION_TEMPERATURE)
        .unwrap();
    let aligned = test_studio_with(store)
        .continue_recording(&recording)
        .unwrap();

    assert_eq!(raw.len(), aligned.len());
    let offset = recording.end_time() - seed.last().unwrap().time();
    for (r, a) in raw.iter().zip(&aligned) {
        assert_eq!(r.pitch(), a.pitch());
        assert_abs_diff_eq!(a.time() - r.time(), offset, epsilon = TIME_EPSILON);
        assert_abs_diff_eq!(a.duration(), r.duration(), epsilon = TIME_EPSILON);
    }
}

#[test]
fn test_continue_song() {
    let studio = trained_studio();
    let song = nine_note_song();
    let continuation = studio.continue_song(&song).unwrap();
    assert!(continuation.len() <= SONG_CONTINUATION);
    assert_strictly_increasing(&continuation, 4.5 - TIME_EPSILON);
}

#[test]
fn test_continue_requires_training_and_notes() {
    let studio = test_studio();
    assert!(matches!(
        studio.continue_recording(&Recording::new(notes(&["C4"]))),
        Err(Error::Model(ivory::model::Error::ModelNotTrained))
    ));

    let studio = trained_studio();
    assert!(matches!(
        studio.continue_recording(&Recording::default()),
        Err(Error::Model(ivory::model::Error::EmptySeed))
    ));
}

#[test]
fn test_summary_after_training() {
    let studio = trained_studio();
    let summary = studio.summary();
    assert_eq!(summary.state, ModelState::Trained);
    assert_eq!(summary.epochs_trained, 1);
    assert!(summary.last_epoch.is_some());
}

#[test]
fn test_continue_recording_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recording.json");
    let fixture: Vec<serde_json::Value> = NINE_NOTES
        .iter()
        .enumerate()
        .map(|(i, p)| serde_json::json!({ "pitch": p, "time": i as f64 * 0.5, "duration": 0.5 }))
        .collect();
    std::fs::write(&path, serde_json::to_string(&fixture).unwrap()).unwrap();

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.len(), 9);
    assert_abs_diff_eq!(recording.end_time(), 4.5, epsilon = TIME_EPSILON);

    let continuation = trained_studio().continue_recording(&recording).unwrap();
    assert_strictly_increasing(&continuation, recording.end_time() - TIME_EPSILON);
}
