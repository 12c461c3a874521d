//! Snapshot persistence integration tests

use approx::assert_abs_diff_eq;
use ivory::prelude::*;
use ivory::{ModelState, DEFAULT_SNAPSHOT_NAME};

use crate::helpers::tolerances::PREDICTION_EPSILON;
use crate::helpers::*;

fn assert_same_predictions(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_abs_diff_eq!(x, y, epsilon = PREDICTION_EPSILON);
    }
}

/// Train, save, load into a fresh model: predictions must match.
#[test]
fn test_save_load_reproduces_predictions() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    let input = window(&["E4", "F4", "G4", "F4"]);

    let mut trained = test_model(store.clone());
    trained.initialize().unwrap();
    trained.train(&[nine_note_song()], 1, 1, |_, _| {}).unwrap();
    trained.save("nine").unwrap();
    let before = trained.predict(&input).unwrap();

    let mut restored = test_model(store);
    assert!(restored.load("nine").unwrap());
    assert_eq!(restored.state(), ModelState::Trained);
    assert_eq!(restored.history(), trained.history());
    assert_same_predictions(&before, &restored.predict(&input).unwrap());
}

#[test]
fn test_training_saves_under_snapshot_name() {
    let store = Arc::new(MemoryStore::new());
    let mut model = test_model(store.clone());
    model.initialize().unwrap();
    model.train(&[nine_note_song()], 1, 1, |_, _| {}).unwrap();

    assert!(model.exists(DEFAULT_SNAPSHOT_NAME));
    assert_eq!(store.names(), vec![DEFAULT_SNAPSHOT_NAME.to_string()]);
}

#[test]
fn test_missing_snapshot_is_not_an_error() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    assert!(!model.load("nothing-here").unwrap());
    assert_eq!(model.state(), ModelState::Uninitialized);
}

#[test]
fn test_untrained_snapshot_restores_initialized() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    let mut fresh = test_model(store.clone());
    fresh.initialize().unwrap();
    fresh.save("fresh").unwrap();

    let mut restored = test_model(store);
    assert!(restored.load("fresh").unwrap());
    assert_eq!(restored.state(), ModelState::Initialized);
}

#[test]
fn test_directory_store_survives_new_process_state() {
    let dir = tempfile::tempdir().unwrap();
    let input = window(&["C4", "D4", "E4", "F4"]);

    let before = {
        let store = Arc::new(DirectoryStore::new(dir.path()).unwrap());
        let mut model = test_model(store);
        model.initialize().unwrap();
        model.train(&[nine_note_song()], 1, 1, |_, _| {}).unwrap();
        model.predict(&input).unwrap()
    };
    assert!(dir
        .path()
        .join(format!("{DEFAULT_SNAPSHOT_NAME}.ivory"))
        .is_file());

    let store = Arc::new(DirectoryStore::new(dir.path()).unwrap());
    let mut model = test_model(store);
    assert!(model.load(DEFAULT_SNAPSHOT_NAME).unwrap());
    assert!(model.is_trained());
    assert_same_predictions(&before, &model.predict(&input).unwrap());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.ivory"), b"not a snapshot").unwrap();

    let store = Arc::new(DirectoryStore::new(dir.path()).unwrap());
    let mut model = test_model(store);
    assert!(matches!(
        model.load("broken"),
        Err(ivory::model::Error::Snapshot(_))
    ));
    assert_eq!(model.state(), ModelState::Uninitialized);
}
