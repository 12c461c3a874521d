//! Model lifecycle and end-to-end training tests

use approx::assert_abs_diff_eq;
use ivory::model::Error as ModelError;
use ivory::prelude::*;
use ivory::{ModelState, NUM_KEYS};

use crate::helpers::tolerances::PROB_EPSILON;
use crate::helpers::*;

/// Single nine-note song, one epoch, batch size one.
#[test]
fn test_train_nine_note_song() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    model.initialize().unwrap();
    assert_eq!(model.state(), ModelState::Initialized);

    let mut progress = Vec::new();
    let run = model
        .train(&[nine_note_song()], 1, 1, |fraction, metrics| {
            progress.push((fraction, metrics.epoch))
        })
        .unwrap();

    assert!(model.is_trained());
    assert_eq!(run.len(), 1);
    assert_eq!(progress, vec![(1.0, 1)]);
    let metrics = run.last().unwrap();
    assert!(metrics.loss.is_finite());
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    // Five windows: four train, one held out.
    assert!(metrics.val_loss.is_some());
}

#[test]
fn test_prediction_is_a_distribution() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    model.initialize().unwrap();

    let probs = model.predict(&window(&["C4", "D4", "E4", "F4"])).unwrap();
    assert_eq!(probs.len(), NUM_KEYS);
    assert!(probs.iter().all(|&p| p >= 0.0));
    assert_abs_diff_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = PROB_EPSILON);
}

#[test]
fn test_untrained_model_cannot_generate() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    let seed = notes(&["C4", "E4", "G4"]);
    assert!(matches!(
        model.generate(&seed, 8, 1.0),
        Err(ModelError::ModelNotTrained)
    ));

    model.initialize().unwrap();
    assert!(matches!(
        model.generate(&seed, 8, 1.0),
        Err(ModelError::ModelNotTrained)
    ));
}

#[test]
fn test_generation_after_training() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    model.initialize().unwrap();
    model.train(&[nine_note_song()], 2, 4, |_, _| {}).unwrap();

    let seed = notes(&["C4", "D4", "E4", "F4", "G4"]);
    let generated = model.generate(&seed, 12, 1.0).unwrap();
    assert!(generated.len() <= 12);
    assert!(!generated.is_empty());
    assert_strictly_increasing(&generated, seed.last().unwrap().time());
    for note in &generated {
        assert!(note.key().is_ok());
        assert!((0.25..=0.75).contains(&note.duration()));
    }

    assert!(matches!(
        model.generate(&[], 4, 1.0),
        Err(ModelError::EmptySeed)
    ));
    assert!(matches!(
        model.generate(&seed, 4, 0.0),
        Err(ModelError::InvalidConfig(_))
    ));
}

#[test]
fn test_concurrent_generation_from_one_model() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    model.initialize().unwrap();
    model.train(&[nine_note_song()], 1, 1, |_, _| {}).unwrap();
    let seed = notes(&["C4", "D4", "E4", "F4"]);

    let model = &model;
    let seed = &seed;
    let runs: Vec<Vec<NoteEvent>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| scope.spawn(move || model.generate(seed, 8, 1.0).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for generated in &runs {
        assert!(!generated.is_empty());
        assert!(generated.len() <= 8);
        assert_strictly_increasing(generated, seed.last().unwrap().time());
    }
}

#[test]
fn test_too_short_corpus_fails_without_state_change() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    model.initialize().unwrap();

    let result = model.train(&[song("Tiny", &["C4", "D4"])], 1, 1, |_, _| {});
    assert!(matches!(
        result,
        Err(ModelError::Core(ivory::core::Error::EmptyCorpus { .. }))
    ));
    assert_eq!(model.state(), ModelState::Initialized);
    assert!(model.history().is_empty());
}

#[test]
fn test_summary_reports_architecture() {
    let mut model = test_model(Arc::new(MemoryStore::new()));
    let summary = model.summary();
    assert_eq!(summary.state, ModelState::Uninitialized);
    assert!(summary.layers.is_empty());

    model.initialize().unwrap();
    let summary = model.summary();
    assert_eq!(summary.input_shape, [4, NUM_KEYS]);
    assert_eq!(summary.output_size, NUM_KEYS);
    assert_eq!(summary.layers.len(), 5);
    assert_eq!(
        summary.total_params,
        summary.layers.iter().map(|l| l.params).sum::<usize>()
    );
}
