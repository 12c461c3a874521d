//! Corpus integration tests

use ivory::core::{CorpusBuilder, Error};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::helpers::*;

#[test]
fn test_nine_notes_make_five_windows() {
    let song = nine_note_song();
    assert_eq!(CorpusBuilder::base_windows(&song).len(), 5);

    let corpus = CorpusBuilder::new()
        .with_augmentation(false)
        .build(&[song], &mut StdRng::seed_from_u64(TEST_SEED))
        .unwrap();
    assert_eq!(corpus.len(), 5);
}

#[test]
fn test_augmentation_adds_transposed_windows() {
    let corpus = CorpusBuilder::new()
        .build(&[nine_note_song()], &mut StdRng::seed_from_u64(TEST_SEED))
        .unwrap();
    // Five base windows plus five for each of the four shifts.
    assert_eq!(corpus.len(), 25);
}

#[test]
fn test_short_songs_are_skipped() {
    let short = song("Short", &["C4", "D4", "E4", "F4"]);
    assert!(CorpusBuilder::base_windows(&short).is_empty());

    let result = CorpusBuilder::new().build(&[short.clone()], &mut StdRng::seed_from_u64(1));
    assert!(matches!(result, Err(Error::EmptyCorpus { sequence_length: 4 })));

    let corpus = CorpusBuilder::new()
        .with_augmentation(false)
        .build(&[short, nine_note_song()], &mut StdRng::seed_from_u64(1))
        .unwrap();
    assert_eq!(corpus.len(), 5);
}

#[test]
fn test_same_seed_same_order() {
    let songs = [nine_note_song(), song("Other", &["A4", "B4", "C5", "D5", "E5", "F5", "G5"])];
    let a = CorpusBuilder::new()
        .build(&songs, &mut StdRng::seed_from_u64(3))
        .unwrap();
    let b = CorpusBuilder::new()
        .build(&songs, &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert_eq!(a.windows(), b.windows());
}

#[test]
fn test_flattened_batches() {
    let corpus = CorpusBuilder::new()
        .with_augmentation(false)
        .build(&[nine_note_song()], &mut StdRng::seed_from_u64(TEST_SEED))
        .unwrap();
    let indices = [0, 2];
    assert_eq!(corpus.sequences(&indices).len(), 2 * 4 * ivory::NUM_KEYS);
    assert_eq!(corpus.labels(&indices).len(), 2 * ivory::NUM_KEYS);
    assert!(corpus.label_indices(&indices).iter().all(Option::is_some));
}
