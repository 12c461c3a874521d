//! Sliding-window training corpus.
//!
//! Every song with more than [`SEQUENCE_LENGTH`] notes yields one window per
//! offset: four consecutive notes as input, the fifth as the label. Songs a
//! little longer than that are also replayed transposed a step or two up and
//! down, since melodic motifs do not depend on key. The result is shuffled so
//! training never sees songs in catalog order.

use crate::codec::{one_hot, OneHot};
use crate::error::{Error, Result};
use crate::event::{NoteEvent, Song};
use crate::pitch::NUM_KEYS;
use rand::seq::SliceRandom;
use rand::Rng;

/// Notes of context per prediction.
pub const SEQUENCE_LENGTH: usize = 4;

/// Default augmentation shifts, in semitones.
pub const TRANSPOSITIONS: [i32; 4] = [-2, -1, 1, 2];

/// Songs need this many extra notes beyond the window to be augmented.
const AUGMENT_MARGIN: usize = 2;

/// Four encoded notes and the encoded note that follows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingWindow {
    pub sequence: [OneHot; SEQUENCE_LENGTH],
    pub label: OneHot,
}

impl TrainingWindow {
    /// `notes` must hold at least `SEQUENCE_LENGTH + 1` events; the first five are used.
    fn from_notes(notes: &[NoteEvent]) -> Self {
        let mut sequence = [OneHot::Silent; SEQUENCE_LENGTH];
        for (slot, note) in sequence.iter_mut().zip(notes) {
            *slot = one_hot(note.pitch());
        }
        Self {
            sequence,
            label: one_hot(notes[SEQUENCE_LENGTH].pitch()),
        }
    }

    /// All-or-nothing: `None` if any of the five notes fails to transpose.
    fn transposed(notes: &[NoteEvent], semitones: i32) -> Option<Self> {
        let mut shifted = [OneHot::Silent; SEQUENCE_LENGTH + 1];
        for (slot, note) in shifted.iter_mut().zip(notes) {
            let pitch = note.key().ok()?.transpose(semitones)?;
            *slot = OneHot::Key(pitch);
        }
        let mut sequence = [OneHot::Silent; SEQUENCE_LENGTH];
        sequence.copy_from_slice(&shifted[..SEQUENCE_LENGTH]);
        Some(Self {
            sequence,
            label: shifted[SEQUENCE_LENGTH],
        })
    }

    /// Appends the `[SEQUENCE_LENGTH, NUM_KEYS]` input block, row-major.
    pub fn extend_sequence(&self, out: &mut Vec<f32>) {
        for step in self.sequence {
            step.extend_into(out);
        }
    }

    pub fn extend_label(&self, out: &mut Vec<f32>) {
        self.label.extend_into(out);
    }
}

/// Shuffled training windows.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    windows: Vec<TrainingWindow>,
}

impl Corpus {
    pub fn from_windows(windows: Vec<TrainingWindow>) -> Self {
        Self { windows }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[TrainingWindow] {
        &self.windows
    }

    /// Flat `[indices.len(), SEQUENCE_LENGTH, NUM_KEYS]` input buffer.
    pub fn sequences(&self, indices: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(indices.len() * SEQUENCE_LENGTH * NUM_KEYS);
        for &i in indices {
            self.windows[i].extend_sequence(&mut out);
        }
        out
    }

    /// Flat `[indices.len(), NUM_KEYS]` label buffer.
    pub fn labels(&self, indices: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(indices.len() * NUM_KEYS);
        for &i in indices {
            self.windows[i].extend_label(&mut out);
        }
        out
    }

    /// Label key index per window; `None` for silent labels.
    pub fn label_indices(&self, indices: &[usize]) -> Vec<Option<usize>> {
        indices
            .iter()
            .map(|&i| self.windows[i].label.pitch().map(|p| p.index()))
            .collect()
    }
}

/// Builds a [`Corpus`] from songs.
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    augment: bool,
    transpositions: Vec<i32>,
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self {
            augment: true,
            transpositions: TRANSPOSITIONS.to_vec(),
        }
    }
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default: true
    pub fn with_augmentation(mut self, augment: bool) -> Self {
        self.augment = augment;
        self
    }

    /// Default: [-2, -1, 1, 2]
    pub fn with_transpositions(mut self, semitones: &[i32]) -> Self {
        self.transpositions = semitones.to_vec();
        self
    }

    /// Untransposed windows of one song, in order. Empty for songs of
    /// `SEQUENCE_LENGTH` notes or fewer.
    pub fn base_windows(song: &Song) -> Vec<TrainingWindow> {
        let notes = song.sorted_notes();
        windows_of(&notes).map(TrainingWindow::from_notes).collect()
    }

    /// Builds and shuffles the corpus.
    ///
    /// Fails with [`Error::EmptyCorpus`] if no song is long enough.
    pub fn build<R: Rng + ?Sized>(&self, songs: &[Song], rng: &mut R) -> Result<Corpus> {
        let mut windows = Vec::new();

        for (song_index, song) in songs.iter().enumerate() {
            let notes = song.sorted_notes();
            if notes.len() <= SEQUENCE_LENGTH {
                tracing::debug!(
                    "Song {} ({:?}): {} notes, too short for a window",
                    song_index + 1,
                    song.name,
                    notes.len()
                );
                continue;
            }

            let before = windows.len();
            windows.extend(windows_of(&notes).map(TrainingWindow::from_notes));
            let base = windows.len() - before;

            if self.augment && notes.len() > SEQUENCE_LENGTH + AUGMENT_MARGIN {
                for &semitones in &self.transpositions {
                    windows.extend(
                        windows_of(&notes)
                            .filter_map(|chunk| TrainingWindow::transposed(chunk, semitones)),
                    );
                }
            }

            tracing::debug!(
                "Song {} ({:?}): {} windows -> {} with augmentation",
                song_index + 1,
                song.name,
                base,
                windows.len() - before
            );
        }

        if windows.is_empty() {
            return Err(Error::EmptyCorpus {
                sequence_length: SEQUENCE_LENGTH,
            });
        }

        windows.shuffle(rng);
        tracing::info!(
            "Generated {} training windows of length {}",
            windows.len(),
            SEQUENCE_LENGTH
        );

        Ok(Corpus { windows })
    }
}

/// Every run of `SEQUENCE_LENGTH + 1` consecutive notes.
fn windows_of(notes: &[NoteEvent]) -> impl Iterator<Item = &[NoteEvent]> {
    notes.windows(SEQUENCE_LENGTH + 1)
}
