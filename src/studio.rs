//! Studio that ties the song catalog, recordings, and the note model together.

use ivory_burn::{CancelToken, EpochMetrics, ModelSummary, NoteModel, TrainingHistory};
use ivory_core::{catalog, NoteEvent, Recording, Song, TrainingConfig};
use tracing::info;

use crate::{Result, StudioBuilder};

/// Notes of a recording used to seed its continuation.
pub const RECORDING_SEED_NOTES: usize = 8;
/// Notes generated after a recording.
pub const RECORDING_CONTINUATION: usize = 16;
/// Notes of a song used to seed its continuation.
pub const SONG_SEED_NOTES: usize = 6;
/// Notes generated after a song.
pub const SONG_CONTINUATION: usize = 12;
/// Sampling temperature for continuations.
pub const CONTINUATION_TEMPERATURE: f64 = 1.2;

/// Epochs for a full training run on the catalog.
pub const CATALOG_TRAIN_EPOCHS: usize = 30;
/// Batch size for a full training run on the catalog.
pub const CATALOG_TRAIN_BATCH: usize = 16;

const QUICK_TRAIN_EPOCHS: usize = 30;
const QUICK_TRAIN_BATCH: usize = 8;

/// Front door for training and continuing piano performances.
///
/// A `Studio` owns one [`NoteModel`] plus the song catalog it can train on.
/// Training saves the model under the configured snapshot name, and
/// [`Studio::builder`] picks that snapshot back up on the next run.
///
/// # Example
///
/// ```ignore
/// use ivory::prelude::*;
///
/// let mut studio = Studio::builder().seed(7).build()?;
/// studio.train_catalog(|fraction, m| println!("{:.0}% loss {:.3}", fraction * 100.0, m.loss))?;
///
/// let mut take = Recording::default();
/// take.push(NoteEvent::from_name("C4", 0.0, 0.5)?);
/// take.push(NoteEvent::from_name("E4", 0.5, 0.5)?);
/// let answer = studio.continue_recording(&take)?;
/// ```
pub struct Studio {
    model: NoteModel,
    catalog: Vec<Song>,
}

impl Studio {
    pub fn builder() -> StudioBuilder {
        StudioBuilder::default()
    }

    pub(crate) fn from_parts(model: NoteModel, catalog: Vec<Song>) -> Self {
        Self { model, catalog }
    }

    pub fn model(&self) -> &NoteModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut NoteModel {
        &mut self.model
    }

    pub fn catalog(&self) -> &[Song] {
        &self.catalog
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_trained()
    }

    pub fn history(&self) -> &TrainingHistory {
        self.model.history()
    }

    pub fn summary(&self) -> ModelSummary {
        self.model.summary()
    }

    /// Trains on `songs` with the configured training settings.
    pub fn train(
        &mut self,
        songs: &[Song],
        mut on_progress: impl FnMut(f32, &EpochMetrics),
    ) -> Result<TrainingHistory> {
        let config = self.model.config().training.clone();
        self.train_cancellable(songs, &config, &mut on_progress, &CancelToken::new())
    }

    /// Trains with explicit settings; `cancel` stops the run between epochs.
    pub fn train_cancellable(
        &mut self,
        songs: &[Song],
        config: &TrainingConfig,
        on_progress: &mut dyn FnMut(f32, &EpochMetrics),
        cancel: &CancelToken,
    ) -> Result<TrainingHistory> {
        Ok(self.model.train_with(songs, config, on_progress, cancel)?)
    }

    /// Trains on every catalog song, with times rescaled to each song's tempo.
    ///
    /// Runs [`CATALOG_TRAIN_EPOCHS`] epochs in batches of at most
    /// [`CATALOG_TRAIN_BATCH`]; the other training settings come from the
    /// model config.
    pub fn train_catalog(
        &mut self,
        on_progress: impl FnMut(f32, &EpochMetrics),
    ) -> Result<TrainingHistory> {
        let songs: Vec<Song> = catalog::for_training(&self.catalog)
            .iter()
            .map(catalog::normalize_for_training)
            .collect();
        info!("Training on the catalog ({} songs)", songs.len());
        Ok(self
            .model
            .train(&songs, CATALOG_TRAIN_EPOCHS, CATALOG_TRAIN_BATCH, on_progress)?)
    }

    /// Short training run on a single recording.
    pub fn quick_train(
        &mut self,
        recording: &Recording,
        on_progress: impl FnMut(f32, &EpochMetrics),
    ) -> Result<TrainingHistory> {
        let song = recording.clone().into_song();
        Ok(self
            .model
            .train(&[song], QUICK_TRAIN_EPOCHS, QUICK_TRAIN_BATCH, on_progress)?)
    }

    pub fn generate(
        &self,
        seed: &[NoteEvent],
        length: usize,
        temperature: f64,
    ) -> Result<Vec<NoteEvent>> {
        Ok(self.model.generate(seed, length, temperature)?)
    }

    /// Continues a recording from its last notes.
    ///
    /// The continuation keeps its generated spacing and is moved so that it
    /// starts after the recording's last note has ended.
    pub fn continue_recording(&self, recording: &Recording) -> Result<Vec<NoteEvent>> {
        self.continue_from(
            recording.tail(RECORDING_SEED_NOTES),
            recording.end_time(),
            RECORDING_CONTINUATION,
        )
    }

    /// Continues a catalog song the same way, from its last six notes.
    pub fn continue_song(&self, song: &Song) -> Result<Vec<NoteEvent>> {
        let notes = song.sorted_notes();
        let seed = &notes[notes.len().saturating_sub(SONG_SEED_NOTES)..];
        let end = notes.iter().map(NoteEvent::end).fold(0.0, f64::max);
        self.continue_from(seed, end, SONG_CONTINUATION)
    }

    fn continue_from(&self, seed: &[NoteEvent], end: f64, length: usize) -> Result<Vec<NoteEvent>> {
        let generated = self.generate(seed, length, CONTINUATION_TEMPERATURE)?;
        let last_seed = seed.last().map_or(0.0, NoteEvent::time);
        let offset = (end - last_seed).max(0.0);
        let aligned = generated
            .iter()
            .map(|note| note.shifted(offset))
            .collect::<ivory_core::Result<Vec<_>>>()?;
        Ok(aligned)
    }
}
