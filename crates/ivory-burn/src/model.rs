//! The next-note model and its lifecycle.

use std::sync::Arc;

use ivory_core::{CorpusBuilder, GenerationConfig, NoteEvent, Song, TrainingConfig};
use ivory_core::{NUM_KEYS, SEQUENCE_LENGTH};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::backend_pool::BackendPool;
use crate::config::{core_config_error, ModelConfig};
use crate::dispatch::{DeviceNetwork, DevicePlacement};
use crate::error::{Error, Result};
use crate::generator;
use crate::network::{LayerSummary, SequenceNetworkConfig};
use crate::store::{Snapshot, SnapshotStore};
use crate::trainer::{CancelToken, EpochMetrics, TrainingHistory};

/// Lifecycle of a [`NoteModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No weights allocated.
    Uninitialized,
    /// Random weights; can predict but not generate.
    Initialized,
    /// Trained or restored from a trained snapshot.
    Trained,
}

/// Architecture and training overview.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub state: ModelState,
    pub placement: Option<DevicePlacement>,
    /// `[sequence_length, keys]`
    pub input_shape: [usize; 2],
    pub output_size: usize,
    pub layers: Vec<LayerSummary>,
    pub total_params: usize,
    pub epochs_trained: usize,
    pub last_epoch: Option<EpochMetrics>,
}

/// LSTM next-note model with explicit lifecycle and named snapshots.
///
/// `train` takes `&mut self` and generation takes `&self`, so a model cannot be
/// retrained while generations borrow it. The model is `Sync`: each
/// generation works on its own copy of the weights and its own random
/// stream, so several threads can generate from one model at once.
pub struct NoteModel {
    config: ModelConfig,
    network_config: SequenceNetworkConfig,
    network: Mutex<Option<DeviceNetwork>>,
    state: ModelState,
    history: TrainingHistory,
    store: Arc<dyn SnapshotStore>,
    rng: Mutex<StdRng>,
}

impl NoteModel {
    pub fn new(config: ModelConfig, store: Arc<dyn SnapshotStore>) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            network_config: SequenceNetworkConfig::new(),
            network: Mutex::new(None),
            state: ModelState::Uninitialized,
            history: TrainingHistory::default(),
            store,
            rng: Mutex::new(rng),
        })
    }

    /// Replaces the architecture. Only allowed before [`NoteModel::initialize`].
    pub fn with_network(mut self, network_config: SequenceNetworkConfig) -> Result<Self> {
        if self.state != ModelState::Uninitialized {
            return Err(Error::AlreadyInitialized);
        }
        network_config.validate()?;
        self.network_config = network_config;
        Ok(self)
    }

    /// Allocates randomly initialized weights.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != ModelState::Uninitialized {
            return Err(Error::AlreadyInitialized);
        }
        let pool = BackendPool::new(self.config.placement);
        debug!("Initializing sequence network on {:?}", pool.placement());
        *self.network.get_mut() = Some(DeviceNetwork::init(&self.network_config, &pool));
        self.state = ModelState::Initialized;
        Ok(())
    }

    /// Copy of the current weights. Burn tensors share storage, so this is cheap.
    fn network(&self) -> Result<DeviceNetwork> {
        self.network.lock().clone().ok_or(Error::ModelNotInitialized)
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != ModelState::Uninitialized
    }

    pub fn is_trained(&self) -> bool {
        self.state == ModelState::Trained
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn network_config(&self) -> &SequenceNetworkConfig {
        &self.network_config
    }

    /// Every epoch of every successful training run, oldest first.
    pub fn history(&self) -> &TrainingHistory {
        &self.history
    }

    /// Trains with the configured settings, overriding epochs and batch size.
    pub fn train(
        &mut self,
        songs: &[Song],
        epochs: usize,
        batch_size: usize,
        mut on_progress: impl FnMut(f32, &EpochMetrics),
    ) -> Result<TrainingHistory> {
        let config = TrainingConfig {
            epochs,
            batch_size,
            ..self.config.training.clone()
        };
        self.train_with(songs, &config, &mut on_progress, &CancelToken::new())
    }

    /// Trains on `songs` and saves the result under `config.snapshot_name`.
    ///
    /// Returns this run's metrics. Weights, state, and history change only if
    /// the whole run, including the save, succeeds.
    pub fn train_with(
        &mut self,
        songs: &[Song],
        config: &TrainingConfig,
        on_progress: &mut dyn FnMut(f32, &EpochMetrics),
        cancel: &CancelToken,
    ) -> Result<TrainingHistory> {
        let network = self.network()?;
        config.validate().map_err(core_config_error)?;
        self.store.validate_name(&config.snapshot_name)?;

        info!(
            "Training on {} song(s) for {} epoch(s)",
            songs.len(),
            config.epochs
        );

        let (trained, run) = {
            let mut rng = self.rng.lock();
            let corpus = CorpusBuilder::new()
                .with_augmentation(config.augment)
                .build(songs, &mut *rng)?;
            info!("Built corpus of {} training windows", corpus.len());
            network.fit(&corpus, config, on_progress, cancel, &mut *rng)?
        };

        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                completed_epochs: run.len(),
            });
        }

        let mut history = self.history.clone();
        history.extend(run.clone());
        let snapshot = Snapshot::new(
            &self.network_config,
            true,
            history.clone(),
            trained.to_bytes()?,
        )?;
        self.store.put(&config.snapshot_name, snapshot.encode()?)?;

        *self.network.get_mut() = Some(trained);
        self.history = history;
        self.state = ModelState::Trained;

        if let Some(last) = run.last() {
            info!(
                "Training completed: loss = {:.4}, accuracy = {:.4}; saved as {:?}",
                last.loss, last.accuracy, config.snapshot_name
            );
        }
        Ok(run)
    }

    /// Next-note distribution for one flat `[4, 88]` one-hot window.
    pub fn predict(&self, window: &[f32]) -> Result<Vec<f32>> {
        let network = self.network()?;
        predict_window(&network, window)
    }

    /// Generates `length` notes after `seed` at `temperature`, using the
    /// configured timing.
    pub fn generate(
        &self,
        seed: &[NoteEvent],
        length: usize,
        temperature: f64,
    ) -> Result<Vec<NoteEvent>> {
        let config = GenerationConfig {
            length,
            temperature,
            ..self.config.generation.clone()
        };
        // Hold the shared generator only long enough to seed this call's own.
        let mut rng = StdRng::seed_from_u64(self.rng.lock().gen());
        self.generate_with(seed, &config, &mut rng)
    }

    /// Generates with explicit settings and randomness.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        seed: &[NoteEvent],
        config: &GenerationConfig,
        rng: &mut R,
    ) -> Result<Vec<NoteEvent>> {
        if self.state != ModelState::Trained {
            return Err(Error::ModelNotTrained);
        }
        let network = self.network()?;
        let notes = generator::generate(
            |window| predict_window(&network, window),
            seed,
            config,
            rng,
        )?;
        debug!("Generated {} of {} notes", notes.len(), config.length);
        Ok(notes)
    }

    /// Saves weights, architecture, and history under `name`.
    pub fn save(&self, name: &str) -> Result<()> {
        let network = self.network()?;
        self.store.validate_name(name)?;
        let snapshot = Snapshot::new(
            &self.network_config,
            self.is_trained(),
            self.history.clone(),
            network.to_bytes()?,
        )?;
        self.store.put(name, snapshot.encode()?)?;
        info!("Saved model as {:?}", name);
        Ok(())
    }

    /// Restores the snapshot saved under `name`.
    ///
    /// Returns `Ok(false)` and leaves the model untouched when no such snapshot
    /// exists. Unreadable snapshots are errors.
    pub fn load(&mut self, name: &str) -> Result<bool> {
        let Some(bytes) = self.store.get(name)? else {
            debug!("No snapshot named {:?}", name);
            return Ok(false);
        };

        let snapshot = Snapshot::decode(&bytes)?;
        let network_config = snapshot.network_config()?;
        network_config.validate()?;
        let pool = BackendPool::new(self.config.placement);
        let network = DeviceNetwork::from_bytes(&network_config, &pool, snapshot.weights)?;

        self.network_config = network_config;
        *self.network.get_mut() = Some(network);
        self.history = snapshot.history;
        self.state = if snapshot.trained {
            ModelState::Trained
        } else {
            ModelState::Initialized
        };
        info!(
            "Loaded model {:?} ({:?}, {} epoch(s) of history)",
            name,
            self.state,
            self.history.len()
        );
        Ok(true)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub fn summary(&self) -> ModelSummary {
        let network = self.network.lock();
        let layers = network
            .as_ref()
            .map(DeviceNetwork::layers)
            .unwrap_or_default();
        ModelSummary {
            state: self.state,
            placement: network.as_ref().map(DeviceNetwork::placement),
            input_shape: [self.network_config.sequence_length, self.network_config.input_size],
            output_size: self.network_config.output_size(),
            total_params: layers.iter().map(|l| l.params).sum(),
            layers,
            epochs_trained: self.history.len(),
            last_epoch: self.history.last().cloned(),
        }
    }
}

fn predict_window(network: &DeviceNetwork, window: &[f32]) -> Result<Vec<f32>> {
    if window.len() != SEQUENCE_LENGTH * NUM_KEYS {
        return Err(ivory_core::Error::InvalidVectorLength {
            expected: SEQUENCE_LENGTH * NUM_KEYS,
            actual: window.len(),
        }
        .into());
    }
    network.predict(window, 1)
}
