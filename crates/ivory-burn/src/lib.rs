//! Burn sequence model for Ivory.
//!
//! A two-layer LSTM reads four one-hot notes and predicts a distribution over
//! the next of 88 piano keys. [`NoteModel`] owns the network, trains it with
//! Adam on a [`ivory_core::Corpus`], samples new notes at a temperature, and
//! persists named snapshots through a [`SnapshotStore`].
//!
//! Runs on NdArray (CPU) by default; wgpu (GPU) placement is opt-in and falls
//! back to CPU when no adapter is found.
//!
//! ```rust,ignore
//! let mut model = NoteModel::new(ModelConfig::default(), Arc::new(MemoryStore::new()))?;
//! model.initialize()?;
//! model.train(&ivory_core::catalog::builtin()?, 50, 32, |fraction, metrics| {
//!     println!("{:.0}% loss {:.3}", fraction * 100.0, metrics.loss);
//! })?;
//! let continuation = model.generate(&seed, 16, 1.2)?;
//! ```

#![recursion_limit = "256"]

mod backend_pool;
mod dispatch;

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::ModelConfig;

pub mod network;
pub use network::{LayerSummary, SequenceNetwork, SequenceNetworkConfig};

mod trainer;
pub use trainer::{effective_batch_size, training_len, CancelToken, EpochMetrics, TrainingHistory};

pub mod sampler;

pub mod generator;

mod store;
pub use store::{DirectoryStore, MemoryStore, SnapshotStore};

mod model;
pub use model::{ModelState, ModelSummary, NoteModel};

pub use dispatch::DevicePlacement;
