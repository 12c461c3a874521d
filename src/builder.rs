//! Builder for configuring and constructing a `Studio`.

use std::sync::Arc;

use ivory_burn::{
    DevicePlacement, MemoryStore, ModelConfig, NoteModel, SequenceNetworkConfig, SnapshotStore,
};
use ivory_core::{catalog, Song};
use tracing::info;

use crate::{Result, Studio};

/// `build()` restores the snapshot named by `config.training.snapshot_name`
/// when the store has one, and otherwise starts from fresh random weights.
///
/// # Example
///
/// ```ignore
/// use ivory::prelude::*;
///
/// let studio = Studio::builder()
///     .store(Arc::new(DirectoryStore::new("snapshots")?))
///     .seed(7)
///     .build()?;
///
/// if !studio.is_trained() {
///     // train first
/// }
/// ```
#[derive(Default)]
pub struct StudioBuilder {
    config: ModelConfig,
    store: Option<Arc<dyn SnapshotStore>>,
    network: Option<SequenceNetworkConfig>,
    catalog: Option<Vec<Song>>,
}

impl StudioBuilder {
    /// Replaces the whole model configuration, including any seed or
    /// placement set earlier.
    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: in-memory store
    pub fn store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Default: entropy-seeded
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Default: Cpu
    pub fn placement(mut self, placement: DevicePlacement) -> Self {
        self.config.placement = placement;
        self
    }

    /// Default: `SequenceNetworkConfig::new()`
    ///
    /// Ignored when a stored snapshot is restored; the snapshot carries its
    /// own architecture.
    pub fn network(mut self, network: SequenceNetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    /// Default: the built-in catalog
    pub fn catalog(mut self, songs: Vec<Song>) -> Self {
        self.catalog = Some(songs);
        self
    }

    pub fn build(self) -> Result<Studio> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn SnapshotStore>);
        let catalog = match self.catalog {
            Some(songs) => songs,
            None => catalog::builtin()?,
        };
        let snapshot_name = self.config.training.snapshot_name.clone();

        let mut model = NoteModel::new(self.config, store)?;
        if let Some(network) = self.network {
            model = model.with_network(network)?;
        }

        if model.load(&snapshot_name)? {
            info!("Restored saved model {:?}", snapshot_name);
        } else {
            model.initialize()?;
        }

        Ok(Studio::from_parts(model, catalog))
    }
}
