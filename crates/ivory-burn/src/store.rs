//! Named snapshot storage.
//!
//! A snapshot bundles the network architecture, the training history, and the
//! recorded weights. Stores only move opaque bytes around; encoding lives in
//! [`Snapshot`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::SequenceNetworkConfig;
use crate::trainer::TrainingHistory;

const SNAPSHOT_FORMAT: u32 = 1;
const SNAPSHOT_EXTENSION: &str = "ivory";

/// Byte storage keyed by snapshot name.
pub trait SnapshotStore: Send + Sync {
    fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()>;

    /// `Ok(None)` when nothing is stored under `name`.
    fn get(&self, name: &str) -> Result<Option<Vec<u8>>>;

    fn contains(&self, name: &str) -> bool;

    /// Returns whether anything was removed.
    fn remove(&self, name: &str) -> Result<bool>;

    /// Fails if `put` would reject `name`. Every name is accepted by default.
    fn validate_name(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl SnapshotStore for MemoryStore {
    fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        self.entries.write().insert(name.to_string(), bytes);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(name).cloned())
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        Ok(self.entries.write().remove(name).is_some())
    }
}

/// One `<name>.ivory` file per snapshot under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates `root` if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !name.starts_with('.');
        if !valid {
            return Err(Error::InvalidConfig(format!(
                "snapshot name {name:?} must be non-empty ASCII letters, digits, '-', '_' or '.'"
            )));
        }
        Ok(self.root.join(format!("{name}.{SNAPSHOT_EXTENSION}")))
    }
}

impl SnapshotStore for DirectoryStore {
    fn put(&self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(name)?;
        // Atomic replace: write a sibling file, then rename over the target.
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|p| p.is_file())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        self.path_for(name).map(drop)
    }
}

/// Everything needed to rebuild a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    format: u32,
    /// JSON form of [`SequenceNetworkConfig`].
    network: String,
    pub trained: bool,
    pub history: TrainingHistory,
    pub weights: Vec<u8>,
}

impl Snapshot {
    pub fn new(
        network: &SequenceNetworkConfig,
        trained: bool,
        history: TrainingHistory,
        weights: Vec<u8>,
    ) -> Result<Self> {
        Ok(Self {
            format: SNAPSHOT_FORMAT,
            network: serde_json::to_string(network)?,
            trained,
            history,
            weights,
        })
    }

    pub fn network_config(&self) -> Result<SequenceNetworkConfig> {
        Ok(serde_json::from_str(&self.network)?)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(Error::Snapshot(format!(
                "unsupported snapshot format {} (expected {})",
                snapshot.format, SNAPSHOT_FORMAT
            )));
        }
        Ok(snapshot)
    }
}
