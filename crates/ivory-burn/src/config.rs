//! Model configuration, loadable from TOML.
//!
//! ```toml
//! seed = 7
//! placement = "cpu"
//!
//! [training]
//! epochs = 20
//! batch_size = 16
//!
//! [generation]
//! length = 16
//! temperature = 1.2
//! ```
//!
//! Every key is optional.

use std::path::Path;

use ivory_core::{GenerationConfig, TrainingConfig};
use serde::{Deserialize, Serialize};

use crate::dispatch::DevicePlacement;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Seeds corpus shuffling and sampling. Entropy-seeded when unset.
    pub seed: Option<u64>,
    /// Default: Cpu
    pub placement: DevicePlacement,
    pub training: TrainingConfig,
    pub generation: GenerationConfig,
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        self.training.validate().map_err(core_config_error)?;
        self.generation.validate().map_err(core_config_error)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ModelConfig =
            toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Lifts core validation failures into this crate's `InvalidConfig`.
pub(crate) fn core_config_error(e: ivory_core::Error) -> Error {
    match e {
        ivory_core::Error::InvalidConfig(msg) => Error::InvalidConfig(msg),
        other => Error::Core(other),
    }
}
