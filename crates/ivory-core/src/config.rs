//! Training and generation settings.
//!
//! Every field has a default, so partial documents deserialize.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Snapshot name used when none is configured.
pub const DEFAULT_SNAPSHOT_NAME: &str = "piano-neural-network";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    /// Upper bound; the trainer may pick a smaller batch for small corpora.
    pub batch_size: usize,
    /// Fraction of windows held out from the tail of the shuffled corpus.
    pub validation_split: f64,
    pub learning_rate: f64,
    /// Name the trained weights are saved under.
    pub snapshot_name: String,
    /// Add transposed copies of longer songs.
    pub augment: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            validation_split: 0.15,
            learning_rate: 0.001,
            snapshot_name: DEFAULT_SNAPSHOT_NAME.to_string(),
            augment: true,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(Error::InvalidConfig(format!(
                "validation_split {} out of range [0, 1)",
                self.validation_split
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning_rate {} must be positive",
                self.learning_rate
            )));
        }
        if self.snapshot_name.trim().is_empty() {
            return Err(Error::InvalidConfig("snapshot_name is empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Notes to generate.
    pub length: usize,
    pub temperature: f64,
    /// Bounds of the uniform gap between generated onsets, in seconds.
    /// Durations are drawn from the same range.
    pub min_step: f64,
    pub max_step: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            length: 32,
            temperature: 1.0,
            min_step: 0.25,
            max_step: 0.75,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<()> {
        validate_temperature(self.temperature)?;
        if !(self.min_step.is_finite() && self.min_step > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_step {} must be positive",
                self.min_step
            )));
        }
        if !(self.max_step.is_finite() && self.max_step >= self.min_step) {
            return Err(Error::InvalidConfig(format!(
                "max_step {} must be >= min_step {}",
                self.max_step, self.min_step
            )));
        }
        Ok(())
    }
}

/// Temperatures must be finite and strictly positive.
pub fn validate_temperature(temperature: f64) -> Result<()> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "temperature {temperature} must be finite and positive"
        )))
    }
}
