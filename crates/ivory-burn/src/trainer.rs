//! Mini-batch training loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use ivory_core::{argmax, Corpus, TrainingConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::{
    cross_entropy, label_tensor, sequence_tensor, to_floats, to_scalar, SequenceNetwork,
};

/// Results of one epoch. `epoch` is 1-based within its training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    /// `None` when the corpus was too small to hold out validation windows.
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
}

/// Epoch metrics accumulated across training runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    epochs: Vec<EpochMetrics>,
}

impl TrainingHistory {
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn last(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EpochMetrics> {
        self.epochs.iter()
    }

    pub fn as_slice(&self) -> &[EpochMetrics] {
        &self.epochs
    }

    pub fn push(&mut self, metrics: EpochMetrics) {
        self.epochs.push(metrics);
    }

    pub fn extend(&mut self, other: TrainingHistory) {
        self.epochs.extend(other.epochs);
    }
}

impl From<Vec<EpochMetrics>> for TrainingHistory {
    fn from(epochs: Vec<EpochMetrics>) -> Self {
        Self { epochs }
    }
}

impl<'a> IntoIterator for &'a TrainingHistory {
    type Item = &'a EpochMetrics;
    type IntoIter = std::slice::Iter<'a, EpochMetrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.epochs.iter()
    }
}

/// Cooperative stop signal, checked between epochs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Batch size for a corpus of `windows`, capped by `requested`.
///
/// ≥32 windows train in batches of 16, ≥16 in batches of 8, smaller corpora
/// in batches of half their size.
pub fn effective_batch_size(windows: usize, requested: usize) -> usize {
    let adaptive = if windows >= 32 {
        16
    } else if windows >= 16 {
        8
    } else {
        (windows / 2).max(1)
    };
    adaptive.min(requested.max(1))
}

/// Number of leading windows used for training; the tail is held out.
///
/// Corpora of one window are never split.
pub fn training_len(windows: usize, validation_split: f64) -> usize {
    if windows < 2 {
        return windows;
    }
    let train = (windows as f64 * (1.0 - validation_split)).floor() as usize;
    train.clamp(1, windows)
}

pub(crate) type ProgressFn<'a> = dyn FnMut(f32, &EpochMetrics) + 'a;

/// Trains `network` on `corpus` and returns it with the run's metrics.
///
/// The optimizer state starts fresh on every call.
pub(crate) fn fit<B, R>(
    mut network: SequenceNetwork<B>,
    device: &B::Device,
    corpus: &Corpus,
    config: &TrainingConfig,
    on_progress: &mut ProgressFn<'_>,
    cancel: &CancelToken,
    rng: &mut R,
) -> Result<(SequenceNetwork<B>, TrainingHistory)>
where
    B: AutodiffBackend,
    R: Rng + ?Sized,
{
    let total = corpus.len();
    let train_len = training_len(total, config.validation_split);
    let batch_size = effective_batch_size(total, config.batch_size);
    let validation: Vec<usize> = (train_len..total).collect();

    tracing::debug!(
        "Training on {} windows ({} held out), batch size {}",
        train_len,
        validation.len(),
        batch_size
    );

    let mut optim = AdamConfig::new().init::<B, SequenceNetwork<B>>();
    let mut history = TrainingHistory::default();
    let mut order: Vec<usize> = (0..train_len).collect();

    for epoch in 1..=config.epochs {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                completed_epochs: epoch - 1,
            });
        }

        order.shuffle(rng);
        let mut loss_sum = 0.0;
        let mut correct = 0;

        for batch in order.chunks(batch_size) {
            let inputs = sequence_tensor::<B>(&corpus.sequences(batch), batch.len(), device);
            let labels = label_tensor::<B>(&corpus.labels(batch), batch.len(), device);

            let logits = network.forward_logits(inputs);
            let loss = cross_entropy(logits.clone(), labels);

            loss_sum += to_scalar(loss.clone()) * batch.len() as f64;
            correct += count_correct(&to_floats(logits)?, &corpus.label_indices(batch));

            let grads = GradientsParams::from_grads(loss.backward(), &network);
            network = optim.step(config.learning_rate, network, grads);
        }

        let (val_loss, val_accuracy) = if validation.is_empty() {
            (None, None)
        } else {
            let (loss, accuracy) =
                evaluate(&network.valid(), device, corpus, &validation, batch_size)?;
            (Some(loss), Some(accuracy))
        };

        let metrics = EpochMetrics {
            epoch,
            loss: loss_sum / train_len as f64,
            accuracy: correct as f64 / train_len as f64,
            val_loss,
            val_accuracy,
        };

        tracing::debug!(
            "Epoch {}: loss = {:.4}, val_loss = {}, acc = {:.4}, val_acc = {}",
            epoch,
            metrics.loss,
            fmt_metric(metrics.val_loss),
            metrics.accuracy,
            fmt_metric(metrics.val_accuracy)
        );

        on_progress(epoch as f32 / config.epochs as f32, &metrics);
        history.push(metrics);
    }

    Ok((network, history))
}

/// Mean loss and accuracy over `indices` without updating weights.
pub(crate) fn evaluate<B: Backend>(
    network: &SequenceNetwork<B>,
    device: &B::Device,
    corpus: &Corpus,
    indices: &[usize],
    batch_size: usize,
) -> Result<(f64, f64)> {
    let mut loss_sum = 0.0;
    let mut correct = 0;

    for batch in indices.chunks(batch_size.max(1)) {
        let inputs = sequence_tensor::<B>(&corpus.sequences(batch), batch.len(), device);
        let labels = label_tensor::<B>(&corpus.labels(batch), batch.len(), device);
        let logits = network.forward_logits(inputs);

        loss_sum += to_scalar(cross_entropy(logits.clone(), labels)) * batch.len() as f64;
        correct += count_correct(&to_floats(logits)?, &corpus.label_indices(batch));
    }

    let n = indices.len().max(1) as f64;
    Ok((loss_sum / n, correct as f64 / n))
}

/// Rows whose highest score is the label. Silent labels never count.
fn count_correct(logits: &[f32], labels: &[Option<usize>]) -> usize {
    let width = logits.len() / labels.len().max(1);
    if width == 0 {
        return 0;
    }
    logits
        .chunks(width)
        .zip(labels)
        .filter(|(row, label)| label.is_some() && argmax(row) == **label)
        .count()
}

fn fmt_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.4}"))
}
