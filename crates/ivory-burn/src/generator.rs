//! Autoregressive note generation.

use std::collections::VecDeque;

use ivory_core::{one_hot, GenerationConfig, NoteEvent, Pitch, NUM_KEYS, SEQUENCE_LENGTH};
use rand::Rng;
use tracing::warn;

use crate::config::core_config_error;
use crate::error::{Error, Result};
use crate::sampler::{apply_temperature, sample_index};

/// Generates up to `config.length` notes continuing `seed`.
///
/// `predict` maps a flat `[4, 88]` one-hot window to a distribution over the
/// 88 keys. Seeds shorter than the window are left-padded with their first
/// note; longer seeds contribute only their last four notes. Each new note
/// starts a random gap after the previous one, so onsets strictly increase.
///
/// A failing step ends generation early; the notes produced so far are
/// returned. Only the generated notes are returned, never the seed.
pub fn generate<F, R>(
    mut predict: F,
    seed: &[NoteEvent],
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Vec<NoteEvent>>
where
    F: FnMut(&[f32]) -> Result<Vec<f32>>,
    R: Rng + ?Sized,
{
    let Some(first) = seed.first() else {
        return Err(Error::EmptySeed);
    };
    config.validate().map_err(core_config_error)?;

    let mut window: VecDeque<NoteEvent> = if seed.len() >= SEQUENCE_LENGTH {
        seed[seed.len() - SEQUENCE_LENGTH..].iter().cloned().collect()
    } else {
        std::iter::repeat(first.clone())
            .take(SEQUENCE_LENGTH - seed.len())
            .chain(seed.iter().cloned())
            .collect()
    };

    let mut generated = Vec::with_capacity(config.length);
    let mut input = Vec::with_capacity(SEQUENCE_LENGTH * NUM_KEYS);

    for step in 0..config.length {
        input.clear();
        for note in &window {
            one_hot(note.pitch()).extend_into(&mut input);
        }

        let note = match next_note(&mut predict, &input, &window, config, rng) {
            Ok(note) => note,
            Err(reason) => {
                let e = Error::GenerationStep {
                    step,
                    reason: reason.to_string(),
                };
                warn!("{}; returning {} notes", e, generated.len());
                break;
            }
        };

        window.pop_front();
        window.push_back(note.clone());
        generated.push(note);
    }

    Ok(generated)
}

fn next_note<F, R>(
    predict: &mut F,
    input: &[f32],
    window: &VecDeque<NoteEvent>,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<NoteEvent>
where
    F: FnMut(&[f32]) -> Result<Vec<f32>>,
    R: Rng + ?Sized,
{
    let distribution = predict(input)?;
    if distribution.len() != NUM_KEYS {
        return Err(ivory_core::Error::InvalidVectorLength {
            expected: NUM_KEYS,
            actual: distribution.len(),
        }
        .into());
    }

    let probs = apply_temperature(&distribution, config.temperature);
    let index = sample_index(&probs, rng.gen::<f64>())
        .ok_or_else(|| Error::Tensor("distribution has no mass".into()))?;
    let pitch = Pitch::from_index(index)?;

    let previous = window.back().map_or(0.0, NoteEvent::time);
    let time = previous + rng.gen_range(config.min_step..=config.max_step);
    let duration = rng.gen_range(config.min_step..=config.max_step);
    Ok(NoteEvent::new(pitch, time, duration)?)
}
