//! Standard MIDI File export.
//!
//! Note events are quantized to sixteenth-note steps at a given tempo and
//! written as a single-track SMF with `midly`.

use crate::error::{Error, Result};
use crate::event::NoteEvent;
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use std::path::Path;
use tracing::debug;

/// Ticks per quarter note in exported files.
pub const TICKS_PER_QUARTER: u16 = 220;

/// Quantization grid: four steps per quarter note.
pub const STEPS_PER_QUARTER: u32 = 4;

const TICKS_PER_STEP: u32 = TICKS_PER_QUARTER as u32 / STEPS_PER_QUARTER;

const VELOCITY: u8 = 80;

/// Last step whose tick still fits a 28-bit delta.
pub const MAX_STEP: u32 = 0x0FFF_FFFF / TICKS_PER_STEP;

/// A note snapped to the step grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizedNote {
    /// MIDI note number (A0 = 21).
    pub key: u8,
    pub start_step: u32,
    /// Exclusive; always greater than `start_step`.
    pub end_step: u32,
}

/// Snaps note starts and ends to the step grid at `qpm` quarter notes per minute.
///
/// Fails on a non-positive tempo, on the first note whose pitch is not a piano
/// key, and on notes ending past [`MAX_STEP`].
pub fn quantize(notes: &[NoteEvent], qpm: f64) -> Result<Vec<QuantizedNote>> {
    if !(qpm.is_finite() && qpm > 0.0) {
        return Err(Error::InvalidConfig(format!(
            "tempo must be a positive number of quarter notes per minute, got {qpm}"
        )));
    }
    let steps_per_second = qpm / 60.0 * STEPS_PER_QUARTER as f64;
    notes
        .iter()
        .map(|n| {
            let key = n.key()?.midi();
            let start = (n.time() * steps_per_second).round().max(0.0);
            let end = (n.end() * steps_per_second).round().max(start + 1.0);
            if end > MAX_STEP as f64 {
                return Err(Error::InvalidNoteEvent(format!(
                    "{} at {}s ends past the last exportable step at {} qpm",
                    n.pitch(),
                    n.time(),
                    qpm
                )));
            }
            let (start_step, end_step) = (start as u32, end as u32);
            Ok(QuantizedNote {
                key,
                start_step,
                end_step,
            })
        })
        .collect()
}

/// Length of a quantized sequence in steps, at least 1.
pub fn total_steps(notes: &[QuantizedNote]) -> u32 {
    notes.iter().map(|n| n.end_step).max().unwrap_or(0).max(1)
}

/// Builds an in-memory single-track SMF.
pub fn to_smf(notes: &[NoteEvent], qpm: f64) -> Result<Smf<'static>> {
    let quantized = quantize(notes, qpm)?;

    // (tick, is_note_on, key); note-offs sort before note-ons on the same tick.
    let mut events: Vec<(u32, bool, u8)> = quantized
        .iter()
        .flat_map(|n| {
            [
                (n.start_step * TICKS_PER_STEP, true, n.key),
                (n.end_step * TICKS_PER_STEP, false, n.key),
            ]
        })
        .collect();
    events.sort_by_key(|&(tick, on, key)| (tick, on, key));

    let tempo = (60_000_000.0 / qpm).round().clamp(1.0, 0xFF_FFFF as f64) as u32;
    let mut track: Track<'static> = Vec::with_capacity(events.len() + 2);
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
    });

    let mut last_tick = 0;
    for (tick, on, key) in events {
        let message = if on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(VELOCITY),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    debug!(
        "Built MIDI track: {} notes, {} steps at {} qpm",
        quantized.len(),
        total_steps(&quantized),
        qpm
    );

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(track);
    Ok(smf)
}

/// Encodes `notes` as SMF bytes.
pub fn to_smf_bytes(notes: &[NoteEvent], qpm: f64) -> Result<Vec<u8>> {
    let smf = to_smf(notes, qpm)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

pub fn write_smf(notes: &[NoteEvent], qpm: f64, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_smf_bytes(notes, qpm)?)?;
    Ok(())
}
