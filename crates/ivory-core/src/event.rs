//! Note events and songs.
//!
//! The JSON shape matches what the piano front end records and exports:
//!
//! ```json
//! { "id": "ode_to_joy", "name": "Ode to Joy", "composer": "Ludwig van Beethoven",
//!   "tempo": 120, "notes": [{ "pitch": "E4", "time": 0.0, "duration": 0.5 }] }
//! ```

use crate::error::{Error, Result};
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single played key, timed in seconds.
///
/// The pitch is kept as recorded so malformed names survive until the bulk
/// encoder, which turns them into silent vectors. Timing is checked on every
/// construction path, deserialization included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNoteEvent")]
pub struct NoteEvent {
    pitch: String,
    time: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct RawNoteEvent {
    pitch: String,
    time: f64,
    duration: f64,
}

impl TryFrom<RawNoteEvent> for NoteEvent {
    type Error = Error;

    fn try_from(raw: RawNoteEvent) -> Result<Self> {
        Self::from_name(raw.pitch, raw.time, raw.duration)
    }
}

impl NoteEvent {
    pub fn new(pitch: Pitch, time: f64, duration: f64) -> Result<Self> {
        Self::from_name(pitch.to_string(), time, duration)
    }

    /// Validates timing only; the pitch text is checked lazily by [`NoteEvent::key`].
    pub fn from_name(pitch: impl Into<String>, time: f64, duration: f64) -> Result<Self> {
        let event = Self {
            pitch: pitch.into(),
            time,
            duration,
        };
        if !event.is_well_formed() {
            return Err(Error::InvalidNoteEvent(format!(
                "{} at {}s for {}s (time must be >= 0, duration > 0)",
                event.pitch, time, duration
            )));
        }
        Ok(event)
    }

    pub fn pitch(&self) -> &str {
        &self.pitch
    }

    pub fn key(&self) -> Result<Pitch> {
        self.pitch.parse()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.time + self.duration
    }

    /// Finite, non-negative start and a finite positive duration.
    pub fn is_well_formed(&self) -> bool {
        self.time.is_finite() && self.time >= 0.0 && self.duration.is_finite() && self.duration > 0.0
    }

    /// Same note moved later by `offset` seconds.
    pub fn shifted(&self, offset: f64) -> Result<Self> {
        Self::from_name(self.pitch.clone(), self.time + offset, self.duration)
    }

    /// Same note shifted by `semitones`; `None` if the pitch is unreadable or
    /// lands outside the transposable range.
    pub fn transposed(&self, semitones: i32) -> Option<Self> {
        let pitch = self.key().ok()?.transpose(semitones)?;
        Some(Self {
            pitch: pitch.to_string(),
            time: self.time,
            duration: self.duration,
        })
    }

    pub(crate) fn by_time(a: &NoteEvent, b: &NoteEvent) -> Ordering {
        a.time.total_cmp(&b.time)
    }
}

/// Descriptive fields of a catalog song. All optional; recordings carry none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
    /// Beats per minute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named, ordered list of note events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub notes: Vec<NoteEvent>,
    #[serde(flatten)]
    pub metadata: SongMetadata,
}

impl Song {
    pub fn new(name: impl Into<String>, notes: Vec<NoteEvent>) -> Self {
        Self {
            id: None,
            name: name.into(),
            notes,
            metadata: SongMetadata::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: SongMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The id, or one derived from the name ("Ode to Joy" -> "ode_to_joy").
    pub fn id_or_slug(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            self.name
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .to_lowercase()
        })
    }

    /// Notes in time order. Simultaneous notes keep their input order.
    pub fn sorted_notes(&self) -> Vec<NoteEvent> {
        let mut notes = self.notes.clone();
        notes.sort_by(NoteEvent::by_time);
        notes
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
