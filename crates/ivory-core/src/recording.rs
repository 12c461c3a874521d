//! User recordings.
//!
//! A recording is a bare JSON array of note events, the same file the piano
//! front end offers for download as `recording.json`.

use crate::error::Result;
use crate::event::{NoteEvent, Song};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name given to a recording when it is used as a training song.
pub const RECORDING_SONG_NAME: &str = "User Recording";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recording {
    notes: Vec<NoteEvent>,
}

impl Recording {
    pub fn new(notes: Vec<NoteEvent>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn push(&mut self, note: NoteEvent) {
        self.notes.push(note);
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Latest note end, 0 for an empty recording.
    pub fn end_time(&self) -> f64 {
        self.notes.iter().map(NoteEvent::end).fold(0.0, f64::max)
    }

    /// The last `count` notes, or all of them if there are fewer.
    pub fn tail(&self, count: usize) -> &[NoteEvent] {
        &self.notes[self.notes.len().saturating_sub(count)..]
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn into_song(self) -> Song {
        Song::new(RECORDING_SONG_NAME, self.notes)
    }
}

impl From<Vec<NoteEvent>> for Recording {
    fn from(notes: Vec<NoteEvent>) -> Self {
        Self::new(notes)
    }
}
