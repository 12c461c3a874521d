//! Piano key pitches.
//!
//! An 88-key piano spans A0 (key index 0) to C8 (key index 87). Pitches are
//! written in scientific pitch notation with sharps only: `C4`, `F#3`, `A0`.
//!
//! # Example
//! ```
//! use ivory_core::Pitch;
//!
//! let middle_c: Pitch = "C4".parse()?;
//! assert_eq!(middle_c.index(), 39);
//! assert_eq!(middle_c.to_string(), "C4");
//! assert_eq!(middle_c.transpose(2).map(|p| p.to_string()), Some("D4".to_string()));
//! # Ok::<(), ivory_core::Error>(())
//! ```

use crate::error::{Error, Result};
use core::fmt;
use core::str::FromStr;

/// Number of keys on a standard piano.
pub const NUM_KEYS: usize = 88;

/// MIDI note number of A0.
pub const LOWEST_MIDI: u8 = 21;

/// Pitch class names, C = 0.
const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A0 sits 9 semitones above C0, so `index = octave * 12 + class - 9`.
const A0_CLASS: i32 = 9;

/// Octaves reachable by [`Pitch::transpose`].
const TRANSPOSE_OCTAVES: core::ops::RangeInclusive<i32> = 1..=8;

/// One of the 88 piano keys.
///
/// Always holds a valid key index; out-of-range values are rejected at
/// construction, never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    pub const A0: Pitch = Pitch(0);
    pub const MIDDLE_C: Pitch = Pitch(39);
    pub const CONCERT_A: Pitch = Pitch(48);
    pub const C8: Pitch = Pitch(87);

    /// Fails with [`Error::IndexOutOfRange`] if `index` is not in 0..=87.
    pub fn from_index(index: usize) -> Result<Pitch> {
        if index < NUM_KEYS {
            Ok(Pitch(index as u8))
        } else {
            Err(Error::IndexOutOfRange(index))
        }
    }

    /// Returns `None` outside the piano range (MIDI 21-108).
    pub fn from_midi(midi: u8) -> Option<Pitch> {
        let index = midi.checked_sub(LOWEST_MIDI)? as usize;
        Pitch::from_index(index).ok()
    }

    /// Builds a pitch from a pitch class (0 = C) and an octave.
    pub fn from_parts(class: u8, octave: i32) -> Option<Pitch> {
        if class >= 12 {
            return None;
        }
        let index = octave * 12 + class as i32 - A0_CLASS;
        usize::try_from(index)
            .ok()
            .and_then(|i| Pitch::from_index(i).ok())
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn midi(self) -> u8 {
        self.0 + LOWEST_MIDI
    }

    /// 0 for A0/A#0/B0, 8 for C8.
    pub const fn octave(self) -> i32 {
        (self.0 as i32 + A0_CLASS) / 12
    }

    /// 0-11, where 0 = C.
    pub const fn pitch_class(self) -> u8 {
        ((self.0 as i32 + A0_CLASS) % 12) as u8
    }

    pub fn name(self) -> &'static str {
        NAMES[self.pitch_class() as usize]
    }

    /// Shifts by `semitones`.
    ///
    /// Returns `None` if the result leaves octaves 1-8 or the keyboard, so
    /// A0-B0 can never be produced by transposition.
    pub fn transpose(self, semitones: i32) -> Option<Pitch> {
        let target = self.0 as i32 + semitones;
        if !(0..NUM_KEYS as i32).contains(&target) {
            return None;
        }
        let pitch = Pitch(target as u8);
        if TRANSPOSE_OCTAVES.contains(&pitch.octave()) {
            Some(pitch)
        } else {
            None
        }
    }

    /// All 88 keys, lowest first.
    pub fn all() -> impl Iterator<Item = Pitch> {
        (0..NUM_KEYS as u8).map(Pitch)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}

impl FromStr for Pitch {
    type Err = Error;

    /// Accepts `<Letter>[#]<digit>`, e.g. `A0`, `C#4`, `C8`.
    fn from_str(s: &str) -> Result<Pitch> {
        let invalid = || Error::InvalidPitchFormat(s.to_string());

        let (split, last) = s.char_indices().last().ok_or_else(invalid)?;
        let name = &s[..split];
        let octave = last.to_digit(10).ok_or_else(invalid)?;
        let class = NAMES.iter().position(|n| *n == name).ok_or_else(invalid)?;

        Pitch::from_parts(class as u8, octave as i32).ok_or_else(invalid)
    }
}

impl TryFrom<&str> for Pitch {
    type Error = Error;

    fn try_from(s: &str) -> Result<Pitch> {
        s.parse()
    }
}

impl From<Pitch> for usize {
    fn from(pitch: Pitch) -> usize {
        pitch.index()
    }
}
