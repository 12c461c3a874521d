//! One-hot encoding of pitches.
//!
//! The bulk encoder never fails: text that does not name a piano key becomes
//! [`OneHot::Silent`], an all-zero vector, so one bad label cannot abort a
//! whole corpus. Callers that care can tell `Silent` apart from a real key.

use crate::error::{Error, Result};
use crate::pitch::{Pitch, NUM_KEYS};

/// Parses `pitch` and returns its key index (A0 = 0, C8 = 87).
pub fn pitch_to_index(pitch: &str) -> Result<usize> {
    pitch.parse::<Pitch>().map(Pitch::index)
}

/// Inverse of [`pitch_to_index`].
pub fn index_to_pitch(index: usize) -> Result<Pitch> {
    Pitch::from_index(index)
}

/// A one-hot encoded key, or the all-zero vector for unreadable input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneHot {
    Key(Pitch),
    Silent,
}

impl OneHot {
    pub fn pitch(self) -> Option<Pitch> {
        match self {
            OneHot::Key(p) => Some(p),
            OneHot::Silent => None,
        }
    }

    pub fn is_silent(self) -> bool {
        matches!(self, OneHot::Silent)
    }

    /// Writes the vector into `out`, which must hold [`NUM_KEYS`] values.
    pub fn write_into(self, out: &mut [f32]) {
        debug_assert_eq!(out.len(), NUM_KEYS);
        out.fill(0.0);
        if let OneHot::Key(p) = self {
            out[p.index()] = 1.0;
        }
    }

    /// Appends the vector to `out`.
    pub fn extend_into(self, out: &mut Vec<f32>) {
        let start = out.len();
        out.resize(start + NUM_KEYS, 0.0);
        self.write_into(&mut out[start..]);
    }

    pub fn to_vec(self) -> Vec<f32> {
        let mut v = vec![0.0; NUM_KEYS];
        self.write_into(&mut v);
        v
    }
}

impl From<Pitch> for OneHot {
    fn from(p: Pitch) -> Self {
        OneHot::Key(p)
    }
}

/// Encodes a pitch name, degrading to [`OneHot::Silent`] on invalid text.
pub fn one_hot(pitch: &str) -> OneHot {
    pitch.parse::<Pitch>().map_or(OneHot::Silent, OneHot::Key)
}

/// Index of the largest value; ties go to the lowest index, NaN never wins.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Decodes a score or probability vector to the most likely key.
pub fn argmax_to_pitch(values: &[f32]) -> Result<Pitch> {
    if values.len() != NUM_KEYS {
        return Err(Error::InvalidVectorLength {
            expected: NUM_KEYS,
            actual: values.len(),
        });
    }
    let index = argmax(values).ok_or(Error::InvalidVectorLength {
        expected: NUM_KEYS,
        actual: 0,
    })?;
    Pitch::from_index(index)
}
