//! Note-sequence data model for Ivory.
//!
//! Pitch codec, note events and songs, the built-in catalog, the sliding-window
//! training corpus, recording files, and MIDI export. Everything here is pure
//! data; the neural network lives in `ivory-burn`.
//!
//! # Example
//!
//! ```
//! use ivory_core::{one_hot, Pitch};
//!
//! let c4: Pitch = "C4".parse()?;
//! assert_eq!(c4.index(), 39);
//! assert_eq!(one_hot("C4").pitch(), Some(c4));
//! assert!(one_hot("H9").is_silent());
//! # Ok::<(), ivory_core::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

mod pitch;
pub use pitch::{Pitch, LOWEST_MIDI, NUM_KEYS};

pub mod codec;
pub use codec::{argmax, argmax_to_pitch, index_to_pitch, one_hot, pitch_to_index, OneHot};

mod event;
pub use event::{NoteEvent, Song, SongMetadata};

pub mod catalog;

pub mod corpus;
pub use corpus::{Corpus, CorpusBuilder, TrainingWindow, SEQUENCE_LENGTH, TRANSPOSITIONS};

mod recording;
pub use recording::{Recording, RECORDING_SONG_NAME};

pub mod midi;

mod config;
pub use config::{validate_temperature, GenerationConfig, TrainingConfig, DEFAULT_SNAPSHOT_NAME};
