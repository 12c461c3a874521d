//! Built-in song catalog.
//!
//! Ten short excerpts of well-known piano pieces, shipped as a JSON asset and
//! used as the default training corpus.

use crate::error::Result;
use crate::event::{NoteEvent, Song};
use rand::seq::SliceRandom;
use rand::Rng;

const CATALOG_JSON: &str = include_str!("../assets/catalog.json");

/// Parses the bundled catalog.
pub fn builtin() -> Result<Vec<Song>> {
    Ok(serde_json::from_str(CATALOG_JSON)?)
}

pub fn by_category<'a>(songs: &'a [Song], category: &str) -> Vec<&'a Song> {
    songs
        .iter()
        .filter(|s| s.metadata.category.as_deref() == Some(category))
        .collect()
}

pub fn by_difficulty<'a>(songs: &'a [Song], difficulty: &str) -> Vec<&'a Song> {
    songs
        .iter()
        .filter(|s| s.metadata.difficulty.as_deref() == Some(difficulty))
        .collect()
}

/// Unique categories in first-seen order.
pub fn categories(songs: &[Song]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for category in songs.iter().filter_map(|s| s.metadata.category.as_ref()) {
        if !seen.contains(category) {
            seen.push(category.clone());
        }
    }
    seen
}

/// Case-insensitive match on name, composer, category, or description.
pub fn search<'a>(songs: &'a [Song], query: &str) -> Vec<&'a Song> {
    let needle = query.to_lowercase();
    let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));
    songs
        .iter()
        .filter(|s| {
            hit(Some(&s.name))
                || hit(s.metadata.composer.as_deref())
                || hit(s.metadata.category.as_deref())
                || hit(s.metadata.description.as_deref())
        })
        .collect()
}

/// Copies of `songs` with every id filled in.
pub fn for_training(songs: &[Song]) -> Vec<Song> {
    songs
        .iter()
        .map(|s| {
            let mut song = s.clone();
            song.id = Some(s.id_or_slug());
            song
        })
        .collect()
}

/// Rescales note times by `60 / tempo` and sorts by time.
///
/// Songs without a tempo (or with a non-positive one) keep their timing.
pub fn normalize_for_training(song: &Song) -> Song {
    let scale = match song.metadata.tempo {
        Some(tempo) if tempo > 0.0 => 60.0 / tempo,
        _ => 1.0,
    };
    let mut normalized = song.clone();
    normalized.notes = song
        .notes
        .iter()
        .filter_map(|n| NoteEvent::from_name(n.pitch(), n.time() * scale, n.duration()).ok())
        .collect();
    normalized.notes.sort_by(NoteEvent::by_time);
    normalized
}

pub fn random<'a, R: Rng + ?Sized>(songs: &'a [Song], rng: &mut R) -> Option<&'a Song> {
    songs.choose(rng)
}
