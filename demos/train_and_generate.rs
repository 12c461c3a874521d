//! # Train and Generate
//!
//! Train on the built-in catalog, then continue a short phrase and export it.
//!
//! **Concepts:** `Studio::builder()`, `DirectoryStore`, `train_catalog`,
//! `continue_recording`, MIDI export
//!
//! ```bash
//! RUST_LOG=info cargo run --example train_and_generate -- /tmp/ivory
//! ```
//!
//! The first run trains and saves into the given directory; later runs reuse
//! the saved model.

use ivory::midi;
use ivory::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/ivory_demo".to_string());

    let config = ModelConfig {
        seed: Some(2024),
        ..Default::default()
    };

    let mut studio = Studio::builder()
        .config(config)
        .store(Arc::new(DirectoryStore::new(&dir)?))
        .build()?;

    if studio.is_trained() {
        println!("Loaded saved model ({} epochs)", studio.history().len());
    } else {
        println!("Training on {} catalog songs...", studio.catalog().len());
        studio.train_catalog(|fraction, m| {
            println!(
                "  {:>3.0}%  epoch {:>2}  loss {:.3}  acc {:.3}",
                fraction * 100.0,
                m.epoch,
                m.loss,
                m.accuracy
            );
        })?;
    }

    let summary = studio.summary();
    println!(
        "Model: {:?}, {} parameters across {} layers",
        summary.state,
        summary.total_params,
        summary.layers.len()
    );

    // Opening of Ode to Joy
    let mut phrase = Recording::default();
    for (i, pitch) in ["E4", "E4", "F4", "G4", "G4", "F4", "E4", "D4"].iter().enumerate() {
        phrase.push(NoteEvent::from_name(*pitch, i as f64 * 0.5, 0.45)?);
    }

    let continuation = studio.continue_recording(&phrase)?;
    println!("Continuation:");
    for note in &continuation {
        println!(
            "  {:<4} at {:>5.2}s for {:.2}s",
            note.pitch(),
            note.time(),
            note.duration()
        );
    }

    let mut take = phrase.notes().to_vec();
    take.extend(continuation);
    let path = std::path::Path::new(&dir).join("continuation.mid");
    midi::write_smf(&take, 120.0, &path)?;
    println!("Exported: {}", path.display());

    Ok(())
}
