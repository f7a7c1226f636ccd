//! Text-to-speech module using sherpa-rs.
//!
//! Provides speech synthesis using Kokoro models.

mod engine;
mod synthesizer;

pub use engine::{KokoroEngine, SpeechEngine};
pub use synthesizer::{SpeechClip, Synthesizer};

#[cfg(test)]
pub(crate) use synthesizer::tests::FakeEngine;
