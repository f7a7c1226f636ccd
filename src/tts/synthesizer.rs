//! Text-to-speech synthesizer: validates input and assembles whole clips.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::engine::SpeechEngine;
use crate::config::voices;
use crate::error::{Result, StudioError};

/// Runs of horizontal whitespace, collapsed before synthesis.
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{00A0}]+").expect("valid whitespace pattern"));

/// Synthesized audio for one request.
#[derive(Debug, Clone)]
pub struct SpeechClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub voice: String,
}

impl SpeechClip {
    /// Duration of the clip in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Text-to-speech synthesizer over a pluggable engine.
pub struct Synthesizer {
    engine: Box<dyn SpeechEngine>, // Kokoro in production
    speed: f32,                    // Speech speed multiplier
}

impl Synthesizer {
    /// Create a new synthesizer.
    pub fn new(engine: Box<dyn SpeechEngine>, speed: f32) -> Self {
        Self { engine, speed }
    }

    /// Synthesize `text` with the named voice.
    ///
    /// The text is split into sentences, each synthesized separately and
    /// concatenated in order.
    ///
    /// # Errors
    /// `EmptyText` for blank input, `UnknownVoice` for a voice outside the
    /// catalog, `NoAudio` if the engine produced nothing, and any engine error.
    pub fn synthesize(&mut self, text: &str, voice_name: &str) -> Result<SpeechClip> {
        let text = normalize_text(text);
        if text.is_empty() {
            return Err(StudioError::EmptyText);
        }

        let voice = voices::get_voice(voice_name).ok_or_else(|| StudioError::UnknownVoice(voice_name.to_string()))?;

        info!("Generating audio with voice: {}...", voice_name);

        let sentences = split_sentences(&text);
        let total = sentences.len();
        let mut samples = Vec::new();

        for (i, sentence) in sentences.iter().enumerate() {
            let chunk = self.engine.synthesize(sentence, voice, self.speed)?;
            debug!("Received chunk {}/{} ({} samples)", i + 1, total, chunk.len());
            samples.extend_from_slice(&chunk);
        }

        if samples.is_empty() {
            return Err(StudioError::NoAudio);
        }

        let clip = SpeechClip { samples, sample_rate: self.engine.sample_rate(), voice: voice_name.to_string() };
        info!("🎵 Generated speech ({} samples, {:.2}s)", clip.samples.len(), clip.duration_secs());
        Ok(clip)
    }
}

/// Trim the text and collapse horizontal whitespace, keeping line breaks.
pub fn normalize_text(text: &str) -> String {
    HORIZONTAL_SPACE.replace_all(text.trim(), " ").into_owned()
}

/// Split text into sentences for synthesis.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);

        if matches!(c, '.' | '!' | '?' | '\n') {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    // Lone punctuation (e.g. the second '.' of "...") carries no speech
    if trimmed.chars().any(|c| c.is_alphanumeric()) {
        sentences.push(trimmed.to_string());
    }
}
