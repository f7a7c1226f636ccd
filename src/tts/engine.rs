//! Kokoro speech engine backed by sherpa-rs.

use std::collections::HashMap;

use sherpa_rs::OnnxConfig;
use sherpa_rs::tts::{CommonTtsConfig, KokoroTts, KokoroTtsConfig};
use tracing::{debug, info};

use crate::config::{AppConfig, LanguageProfile, Voice};
use crate::error::{Result, StudioError};

/// Kokoro outputs 24 kHz mono audio.
pub const KOKORO_SAMPLE_RATE: u32 = 24000;

/// A text-to-speech backend that turns one sentence into samples.
pub trait SpeechEngine: Send {
    /// Sample rate of the produced audio.
    fn sample_rate(&self) -> u32;

    /// Synthesize a single sentence with the given voice.
    fn synthesize(&mut self, sentence: &str, voice: &Voice, speed: f32) -> Result<Vec<f32>>;
}

/// Kokoro multi-lang model.
///
/// sherpa-onnx fixes the text front-end (lexicon or espeak language) when the
/// engine is created, so one engine is built lazily per language profile and
/// kept for the life of the process.
pub struct KokoroEngine {
    config: AppConfig,
    engines: HashMap<LanguageProfile, KokoroTts>,
}

impl KokoroEngine {
    /// Create the engine. Model files are loaded on first use of each language.
    ///
    /// # Errors
    /// Returns `PhonemizerMissing` if the espeak-ng data directory is absent.
    pub fn new(config: &AppConfig) -> Result<Self> {
        if !config.tts_data_dir().is_dir() {
            return Err(StudioError::PhonemizerMissing(config.tts_data_dir()));
        }

        info!("Initializing Kokoro TTS engine with {} provider ({} threads)", config.effective_provider(), config.threads);
        Ok(Self { config: config.clone(), engines: HashMap::new() })
    }

    /// Load the default voice's engine up front so the first request is fast.
    pub fn warm_up(&mut self, voice: &Voice) {
        self.engine_for(voice.profile());
    }

    fn engine_for(&mut self, profile: LanguageProfile) -> &mut KokoroTts {
        let config = &self.config;
        self.engines.entry(profile).or_insert_with(|| {
            info!("Loading Kokoro model for {:?}", profile);
            KokoroTts::new(build_tts_config(config, profile))
        })
    }
}

impl SpeechEngine for KokoroEngine {
    fn sample_rate(&self) -> u32 {
        KOKORO_SAMPLE_RATE
    }

    fn synthesize(&mut self, sentence: &str, voice: &Voice, speed: f32) -> Result<Vec<f32>> {
        debug!("Synthesizing with speaker {}: \"{}\"", voice.speaker_id, sentence);

        let tts = self.engine_for(voice.profile());
        let audio = tts.create(sentence, voice.speaker_id, speed).map_err(|e| StudioError::Engine(e.to_string()))?;

        Ok(audio.samples)
    }
}

fn build_tts_config(config: &AppConfig, profile: LanguageProfile) -> KokoroTtsConfig {
    KokoroTtsConfig {
        model: config.tts_model_path().to_string_lossy().to_string(),
        voices: config.tts_voices_path().to_string_lossy().to_string(),
        tokens: config.tts_tokens_path().to_string_lossy().to_string(),
        data_dir: config.tts_data_dir().to_string_lossy().to_string(),
        dict_dir: config.tts_dict_dir().to_string_lossy().to_string(),
        lexicon: config.tts_lexicon(profile),
        lang: profile.lang().to_string(),
        // speed is applied per call
        length_scale: 1.0,
        onnx_config: OnnxConfig {
            provider: config.effective_provider().as_sherpa_provider().to_string(),
            num_threads: config.threads.try_into().unwrap_or(2),
            debug: config.verbose,
        },
        common_config: CommonTtsConfig { max_num_sentences: 1, ..Default::default() }, // Kokoro only supports 1
    }
}
