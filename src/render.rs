//! Turns a synthesized clip into the downloadable artifacts.

use tracing::{info, warn};
use uuid::Uuid;

use crate::audio::{Transcoder, wav};
use crate::error::Result;
use crate::tts::SpeechClip;

/// WAV bytes plus the MP3 rendition, or the reason there is none.
#[derive(Debug)]
pub struct RenderedClip {
    pub id: Uuid,
    pub voice: String,
    pub sample_rate: u32,
    pub duration_secs: f32,
    pub wav: Vec<u8>,
    pub mp3: std::result::Result<Vec<u8>, String>,
}

impl RenderedClip {
    /// Encode `clip` as WAV and, when a transcoder is given, as MP3.
    ///
    /// A failed MP3 conversion is kept on the clip instead of failing the
    /// whole render; the WAV is still usable.
    pub fn render(clip: &SpeechClip, transcoder: Option<&Transcoder>) -> Result<Self> {
        let wav = wav::encode(&clip.samples, clip.sample_rate)?;

        let mp3 = match transcoder {
            Some(transcoder) => transcoder.transcode(&wav).map_err(|e| {
                warn!("{}", e);
                e.to_string()
            }),
            None => Err("MP3 output not requested".to_string()),
        };

        let rendered = Self {
            id: Uuid::new_v4(),
            voice: clip.voice.clone(),
            sample_rate: clip.sample_rate,
            duration_secs: clip.duration_secs(),
            wav,
            mp3,
        };
        match &rendered.mp3 {
            Ok(mp3) => info!("Rendered clip {} (WAV {} bytes, MP3 {} bytes)", rendered.id, rendered.wav.len(), mp3.len()),
            Err(_) => info!("Rendered clip {} (WAV {} bytes, no MP3)", rendered.id, rendered.wav.len()),
        }
        Ok(rendered)
    }

    /// Download file name, e.g. `kokoro_af_bella.wav`.
    pub fn file_name(&self, extension: &str) -> String {
        format!("kokoro_{}.{}", self.voice, extension)
    }
}
