//! Error types surfaced to the user.
//!
//! Two families exist: a required external dependency is missing (the
//! phonemizer data or the MP3 transcoder), or the model/encoder itself failed.
//! Both are reported verbatim; nothing here is retried.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning text into downloadable audio.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Please enter some text.")]
    EmptyText,

    #[error("Voice ID '{0}' not found. Please check the available voices list.")]
    UnknownVoice(String),

    #[error("Model did not generate any audio output.")]
    NoAudio,

    #[error("Phonemizer data not found at {0}. Run with --download-models to fetch the Kokoro model with espeak-ng data.")]
    PhonemizerMissing(PathBuf),

    #[error("MP3 transcoder '{0}' not found. Is FFmpeg installed and in PATH?")]
    TranscoderMissing(String),

    #[error("TTS generation failed: {0}")]
    Engine(String),

    #[error("MP3 conversion failed: {0}")]
    Transcode(String),

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StudioError {
    /// Whether the error comes from a missing external dependency rather than a failed call.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, StudioError::PhonemizerMissing(_) | StudioError::TranscoderMissing(_))
    }

    /// Whether the error was caused by the user's input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, StudioError::EmptyText | StudioError::UnknownVoice(_))
    }
}

/// Result type alias for synthesis and encoding operations.
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(StudioError::EmptyText.is_user_error());
        assert!(StudioError::UnknownVoice("xx_nobody".into()).is_user_error());
        assert!(!StudioError::NoAudio.is_user_error());

        assert!(StudioError::TranscoderMissing("ffmpeg".into()).is_missing_dependency());
        assert!(StudioError::PhonemizerMissing(PathBuf::from("/nope")).is_missing_dependency());
        assert!(!StudioError::Engine("boom".into()).is_missing_dependency());
    }

    #[test]
    fn test_unknown_voice_message_names_voice() {
        let msg = StudioError::UnknownVoice("xx_nobody".into()).to_string();
        assert!(msg.contains("'xx_nobody'"));
    }
}
