//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::voices::{self, LanguageProfile};
use crate::error::StudioError;

/// Directory name of the unpacked Kokoro model archive.
pub const MODEL_NAME: &str = "kokoro-multi-lang-v1_0";

/// Hardware acceleration provider for ONNX models.
/// Auto-detected based on platform if not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// CPU inference (default fallback, always available)
    #[default]
    Cpu,
    /// NVIDIA CUDA acceleration (Linux only, requires CUDA toolkit)
    Cuda,
    /// Apple CoreML acceleration (macOS only, uses Neural Engine)
    #[value(name = "coreml")]
    CoreMl,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sherpa_provider())
    }
}

impl Provider {
    /// Convert to sherpa-rs provider string.
    pub fn as_sherpa_provider(&self) -> &'static str {
        match self {
            Provider::Cpu => "cpu",
            Provider::Cuda => "cuda",
            Provider::CoreMl => "coreml",
        }
    }
}

/// Kokoro Studio configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "kokoro-studio")]
#[command(author, version, about = "Kokoro TTS - text to speech in your browser", long_about = None)]
pub struct AppConfig {
    /// List all available voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Show detailed information about a specific voice and exit
    #[arg(long)]
    pub voice_info: Option<String>,

    /// Download the Kokoro model into the model directory if it is missing
    #[arg(long)]
    pub download_models: bool,

    /// Address to bind the web UI to
    #[arg(long, env = "KOKORO_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the web UI to
    #[arg(long, env = "KOKORO_PORT", default_value_t = 8501)]
    pub port: u16,

    /// Directory containing model files
    #[arg(long, short = 'd', env = "MODEL_DIR", default_value_os_t = default_model_dir())]
    pub model_dir: PathBuf,

    /// Voice selected by default (e.g., af_bella, bf_emma).
    /// See <https://huggingface.co/hexgrad/Kokoro-82M/blob/main/VOICES.md>
    #[arg(long, default_value = voices::DEFAULT_VOICE)]
    pub voice: String,

    /// Speech speed multiplier
    #[arg(long, default_value = "1.0")]
    pub speed: f32,

    /// Hardware acceleration provider (auto-detected if not specified)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Number of inference threads (0 = auto-detect based on CPU cores)
    #[arg(long, default_value = "0")]
    pub threads: usize,

    /// Program used to transcode WAV to MP3
    #[arg(long, env = "FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// MP3 bitrate passed to the transcoder
    #[arg(long, default_value = "192k")]
    pub mp3_bitrate: String,

    /// Synthesize this text once from the command line instead of starting the web UI
    #[arg(long, short = 't')]
    pub text: Option<String>,

    /// Output file for --text (.wav or .mp3)
    #[arg(long, short = 'o', requires = "text")]
    pub output: Option<PathBuf>,

    /// Play the result of --text through the default output device
    #[arg(long, requires = "text")]
    pub play: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let mut config = Self::parse();

        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        if let Some(ref voice_name) = config.voice_info {
            match voices::print_voice_info(voice_name) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config.normalize_thread_count();
        config
    }

    /// Pick a thread count when none was given.
    ///
    /// With CUDA a single thread is used since the GPU handles parallelism;
    /// on CPU half the cores are used, leaving room for the web server.
    fn normalize_thread_count(&mut self) {
        if self.threads != 0 {
            return;
        }

        self.threads = if self.effective_provider() == Provider::Cuda { 1 } else { (num_cpus::get() / 2).max(1) };
    }

    /// Get the effective provider.
    pub fn effective_provider(&self) -> Provider {
        self.provider.unwrap_or_else(detect_provider)
    }

    /// Root directory of the unpacked Kokoro model.
    pub fn tts_dir(&self) -> PathBuf {
        self.model_dir.join("tts").join(MODEL_NAME)
    }

    /// Get the path to the Kokoro TTS model.
    pub fn tts_model_path(&self) -> PathBuf {
        self.tts_dir().join("model.onnx")
    }

    /// Get the path to the Kokoro TTS voices.bin file.
    pub fn tts_voices_path(&self) -> PathBuf {
        self.tts_dir().join("voices.bin")
    }

    /// Get the path to the TTS tokens file.
    pub fn tts_tokens_path(&self) -> PathBuf {
        self.tts_dir().join("tokens.txt")
    }

    /// Get the path to the espeak-ng data directory used for phonemization.
    pub fn tts_data_dir(&self) -> PathBuf {
        self.tts_dir().join("espeak-ng-data")
    }

    /// Get the path to the TTS dict directory (for Chinese segmentation).
    pub fn tts_dict_dir(&self) -> PathBuf {
        self.tts_dir().join("dict")
    }

    /// Comma-separated lexicon paths for a language profile, as sherpa-onnx expects them.
    pub fn tts_lexicon(&self, profile: LanguageProfile) -> String {
        let tts_dir = self.tts_dir();
        profile
            .lexicon_files()
            .iter()
            .map(|file| tts_dir.join(file).to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether the model files are already present.
    pub fn model_present(&self) -> bool {
        self.tts_model_path().exists() && self.tts_voices_path().exists() && self.tts_tokens_path().exists()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.model_dir.exists() {
            anyhow::bail!("Model directory does not exist: {}", self.model_dir.display());
        }

        let required_files = [self.tts_model_path(), self.tts_voices_path(), self.tts_tokens_path()];
        for path in &required_files {
            if !path.exists() {
                anyhow::bail!("Required model file not found: {}", path.display());
            }
        }

        if !self.tts_data_dir().is_dir() {
            return Err(StudioError::PhonemizerMissing(self.tts_data_dir()).into());
        }

        if self.speed <= 0.0 {
            anyhow::bail!("Speed must be positive");
        }

        if voices::get_voice(&self.voice).is_none() {
            return Err(StudioError::UnknownVoice(self.voice.clone()).into());
        }

        Ok(())
    }

    /// Address the web UI listens on.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        info!("  Model directory: {}", self.model_dir.display());
        info!("  Default voice: {}", self.voice);
        info!("  Speed: {}", self.speed);
        info!("  Provider: {} ({} threads)", self.effective_provider(), self.threads);
        info!("  MP3 transcoder: {} @ {}", self.ffmpeg, self.mp3_bitrate);
    }
}

/// Get the default model directory (~/.kokoro-studio/models).
fn default_model_dir() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".kokoro-studio").join("models")
    } else {
        PathBuf::from("models")
    }
}

/// Auto-detect the best hardware acceleration provider.
fn detect_provider() -> Provider {
    #[cfg(target_os = "macos")]
    {
        Provider::CoreMl
    }

    #[cfg(target_os = "linux")]
    {
        if has_nvidia_gpu() { Provider::Cuda } else { Provider::Cpu }
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Provider::Cpu
    }
}

/// Check if an NVIDIA GPU is available (Linux only).
#[cfg(target_os = "linux")]
fn has_nvidia_gpu() -> bool {
    use std::path::Path;

    // Desktop GPUs, then Jetson devices
    ["/dev/nvidia0", "/dev/nvidiactl", "/dev/nvhost-ctrl-gpu", "/etc/nv_tegra_release"]
        .iter()
        .any(|path| Path::new(path).exists())
}
