//! Kokoro Studio - text to speech in the browser.
//!
//! Type text, pick one of the Kokoro voices, listen to the result and download
//! it as WAV or MP3. Synthesis runs locally on the Kokoro-82M model through
//! sherpa-onnx; MP3 conversion uses FFmpeg.

mod audio;
mod config;
mod download;
mod error;
mod render;
mod server;
mod tts;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use audio::{Player, Transcoder};
use config::{AppConfig, voices};
use render::RenderedClip;
use server::AppState;
use tts::{KokoroEngine, Synthesizer};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn wait_for_shutdown(shutdown: CancellationToken) {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => { sigterm.recv().await; }
                    Err(e) => {
                        warn!("Failed to register SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("🛑 Received SIGTERM, shutting down...");
        }
    }

    shutdown.cancel();
}

/// Build the synthesizer; loading the default voice's model happens here.
fn build_synthesizer(config: &AppConfig) -> Result<Synthesizer> {
    let mut engine = KokoroEngine::new(config)?;
    if let Some(voice) = voices::get_voice(&config.voice) {
        engine.warm_up(voice);
    }
    Ok(Synthesizer::new(Box::new(engine), config.speed))
}

/// One-shot synthesis from the command line (`--text`).
fn run_once(config: &AppConfig, mut synthesizer: Synthesizer, text: &str) -> Result<()> {
    let clip = synthesizer.synthesize(text, &config.voice)?;

    // Without --output or --play, save next to the working directory like a browser download would
    let output = match (&config.output, config.play) {
        (Some(path), _) => Some(path.clone()),
        (None, false) => Some(PathBuf::from(format!("kokoro_{}.wav", clip.voice))),
        (None, true) => None,
    };

    if let Some(output) = output {
        let want_mp3 = output.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
        let transcoder = Transcoder::new(&config.ffmpeg, &config.mp3_bitrate);
        let rendered = RenderedClip::render(&clip, want_mp3.then_some(&transcoder))?;
        write_output(&output, &rendered, want_mp3)?;
    }

    if config.play {
        let player = Player::new()?;
        player.play(&clip.samples, clip.sample_rate)?;
    }

    Ok(())
}

fn write_output(path: &Path, rendered: &RenderedClip, mp3: bool) -> Result<()> {
    let bytes = if mp3 { rendered.mp3.as_ref().map_err(|e| anyhow::anyhow!("{}", e))? } else { &rendered.wav };
    std::fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))?;
    info!("💾 Saved {} ({:.2}s)", path.display(), rendered.duration_secs);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| if config.verbose { EnvFilter::try_new("debug") } else { EnvFilter::try_new("info") })
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🗣️ Kokoro Studio v{}", env!("CARGO_PKG_VERSION"));

    if config.download_models {
        let download_config = config.clone();
        tokio::task::spawn_blocking(move || download::ensure_model(&download_config)).await??;
    }

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        error!("Run with --download-models to fetch the Kokoro model.");
        std::process::exit(1);
    }
    config.log_config();

    let synth_config = config.clone();
    let synthesizer = tokio::task::spawn_blocking(move || build_synthesizer(&synth_config)).await??;

    if let Some(text) = config.text.clone() {
        let once_config = config.clone();
        return tokio::task::spawn_blocking(move || run_once(&once_config, synthesizer, &text)).await?;
    }

    let transcoder = Transcoder::new(&config.ffmpeg, &config.mp3_bitrate);
    if !transcoder.available() {
        warn!("⚠️  '{}' not found, MP3 downloads will be unavailable. Install FFmpeg and make sure it is in your PATH.", transcoder.program());
    }

    let state = AppState::new(synthesizer, transcoder, &config.voice);
    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown(shutdown.clone()));

    server::start_server(&config.bind_addr(), state, shutdown).await?;

    info!("✅ Kokoro Studio stopped");
    Ok(())
}
