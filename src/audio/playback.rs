//! Local playback of a synthesized clip using cpal.
//!
//! The clip is resampled to the device rate up front and fed to the audio
//! callback through a lock-free ring buffer, so the callback never blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, StreamConfig, SupportedStreamConfig};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Producer, Split};
use tracing::{debug, info, warn};

use super::resampler::resample;

/// Plays audio through the default output device.
pub struct Player {
    device: Device,
    config: SupportedStreamConfig,
}

impl Player {
    /// Open the default output device.
    ///
    /// # Errors
    /// Returns an error if no output device or F32 output configuration is available.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().context("No output device available")?;

        let name = device.description().ok().map(|desc| desc.name().to_string()).unwrap_or_else(|| "Unknown".to_string());
        info!("Using output device: {}", name);

        let config = device.default_output_config().context("Failed to get default output config")?;
        if config.sample_format() != SampleFormat::F32 {
            anyhow::bail!("Output device does not offer F32 samples (got {:?})", config.sample_format());
        }

        Ok(Self { device, config })
    }

    /// Play a mono clip and block until it has been drained.
    pub fn play(&self, samples: &[f32], sample_rate: u32) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let device_rate = self.config.sample_rate();
        let samples = if device_rate != sample_rate {
            debug!("Resampling {} Hz -> {} Hz", sample_rate, device_rate);
            resample(samples, sample_rate, device_rate)?
        } else {
            samples.to_vec()
        };

        let ring = HeapRb::<f32>::new(samples.len().max(1));
        let (mut producer, mut consumer) = ring.split();
        let queued = producer.push_slice(&samples);
        if queued < samples.len() {
            warn!("Playback buffer overflow, dropped {} samples", samples.len() - queued);
        }

        let finished = Arc::new(AtomicBool::new(false));
        let finished_cb = finished.clone();
        let channels = self.config.channels() as usize;
        let stream_config: StreamConfig = self.config.config();

        let stream = self.device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = match consumer.try_pop() {
                        Some(sample) => sample,
                        None => {
                            finished_cb.store(true, Ordering::Release);
                            0.0
                        }
                    };
                    // Duplicate mono sample to all channels
                    frame.fill(sample);
                }
            },
            |err| tracing::error!("Audio playback error: {}", err),
            None,
        )?;

        stream.play().context("Failed to start playback stream")?;

        let duration = Duration::from_secs_f64(samples.len() as f64 / device_rate as f64);
        let deadline = Instant::now() + duration + Duration::from_secs(1);
        info!("🔊 Playing {:.2}s of audio", duration.as_secs_f64());

        while !finished.load(Ordering::Acquire) {
            if Instant::now() > deadline {
                warn!("Playback timeout exceeded");
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        debug!("Playback completed");
        Ok(())
    }
}
