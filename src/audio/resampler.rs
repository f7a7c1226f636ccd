//! Audio resampling using the rubato FFT-based resampler.

use anyhow::{Context, Result};
use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Chunk size for FFT-based resampling (provides good quality and performance).
const CHUNK_SIZE: usize = 1024;

/// Number of sub-chunks for FFT processing (higher = better quality but more CPU).
const SUB_CHUNKS: usize = 2;

/// Resample a complete mono clip from one sample rate to another.
///
/// Used to bring 24 kHz synthesized speech to the output device's rate.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, SUB_CHUNKS, 1, FixedSync::Input)
        .context("Failed to create resampler")?;

    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f32; output_frames_max];
    // rubato may round the chunk size to suit the rate ratio
    let chunk_size = resampler.input_frames_next();

    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    let delay = resampler.output_delay();
    let mut output = Vec::with_capacity(expected_len + delay + output_frames_max);
    let mut input_chunk = vec![0.0f32; chunk_size];

    let mut process = |input_chunk: &[f32], output: &mut Vec<f32>| -> Result<()> {
        let input_adapter = InterleavedSlice::new(input_chunk, 1, chunk_size).context("Failed to create input adapter")?;
        let mut output_adapter =
            InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max).context("Failed to create output adapter")?;

        let (_, frames_written) = resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| anyhow::anyhow!("Resampling error: {}", e))?;
        output.extend_from_slice(&output_buffer[..frames_written]);
        Ok(())
    };

    for chunk in samples.chunks(chunk_size) {
        // Zero-pad the final partial chunk
        input_chunk[..chunk.len()].copy_from_slice(chunk);
        input_chunk[chunk.len()..].fill(0.0);
        process(&input_chunk, &mut output)?;
    }

    // The resampler holds back `delay` frames; flush them with silence
    input_chunk.fill(0.0);
    while output.len() < delay + expected_len {
        process(&input_chunk, &mut output)?;
    }

    Ok(output[delay..delay + expected_len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.25; 100];
        assert_eq!(resample(&samples, 24000, 24000).unwrap(), samples);
    }

    #[test]
    fn test_resample_tts_to_device_rate() {
        // One second of 24 kHz speech played on a 48 kHz device
        let samples = vec![0.0; 24000];
        let result = resample(&samples, 24000, 48000).unwrap();
        assert!(result.len() >= 47900 && result.len() <= 48000, "got {}", result.len());
    }

    #[test]
    fn test_resample_down_to_lower_rate() {
        let samples = vec![0.0; 24000];
        let result = resample(&samples, 24000, 16000).unwrap();
        assert!(result.len() >= 15900 && result.len() <= 16000, "got {}", result.len());
    }

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum()
    }

    #[test]
    fn test_resample_keeps_end_of_clip() {
        // Last 20 ms carry the signal
        let mut samples = vec![0.0; 24000];
        samples[24000 - 480..].fill(0.5);

        let result = resample(&samples, 24000, 48000).unwrap();
        assert_eq!(result.len(), 48000);

        let expected = 960.0 * 0.25;
        let tail = energy(&result[48000 - 960..]);
        assert!(tail > expected * 0.8, "tail energy {} of {}", tail, expected);
    }

    #[test]
    fn test_resample_starts_without_delay() {
        let mut samples = vec![0.0; 24000];
        samples[..480].fill(0.5);

        let result = resample(&samples, 24000, 48000).unwrap();
        let expected = 960.0 * 0.25;
        let head = energy(&result[..960]);
        assert!(head > expected * 0.8, "head energy {} of {}", head, expected);
        assert!(energy(&result[3000..]) < expected * 0.05);
    }
}
