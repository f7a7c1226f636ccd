//! In-memory WAV encoding.

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{Result, StudioError};

/// Encode mono f32 samples as a 16-bit PCM WAV file.
///
/// Samples are hard-clamped to [-1, 1] before scaling.
pub fn encode(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(StudioError::NoAudio);
    }

    let spec = WavSpec { channels: 1, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int };

    let mut buffer = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    let mut writer = WavWriter::new(&mut buffer, spec)?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample))?;
    }
    writer.finalize()?;

    Ok(buffer.into_inner())
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn test_encode_header_and_samples() {
        let samples = vec![0.0, 0.5, -0.5, 1.0, -1.0];
        let bytes = encode(&samples, 24000).unwrap();

        assert_eq!(&bytes[..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24000);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![0, 16384, -16384, 32767, -32767]);
    }

    #[test]
    fn test_quantization_is_symmetric() {
        let bytes = encode(&[0.25, -0.25, 0.00002, -0.00002], 24000).unwrap();
        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![8192, -8192, 1, -1]);
    }

    #[test]
    fn test_encode_clamps_out_of_range() {
        let bytes = encode(&[3.0, -7.5], 16000).unwrap();
        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![32767, -32767]);
    }

    #[test]
    fn test_encode_rejects_empty() {
        assert!(matches!(encode(&[], 24000), Err(StudioError::NoAudio)));
    }

    #[test]
    fn test_encoded_size() {
        let bytes = encode(&vec![0.1; 24000], 24000).unwrap();
        assert_eq!(bytes.len(), 44 + 24000 * 2);
    }
}
