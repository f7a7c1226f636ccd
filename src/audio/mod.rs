//! Audio encoding and playback.
//!
//! WAV is written in-process with hound, MP3 is produced by an external
//! FFmpeg process, and local playback uses cpal with rubato resampling.

pub mod mp3;
mod playback;
pub mod resampler;
pub mod wav;

pub use mp3::Transcoder;
pub use playback::Player;
