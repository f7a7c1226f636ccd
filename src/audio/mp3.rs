//! MP3 transcoding through an external FFmpeg process.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::error::{Result, StudioError};

/// Converts WAV bytes to MP3 by piping them through `ffmpeg`.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: String,
    bitrate: String,
}

impl Transcoder {
    pub fn new(program: impl Into<String>, bitrate: impl Into<String>) -> Self {
        Self { program: program.into(), bitrate: bitrate.into() }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check whether the transcoder can be executed.
    pub fn available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    /// Transcode a complete WAV file into MP3 bytes.
    ///
    /// # Errors
    /// `TranscoderMissing` if the program cannot be found, `Transcode` with the
    /// process's stderr if it exits unsuccessfully.
    pub fn transcode(&self, wav: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-f", "wav", "-i", "pipe:0", "-f", "mp3", "-b:a"])
            .arg(&self.bitrate)
            .arg("pipe:1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StudioError::TranscoderMissing(self.program.clone()),
                _ => StudioError::Transcode(format!("failed to start '{}': {}", self.program, e)),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| StudioError::Transcode("stdin not captured".into()))?;

        // Feed stdin from another thread so a full stdout pipe cannot stall us
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || {
                // A closed pipe means ffmpeg gave up early; its exit status says why
                if let Err(e) = stdin.write_all(wav) {
                    debug!("Transcoder stdin closed early: {}", e);
                }
            });
            let output = child.wait_with_output();
            let _ = writer.join();
            output
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(StudioError::Transcode(stderr.trim().to_string()));
        }

        if output.stdout.is_empty() {
            return Err(StudioError::Transcode(format!("'{}' produced no output", self.program)));
        }

        debug!("Transcoded {} WAV bytes to {} MP3 bytes", wav.len(), output.stdout.len());
        Ok(output.stdout)
    }
}
