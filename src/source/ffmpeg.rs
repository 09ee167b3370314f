//! External transcoder adapter
//!
//! [`FfmpegSource`] spawns ffmpeg to transcode an arbitrary media source
//! (any container or codec ffmpeg understands, local path or URL) to 16-bit
//! mono WAV on stdout, then streams that pipe through the native WAV reader.
//! No filesystem staging entry is created; the pipe is process-to-process.

use std::process::{Child, Command, Stdio};

use symphonia::core::io::ReadOnlySource;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::{PcmSource, SymphoniaSource};

/// Environment variable overriding the ffmpeg binary location.
pub const FFMPEG_ENV: &str = "WAVEPEAKS_FFMPEG";

const FFMPEG_BINARY: &str = "ffmpeg";

/// PCM source fed by an ffmpeg child process.
///
/// The adapter owns the child: dropping the source closes the read end and
/// reaps the process, whether decoding finished or was abandoned early.
pub struct FfmpegSource {
    inner: SymphoniaSource,
    child: Child,
}

impl FfmpegSource {
    /// Spawn ffmpeg for `source` and attach to its decoded output.
    ///
    /// The child runs detached from our terminal: stdin is null, stderr is
    /// discarded, stdout carries the WAV stream consumed here. Video streams
    /// are stripped and audio is remuxed to mono, matching the reference
    /// transcoder invocation.
    ///
    /// # Errors
    /// [`Error::SourceUnavailable`] if the binary cannot be started or its
    /// output does not parse as a WAV stream (e.g. the input does not exist).
    pub fn open(source: &str) -> Result<Self> {
        let binary = std::env::var(FFMPEG_ENV).unwrap_or_else(|_| FFMPEG_BINARY.to_string());

        debug!(%binary, %source, "spawning transcoder");

        let mut child = Command::new(&binary)
            .args([
                "-y",
                "-vn",
                "-i",
                source,
                "-acodec",
                "pcm_s16le",
                "-ac",
                "1",
                "-f",
                "wav",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::SourceUnavailable(format!("failed to start {binary}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::SourceUnavailable("transcoder stdout not captured".to_string()))?;

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let inner = match SymphoniaSource::from_media_source(Box::new(ReadOnlySource::new(stdout)), hint)
        {
            Ok(inner) => inner,
            Err(e) => {
                // The probe failed before any audio arrived; reap the child now.
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        Ok(Self { inner, child })
    }
}

impl PcmSource for FfmpegSource {
    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn read_frames(&mut self, buf: &mut [i16]) -> Result<usize> {
        self.inner.read_frames(buf)
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        // On normal exhaustion ffmpeg has already exited and wait() only
        // collects it; on early abort the kill unblocks its stdout writes.
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_source_unavailable() {
        std::env::set_var(FFMPEG_ENV, "/nonexistent/ffmpeg");
        let result = FfmpegSource::open("input.m4a");
        std::env::remove_var(FFMPEG_ENV);

        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }
}
