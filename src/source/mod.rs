//! Decoded-stream source boundary
//!
//! The pipeline consumes already-decoded PCM through [`PcmSource`]; locating,
//! starting, and staging a decoder is entirely the adapter's business.
//! Two adapters are provided: [`SymphoniaSource`] decodes local media files
//! in-process, [`FfmpegSource`] streams from an external transcoder process.

mod decoder;
mod ffmpeg;

pub use decoder::SymphoniaSource;
pub use ffmpeg::{FfmpegSource, FFMPEG_ENV};

use crate::error::Result;

/// A readable stream of decoded PCM frames with known channel count and rate.
///
/// Samples are interleaved signed 16-bit; one frame is one sample instant
/// across all channels. Stream attributes are fixed for the life of the
/// source. Implementors release the underlying stream, and any producer
/// process behind it, on drop.
pub trait PcmSource {
    /// Channel count of the decoded stream.
    fn channels(&self) -> u16;

    /// Sample rate of the decoded stream in Hz.
    fn sample_rate(&self) -> u32;

    /// Fill `buf` with up to `buf.len() / channels` interleaved frames.
    ///
    /// Returns the number of whole frames written. `Ok(0)` means the stream
    /// is exhausted; a short read is not an error and not the end.
    fn read_frames(&mut self, buf: &mut [i16]) -> Result<usize>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::PcmSource;
    use crate::error::{Error, Result};

    /// In-memory source for pipeline tests.
    ///
    /// Hands out at most `max_frames_per_read` frames per call, can inject a
    /// fault at a given frame index, and counts drops so tests can assert the
    /// stream is closed exactly once.
    pub(crate) struct VecSource {
        samples: Vec<i16>,
        pos: usize,
        channels: u16,
        sample_rate: u32,
        pub max_frames_per_read: usize,
        pub fail_at_frame: Option<usize>,
        pub drop_counter: Option<Arc<AtomicUsize>>,
    }

    impl VecSource {
        pub fn new(samples: Vec<i16>, channels: u16, sample_rate: u32) -> Self {
            assert_eq!(samples.len() % channels as usize, 0);
            Self {
                samples,
                pos: 0,
                channels,
                sample_rate,
                max_frames_per_read: usize::MAX,
                fail_at_frame: None,
                drop_counter: None,
            }
        }
    }

    impl PcmSource for VecSource {
        fn channels(&self) -> u16 {
            self.channels
        }

        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn read_frames(&mut self, buf: &mut [i16]) -> Result<usize> {
            let channels = self.channels as usize;

            let mut want = (buf.len() / channels).min(self.max_frames_per_read);

            if let Some(fail_at) = self.fail_at_frame {
                let frame = self.pos / channels;
                if frame >= fail_at {
                    return Err(Error::Decode("injected fault".to_string()));
                }
                // Never read past the fault index; the read that reaches it fails
                want = want.min(fail_at - frame);
            }

            let have = (self.samples.len() - self.pos) / channels;
            let frames = want.min(have);
            let samples = frames * channels;

            buf[..samples].copy_from_slice(&self.samples[self.pos..self.pos + samples]);
            self.pos += samples;
            Ok(frames)
        }
    }

    impl Drop for VecSource {
        fn drop(&mut self) {
            if let Some(counter) = &self.drop_counter {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
