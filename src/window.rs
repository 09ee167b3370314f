//! Frame window reader
//!
//! Partitions a decoded PCM stream into fixed-size consolidation windows,
//! reusing a single buffer across reads to avoid per-window allocation.
//! The reader owns closing the source: the stream is released exactly once,
//! on the first empty read or on a fault, never on a short read.

use tracing::debug;

use crate::error::Result;
use crate::source::PcmSource;

/// Pulls windows of up to `samples_per_pixel` frames from a [`PcmSource`].
pub struct WindowReader<S: PcmSource> {
    /// Taken on exhaustion or fault, which drops and thereby closes the source
    source: Option<S>,
    channels: usize,
    window_frames: usize,
    /// Reused across calls; capacity `window_frames * channels` samples
    buf: Vec<i16>,
}

impl<S: PcmSource> WindowReader<S> {
    pub fn new(source: S, samples_per_pixel: u32) -> Self {
        let channels = source.channels() as usize;
        let window_frames = samples_per_pixel as usize;

        Self {
            source: Some(source),
            channels,
            window_frames,
            buf: vec![0; window_frames * channels],
        }
    }

    /// Next window of interleaved samples, or `Ok(None)` once exhausted.
    ///
    /// The source may hand out fewer frames per read than a window holds, so
    /// reads are repeated until the window is full or the stream ends. Only
    /// the final window of a stream may be shorter than `samples_per_pixel`
    /// frames; it is returned unpadded. After `Ok(None)` or an error the
    /// source has been closed and every further call returns `Ok(None)`.
    pub fn next_window(&mut self) -> Result<Option<&[i16]>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        let mut filled = 0; // frames
        let mut fault = None;

        while filled < self.window_frames {
            match source.read_frames(&mut self.buf[filled * self.channels..]) {
                Ok(0) => break,
                Ok(frames) => filled += frames,
                Err(e) => {
                    fault = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = fault {
            self.source = None;
            return Err(e);
        }

        if filled == 0 {
            debug!("stream exhausted, closing source");
            self.source = None;
            return Ok(None);
        }

        Ok(Some(&self.buf[..filled * self.channels]))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::error::Error;
    use crate::source::testing::VecSource;

    #[test]
    fn test_full_windows() {
        let source = VecSource::new((0..16).collect(), 1, 48000);
        let mut reader = WindowReader::new(source, 8);

        assert_eq!(reader.next_window().unwrap().unwrap().len(), 8);
        assert_eq!(reader.next_window().unwrap().unwrap().len(), 8);
        assert!(reader.next_window().unwrap().is_none());
    }

    #[test]
    fn test_short_final_window_unpadded() {
        let source = VecSource::new((0..11).collect(), 1, 48000);
        let mut reader = WindowReader::new(source, 8);

        assert_eq!(reader.next_window().unwrap().unwrap().len(), 8);
        let last = reader.next_window().unwrap().unwrap();
        assert_eq!(last, &[8, 9, 10]);
        assert!(reader.next_window().unwrap().is_none());
    }

    #[test]
    fn test_window_spans_multiple_short_reads() {
        let mut source = VecSource::new((0..10).collect(), 1, 48000);
        source.max_frames_per_read = 3;
        let mut reader = WindowReader::new(source, 8);

        let window = reader.next_window().unwrap().unwrap();
        assert_eq!(window, &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(reader.next_window().unwrap().unwrap(), &[8, 9]);
        assert!(reader.next_window().unwrap().is_none());
    }

    #[test]
    fn test_stereo_window_length_counts_frames() {
        let source = VecSource::new((0..24).collect(), 2, 44100);
        let mut reader = WindowReader::new(source, 8);

        // 8 frames x 2 channels, then a short window of 4 frames
        assert_eq!(reader.next_window().unwrap().unwrap().len(), 16);
        assert_eq!(reader.next_window().unwrap().unwrap().len(), 8);
        assert!(reader.next_window().unwrap().is_none());
    }

    #[test]
    fn test_source_closed_exactly_once_on_exhaustion() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut source = VecSource::new(vec![1, 2, 3], 1, 48000);
        source.drop_counter = Some(counter.clone());
        let mut reader = WindowReader::new(source, 8);

        assert!(reader.next_window().unwrap().is_some());
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert!(reader.next_window().unwrap().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        // Further calls stay terminal and do not close twice
        assert!(reader.next_window().unwrap().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_source_closed_on_fault() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut source = VecSource::new((0..32).collect(), 1, 48000);
        source.fail_at_frame = Some(12);
        source.drop_counter = Some(counter.clone());
        let mut reader = WindowReader::new(source, 8);

        assert!(reader.next_window().unwrap().is_some());
        let err = reader.next_window().unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        assert!(reader.next_window().unwrap().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_source_is_immediately_exhausted() {
        let source = VecSource::new(vec![], 2, 48000);
        let mut reader = WindowReader::new(source, 8);
        assert!(reader.next_window().unwrap().is_none());
    }
}
