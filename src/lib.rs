//! # wavepeaks
//!
//! Streaming decode-and-reduce pipeline for waveform summary data.
//!
//! Decodes an audio source to PCM, partitions the stream into fixed-size
//! consolidation windows (one per rendered pixel column), and reduces each
//! window to a quantized (min, max) pair — enough to draw a zoomable
//! waveform image without ever holding the decoded audio in memory at once.
//!
//! **Architecture:** synchronous pull pipeline over the [`source::PcmSource`]
//! boundary; native decoding via symphonia, with an optional adapter that
//! streams from an external ffmpeg process for anything symphonia cannot read.

pub mod config;
pub mod error;
pub mod peaks;
pub mod source;
pub mod waveform;
pub mod window;

pub use config::WaveformConfig;
pub use error::{Error, Result};
pub use waveform::{compute_waveform, WaveformSummary};
