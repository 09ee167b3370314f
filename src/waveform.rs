//! Waveform assembly
//!
//! Drives the window reader to exhaustion and packages the reduced stream
//! into a self-describing summary record. Windows are processed strictly in
//! stream order; the output sequence is the temporal axis of the waveform.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::WaveformConfig;
use crate::error::Result;
use crate::peaks::{quantize, window_extrema};
use crate::source::{FfmpegSource, PcmSource, SymphoniaSource};
use crate::window::WindowReader;

/// Self-describing waveform summary.
///
/// `data` is a flat sequence of quantized (min, max) pairs in window order:
/// `[min0, max0, min1, max1, ...]`; `length` is the number of pairs. Values
/// are 8-bit-domain integers downscaled from the 16-bit samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveformSummary {
    pub sample_rate: u32,
    pub samples_per_pixel: u32,
    /// Output sample resolution; always 8
    pub bits: u32,
    pub length: u32,
    pub data: Vec<i32>,
}

/// Reduce a decoded PCM stream to a waveform summary.
///
/// Consumes the source window by window; the window reader closes it on
/// exhaustion or on the first fault. A source producing zero frames is not
/// an error and yields an empty summary.
///
/// # Errors
/// [`crate::Error::InvalidConfiguration`] before any window is read, or the
/// first fault from the source boundary. No partial summary is ever returned.
pub fn compute_waveform<S: PcmSource>(
    source: S,
    config: &WaveformConfig,
) -> Result<WaveformSummary> {
    let sample_rate = source.sample_rate();
    let samples_per_pixel = config.samples_per_pixel(sample_rate)?;

    debug!(
        sample_rate,
        samples_per_pixel,
        channels = source.channels(),
        "starting waveform reduction"
    );

    let mut reader = WindowReader::new(source, samples_per_pixel);
    let mut data = Vec::new();

    while let Some(window) = reader.next_window()? {
        let (min, max) = window_extrema(window);
        let (min, max) = quantize(min, max);
        data.push(min);
        data.push(max);
    }

    let length = (data.len() / 2) as u32;
    info!(points = length, "waveform reduction complete");

    Ok(WaveformSummary {
        sample_rate,
        samples_per_pixel,
        bits: 8,
        length,
        data,
    })
}

/// Validate the configuration, then decode `path` natively and reduce it.
pub fn waveform_from_file<P: AsRef<Path>>(
    path: P,
    config: &WaveformConfig,
) -> Result<WaveformSummary> {
    config.validate()?;
    compute_waveform(SymphoniaSource::open(path)?, config)
}

/// Validate the configuration, then reduce `source` through the external
/// transcoder. Accepts anything ffmpeg can read, including URLs.
pub fn waveform_via_ffmpeg(source: &str, config: &WaveformConfig) -> Result<WaveformSummary> {
    config.validate()?;
    compute_waveform(FfmpegSource::open(source)?, config)
}
