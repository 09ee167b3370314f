//! Waveform pipeline configuration
//!
//! Resolves the consolidation window size (samples per pixel) from either an
//! explicit zoom level or a pixels-per-second target. Resolution happens once,
//! before any stream is opened; bad values never reach the decode path.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default zoom level: raw samples consolidated into one waveform point.
pub const DEFAULT_ZOOM: u32 = 2048;

/// Configuration for a waveform reduction run.
///
/// `pixels_per_second` takes precedence over `zoom` when both are set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Number of samples consolidated into one data point
    pub zoom: u32,

    /// Waveform points per second of audio; when set, the window size becomes
    /// `ceil(sample_rate / pixels_per_second)` and `zoom` is ignored
    pub pixels_per_second: Option<f64>,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pixels_per_second: None,
        }
    }
}

impl WaveformConfig {
    /// Check the configuration without resolving it.
    ///
    /// # Errors
    /// [`Error::InvalidConfiguration`] if `zoom` is zero or
    /// `pixels_per_second` is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.zoom == 0 {
            return Err(Error::InvalidConfiguration(
                "zoom must be a positive integer".to_string(),
            ));
        }

        if let Some(pps) = self.pixels_per_second {
            if !pps.is_finite() || pps <= 0.0 {
                return Err(Error::InvalidConfiguration(format!(
                    "pixels_per_second must be positive, got {pps}"
                )));
            }
        }

        Ok(())
    }

    /// Resolve the window size for a stream at `sample_rate`.
    pub fn samples_per_pixel(&self, sample_rate: u32) -> Result<u32> {
        self.validate()?;

        match self.pixels_per_second {
            Some(pps) => {
                let spp = (f64::from(sample_rate) / pps).ceil().max(1.0);
                if spp > f64::from(u32::MAX) {
                    return Err(Error::InvalidConfiguration(format!(
                        "pixels_per_second {pps} yields an unrepresentable window size"
                    )));
                }
                Ok(spp as u32)
            }
            None => Ok(self.zoom),
        }
    }
}
