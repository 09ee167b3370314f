//! Extrema reduction and 8-bit quantization
//!
//! Reduces one window of interleaved samples to its (min, max) pair and
//! downscales the pair from the 16-bit sample domain to the 8-bit output
//! domain used by waveform renderers.

/// Minimum and maximum sample across all channels and frames of one window.
///
/// The reduction pools every channel sample in the window; channels are not
/// averaged into a mono signal first. Plain linear scan, no sorting.
pub fn window_extrema(window: &[i16]) -> (i16, i16) {
    debug_assert!(!window.is_empty(), "extrema of an empty window");

    let mut min = i16::MAX;
    let mut max = i16::MIN;
    for &sample in window {
        if sample < min {
            min = sample;
        }
        if sample > max {
            max = sample;
        }
    }
    (min, max)
}

/// Downscale a raw (min, max) pair to the 8-bit output domain.
///
/// The mapping is `floor(min/256) + 1` and `floor(max/256)`, kept bit-for-bit
/// compatible with the reference waveform data, including the asymmetric +1
/// on the min side. Floor division (`div_euclid`) matches the reference
/// integer semantics for negative samples.
///
/// The +1 can push the min past the max inside a window whose samples are all
/// non-negative, so the min is clamped; an all-silent window emits `(0, 0)`.
pub fn quantize(min: i16, max: i16) -> (i32, i32) {
    let qmax = i32::from(max).div_euclid(256);
    let qmin = (i32::from(min).div_euclid(256) + 1).min(qmax);
    (qmin, qmax)
}
