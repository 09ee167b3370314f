//! Native audio decoding using symphonia
//!
//! [`SymphoniaSource`] streams decoded PCM packet by packet from local media
//! files (MP3, FLAC, AAC, M4A, Vorbis, WAV) or any other byte stream, and
//! converts every symphonia sample format to interleaved signed 16-bit.
//! Decoded samples the caller has not consumed yet are carried over between
//! reads, so window boundaries never have to line up with packet boundaries.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::source::PcmSource;

/// Streaming PCM source backed by the symphonia decoder.
pub struct SymphoniaSource {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    channels: u16,
    sample_rate: u32,

    /// Interleaved samples decoded but not yet handed out
    pending: Vec<i16>,
    pending_pos: usize,
    exhausted: bool,
}

impl SymphoniaSource {
    /// Open a local media file, probing the container format by extension.
    ///
    /// # Errors
    /// [`Error::SourceUnavailable`] if the file cannot be opened, probed, or
    /// carries no decodable audio track.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::SourceUnavailable(format!("failed to open {}: {}", path.display(), e))
        })?;

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        Self::from_media_source(Box::new(file), hint)
    }

    /// Build a source over an arbitrary byte stream, e.g. a subprocess pipe.
    pub fn from_media_source(media: Box<dyn MediaSource>, hint: Hint) -> Result<Self> {
        let mss = MediaSourceStream::new(media, Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::SourceUnavailable(format!("failed to probe format: {e}")))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::SourceUnavailable("no audio track found".to_string()))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| Error::SourceUnavailable("sample rate not reported".to_string()))?;

        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .filter(|&c| c > 0)
            .ok_or_else(|| Error::SourceUnavailable("channel count not reported".to_string()))?;

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::SourceUnavailable(format!("failed to create decoder: {e}")))?;

        debug!(sample_rate, channels, "opened decoded stream");

        Ok(Self {
            format,
            decoder,
            track_id,
            channels,
            sample_rate,
            pending: Vec::new(),
            pending_pos: 0,
            exhausted: false,
        })
    }

    /// Decode packets until at least one frame lands in `pending`.
    ///
    /// Returns `Ok(false)` on end of stream. Malformed packets are skipped;
    /// anything else is fatal.
    fn refill(&mut self) -> Result<bool> {
        self.pending.clear();
        self.pending_pos = 0;

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    debug!("end of stream");
                    return Ok(false);
                }
                Err(e) => return Err(Error::Decode(format!("failed to read packet: {e}"))),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    convert_to_interleaved_i16(&decoded, &mut self.pending);
                    if !self.pending.is_empty() {
                        return Ok(true);
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("skipping malformed packet: {e}");
                }
                Err(e) => return Err(Error::Decode(format!("decode failed: {e}"))),
            }
        }
    }
}

impl PcmSource for SymphoniaSource {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_frames(&mut self, buf: &mut [i16]) -> Result<usize> {
        let channels = self.channels as usize;
        let max_samples = (buf.len() / channels) * channels;
        let mut written = 0;

        while written < max_samples {
            if self.pending_pos >= self.pending.len() {
                if self.exhausted || !self.refill()? {
                    self.exhausted = true;
                    break;
                }
            }

            let n = (max_samples - written).min(self.pending.len() - self.pending_pos);
            buf[written..written + n]
                .copy_from_slice(&self.pending[self.pending_pos..self.pending_pos + n]);
            written += n;
            self.pending_pos += n;
        }

        Ok(written / channels)
    }
}

/// Convert a decoded symphonia buffer to interleaved i16 samples.
fn convert_to_interleaved_i16(decoded: &AudioBufferRef, out: &mut Vec<i16>) {
    match decoded {
        AudioBufferRef::S16(buf) => extend_planar(buf, out, |s| s),
        AudioBufferRef::S8(buf) => extend_planar(buf, out, |s| i16::from(s) << 8),
        AudioBufferRef::S24(buf) => extend_planar(buf, out, |s| (s.inner() >> 8) as i16),
        AudioBufferRef::S32(buf) => extend_planar(buf, out, |s| (s >> 16) as i16),
        AudioBufferRef::U8(buf) => extend_planar(buf, out, |s| (i16::from(s) - 128) << 8),
        AudioBufferRef::U16(buf) => extend_planar(buf, out, |s| (i32::from(s) - 32768) as i16),
        AudioBufferRef::U24(buf) => {
            extend_planar(buf, out, |s| ((s.inner() as i32 - 8_388_608) >> 8) as i16)
        }
        AudioBufferRef::U32(buf) => {
            extend_planar(buf, out, |s| ((i64::from(s) - 2_147_483_648) >> 16) as i16)
        }
        AudioBufferRef::F32(buf) => {
            extend_planar(buf, out, |s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        }
        AudioBufferRef::F64(buf) => {
            extend_planar(buf, out, |s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        }
    }
}

/// Interleave a planar buffer, converting each sample through `to_i16`.
fn extend_planar<S: Sample>(buf: &AudioBuffer<S>, out: &mut Vec<i16>, to_i16: impl Fn(S) -> i16) {
    let channels = buf.spec().channels.count();
    let frames = buf.frames();

    out.reserve(frames * channels);
    for frame in 0..frames {
        for ch in 0..channels {
            out.push(to_i16(buf.chan(ch)[frame]));
        }
    }
}
