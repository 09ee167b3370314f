//! wavepeaks - waveform summary generator
//!
//! Thin CLI over the library: decode an audio source, reduce it to one
//! (min, max) pair per pixel, and print the JSON summary on stdout. Logs go
//! to stderr so the output stays pipeable.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wavepeaks::config::WaveformConfig;
use wavepeaks::waveform::{waveform_from_file, waveform_via_ffmpeg};

/// Command-line arguments for wavepeaks
#[derive(Parser, Debug)]
#[command(name = "wavepeaks")]
#[command(about = "Generate zoomable waveform summary data from an audio source")]
#[command(version)]
struct Args {
    /// Audio source: a local media file, or anything ffmpeg accepts with --ffmpeg
    source: String,

    /// Samples consolidated into one waveform point
    #[arg(short, long, env = "WAVEPEAKS_ZOOM")]
    zoom: Option<u32>,

    /// Waveform points per second of audio; overrides --zoom
    #[arg(short, long, env = "WAVEPEAKS_PIXELS_PER_SECOND")]
    pixels_per_second: Option<f64>,

    /// Decode through an external ffmpeg process instead of the native decoder
    #[arg(long)]
    ffmpeg: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavepeaks=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = WaveformConfig::default();
    if let Some(zoom) = args.zoom {
        config.zoom = zoom;
    }
    config.pixels_per_second = args.pixels_per_second;

    debug!(?config, source = %args.source, "computing waveform");

    let summary = if args.ffmpeg {
        waveform_via_ffmpeg(&args.source, &config)
    } else {
        waveform_from_file(&args.source, &config)
    }
    .with_context(|| format!("failed to compute waveform for {}", args.source))?;

    println!(
        "{}",
        serde_json::to_string(&summary).context("failed to serialize summary")?
    );

    Ok(())
}
