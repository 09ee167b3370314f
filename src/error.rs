//! Error types for wavepeaks
//!
//! Defines pipeline error types using thiserror for clear error propagation.
//! Errors from the source boundary propagate unmodified to the caller; the
//! pipeline performs no retries and never returns a partial summary.

use thiserror::Error;

/// Main error type for the waveform pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Bad zoom / pixels_per_second values, rejected before any stream is opened
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Decode source could not be opened or started
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// I/O or decode error mid-stream
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using wavepeaks Error
pub type Result<T> = std::result::Result<T, Error>;
