//! Error types for soundsys-mp3
//!
//! Errors never cross the codec's plugin surface: `Codec` methods log them and
//! report failure through `bool`/`Option` returns. They are used internally
//! and by the lower-level building blocks (sources, frame decoders).

use thiserror::Error;

/// Main error type for soundsys-mp3
#[derive(Error, Debug)]
pub enum Error {
    /// Compressed source could not be located or opened
    #[error("Source error: {0}")]
    Source(String),

    /// First frame could not be read or describes an unsupported stream
    #[error("Probe error: {0}")]
    Probe(String),

    /// Frame decoder could not be constructed or failed unrecoverably
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] soundsys_common::Error),
}

/// Convenience Result type using soundsys-mp3 Error
pub type Result<T> = std::result::Result<T, Error>;
