//! Common error types for SoundSys

use thiserror::Error;

/// Common result type for SoundSys operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the SoundSys crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML document could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}
