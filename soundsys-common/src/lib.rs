//! # SoundSys Common Library
//!
//! Shared code for the SoundSys codec crates:
//! - Buffer-size and logging configuration (TOML + environment)
//! - Tracing subscriber bootstrap
//! - Common error type

pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    BufferConfig, ConfigOverrides, LoggingConfig, SoundSystemConfig, MIN_BUFFER_SIZE,
};
pub use error::{Error, Result};
