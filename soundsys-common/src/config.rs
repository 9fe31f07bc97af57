//! Configuration loading for SoundSys codecs
//!
//! Buffer sizing used by the codecs comes from, in priority order:
//! 1. Explicit overrides (command-line arguments)
//! 2. Environment variables (`SOUNDSYS_*`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing configuration file is never fatal: a warning is logged and the
//! compiled defaults are used. A malformed file or an invalid value is a
//! configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit configuration file
pub const ENV_CONFIG_PATH: &str = "SOUNDSYS_CONFIG";
/// Environment override for [`BufferConfig::streaming_buffer_size`]
pub const ENV_STREAMING_BUFFER_SIZE: &str = "SOUNDSYS_STREAMING_BUFFER_SIZE";
/// Environment override for [`BufferConfig::file_chunk_size`]
pub const ENV_FILE_CHUNK_SIZE: &str = "SOUNDSYS_FILE_CHUNK_SIZE";
/// Environment override for [`BufferConfig::max_file_size`]
pub const ENV_MAX_FILE_SIZE: &str = "SOUNDSYS_MAX_FILE_SIZE";

/// Smallest accepted buffer size: one 16-bit stereo PCM frame
pub const MIN_BUFFER_SIZE: usize = 4;

/// Top-level configuration document
///
/// ```toml
/// [buffers]
/// streaming_buffer_size = 131072
/// file_chunk_size = 1048576
/// max_file_size = 268435456
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct SoundSystemConfig {
    /// Buffer sizing for codec reads
    #[serde(default)]
    pub buffers: BufferConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Buffer sizes consumed by codec read operations
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct BufferConfig {
    /// Bytes produced per incremental `read()` call
    #[serde(default = "default_streaming_buffer_size")]
    pub streaming_buffer_size: usize,

    /// Bytes decoded per accumulation step when the total length is unknown
    #[serde(default = "default_file_chunk_size")]
    pub file_chunk_size: usize,

    /// Ceiling for a whole-clip read when the total length is unknown
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            streaming_buffer_size: default_streaming_buffer_size(),
            file_chunk_size: default_file_chunk_size(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl BufferConfig {
    /// Reject sizes the codecs cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.streaming_buffer_size < MIN_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "streaming_buffer_size ({}) must be at least {} bytes",
                self.streaming_buffer_size, MIN_BUFFER_SIZE
            )));
        }
        if self.file_chunk_size < MIN_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "file_chunk_size ({}) must be at least {} bytes",
                self.file_chunk_size, MIN_BUFFER_SIZE
            )));
        }
        if self.max_file_size < self.file_chunk_size {
            return Err(Error::Config(format!(
                "max_file_size ({}) is smaller than file_chunk_size ({})",
                self.max_file_size, self.file_chunk_size
            )));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_streaming_buffer_size() -> usize {
    131_072
}

fn default_file_chunk_size() -> usize {
    1_048_576
}

fn default_max_file_size() -> usize {
    268_435_456
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line overrides, highest priority
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub streaming_buffer_size: Option<usize>,
    pub file_chunk_size: Option<usize>,
    pub max_file_size: Option<usize>,
    pub log_level: Option<String>,
}

impl SoundSystemConfig {
    /// Parse a configuration document from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SoundSystemConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the effective configuration
    ///
    /// Reads the configuration file (explicit override, `SOUNDSYS_CONFIG`,
    /// then the platform location), applies environment overrides, then the
    /// command-line overrides, and validates the result.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let explicit = overrides
            .config_path
            .clone()
            .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));

        let mut config = match explicit {
            // A named file must exist
            Some(path) => Self::load_file(&path)?,
            None => match find_config_file() {
                Some(path) => Self::load_file(&path)?,
                None => {
                    warn!("No configuration file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        config.apply_env()?;
        config.apply_overrides(overrides);
        config.buffers.validate()?;

        debug!("Effective buffer configuration: {:?}", config.buffers);
        Ok(config)
    }

    /// Apply `SOUNDSYS_*` environment variables on top of the current values
    pub fn apply_env(&mut self) -> Result<()> {
        if let Some(size) = env_size(ENV_STREAMING_BUFFER_SIZE)? {
            self.buffers.streaming_buffer_size = size;
        }
        if let Some(size) = env_size(ENV_FILE_CHUNK_SIZE)? {
            self.buffers.file_chunk_size = size;
        }
        if let Some(size) = env_size(ENV_MAX_FILE_SIZE)? {
            self.buffers.max_file_size = size;
        }
        Ok(())
    }

    /// Apply command-line overrides on top of the current values
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(size) = overrides.streaming_buffer_size {
            self.buffers.streaming_buffer_size = size;
        }
        if let Some(size) = overrides.file_chunk_size {
            self.buffers.file_chunk_size = size;
        }
        if let Some(size) = overrides.max_file_size {
            self.buffers.max_file_size = size;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
    }
}

fn env_size(name: &str) -> Result<Option<usize>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", name, value, e))),
        Err(_) => Ok(None),
    }
}

/// Locate the platform configuration file, if one exists
///
/// Linux: `~/.config/soundsys/config.toml`, then `/etc/soundsys/config.toml`.
/// Elsewhere: `<config_dir>/soundsys/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("soundsys").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/soundsys/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
