//! SoundSys MP3 codec (soundsys-mp3) - command-line entry point
//!
//! Runs the codec outside a playback engine: print the probed format, or
//! decode a file to WAV / raw PCM through either read path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use soundsys_common::{logging, ConfigOverrides, SoundSystemConfig};
use soundsys_mp3::audio::source::FileSource;
use soundsys_mp3::audio::{AudioFormat, SoundBuffer};
use soundsys_mp3::{Codec, CodecMp3};
use tracing::info;

/// Command-line arguments for soundsys-mp3
#[derive(Parser, Debug)]
#[command(name = "soundsys-mp3")]
#[command(about = "Decode MPEG audio to 16-bit PCM")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "SOUNDSYS_CONFIG")]
    config: Option<PathBuf>,

    /// Bytes per incremental read
    #[arg(long)]
    streaming_buffer_size: Option<usize>,

    /// Bytes per accumulation step when the length is unknown
    #[arg(long)]
    file_chunk_size: Option<usize>,

    /// Ceiling for a whole-clip read
    #[arg(long)]
    max_file_size: Option<usize>,

    /// Log level (overrides the configuration file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the decoded PCM format as JSON
    Info {
        /// Compressed audio file
        input: PathBuf,
    },

    /// Decode a file to WAV or raw PCM
    Decode {
        /// Compressed audio file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Read path to exercise
        #[arg(long, value_enum, default_value_t = Mode::Stream)]
        mode: Mode,

        /// Write headerless PCM instead of WAV
        #[arg(long)]
        raw: bool,

        /// Swap sample byte order in raw output
        #[arg(long, requires = "raw")]
        big_endian: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Repeated bounded reads
    Stream,
    /// One whole-clip read
    Full,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        config_path: args.config.clone(),
        streaming_buffer_size: args.streaming_buffer_size,
        file_chunk_size: args.file_chunk_size,
        max_file_size: args.max_file_size,
        log_level: args.log_level.clone(),
    };
    let config = SoundSystemConfig::resolve(&overrides).context("Failed to load configuration")?;

    logging::init_tracing(&config.logging).context("Failed to initialize logging")?;

    let codec = CodecMp3::from_config(&config).context("Invalid buffer configuration")?;

    match args.command {
        Command::Info { input } => {
            let format = open(&codec, &input)?;
            println!("{}", serde_json::to_string_pretty(&format)?);
        }
        Command::Decode {
            input,
            output,
            mode,
            raw,
            big_endian,
        } => {
            let format = open(&codec, &input)?;
            let mut pcm = match mode {
                Mode::Stream => read_streaming(&codec, format),
                Mode::Full => codec
                    .read_all()
                    .unwrap_or_else(|| SoundBuffer::new(Vec::new(), format)),
            };
            codec.cleanup();

            info!(
                "Decoded {} bytes ({} ms) from {}",
                pcm.len(),
                pcm.duration_ms(),
                input.display()
            );

            if raw {
                if big_endian {
                    pcm.reverse_byte_order();
                }
                write_raw(&output, &pcm)?;
            } else {
                write_wav(&output, &pcm)?;
            }
        }
    }

    Ok(())
}

fn open(codec: &CodecMp3, input: &Path) -> Result<AudioFormat> {
    let source = FileSource::new(input);
    if !codec.initialize(Some(&source)) {
        bail!("Unable to decode {}", input.display());
    }
    codec
        .audio_format()
        .with_context(|| format!("No audio format for {}", input.display()))
}

fn read_streaming(codec: &CodecMp3, format: AudioFormat) -> SoundBuffer {
    let mut pcm = SoundBuffer::new(Vec::new(), format);
    while !codec.end_of_stream() {
        match codec.read() {
            Some(chunk) => pcm.data.extend_from_slice(&chunk.data),
            None => break,
        }
    }
    pcm
}

fn write_raw(path: &Path, pcm: &SoundBuffer) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&pcm.data)?;
    writer.flush()?;
    Ok(())
}

fn write_wav(path: &Path, pcm: &SoundBuffer) -> Result<()> {
    let spec = hound::WavSpec {
        channels: pcm.format.channels,
        sample_rate: pcm.format.sample_rate,
        bits_per_sample: pcm.format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for sample in pcm.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
