//! Deterministic 16-bit WAV fixtures
//!
//! Written into a temporary directory that lives as long as the fixture.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A WAV file on disk plus the samples it holds
pub struct WavFixture {
    _dir: TempDir,
    pub path: PathBuf,
    pub samples: Vec<i16>,
}

impl WavFixture {
    /// Ramp of `frames` frames; channel 1 (if any) carries the negated ramp
    pub fn ramp(sample_rate: u32, channels: u16, frames: usize) -> Self {
        let mut samples = Vec::with_capacity(frames * channels as usize);
        for frame in 0..frames {
            let value = (frame as i16).wrapping_mul(7);
            for channel in 0..channels {
                samples.push(if channel == 0 { value } else { value.wrapping_neg() });
            }
        }
        Self::with_samples(sample_rate, channels, samples)
    }

    pub fn with_samples(sample_rate: u32, channels: u16, samples: Vec<i16>) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("fixture.wav");
        write_wav(&path, sample_rate, channels, &samples).expect("write wav fixture");
        Self {
            _dir: dir,
            path,
            samples,
        }
    }

    /// Samples as little-endian bytes
    pub fn pcm_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

pub fn write_wav(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    samples: &[i16],
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}
