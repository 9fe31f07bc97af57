//! Core audio data types
//!
//! Defines the PCM format descriptor and the buffer handed to playback
//! consumers.
//!
//! **Wire format:** raw signed 16-bit samples, little-endian, interleaved per
//! frame: `[ch0, ch1, ch0, ch1, ...]` for stereo, `[ch0, ch0, ...]` for mono.

use serde::Serialize;

/// Bits per PCM sample produced by the codec
pub const BITS_PER_SAMPLE: u16 = 16;

/// Bytes per PCM sample produced by the codec
pub const BYTES_PER_SAMPLE: usize = (BITS_PER_SAMPLE / 8) as usize;

/// PCM sample encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleEncoding {
    PcmSigned,
}

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// Describes how to interpret a PCM byte buffer.
///
/// Computed once from the first compressed frame and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioFormat {
    pub encoding: SampleEncoding,

    /// Samples per second per channel
    pub sample_rate: u32,

    /// Bits per sample (always 16)
    pub bits_per_sample: u16,

    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Bytes per PCM frame (`channels * 2`)
    pub frame_size: usize,

    /// PCM frames per second (equal to `sample_rate`)
    pub frame_rate: u32,

    pub byte_order: ByteOrder,
}

impl AudioFormat {
    /// Signed 16-bit little-endian PCM at the given rate and channel count
    pub fn pcm_s16le(sample_rate: u32, channels: u16) -> Self {
        Self {
            encoding: SampleEncoding::PcmSigned,
            sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            channels,
            frame_size: channels as usize * BYTES_PER_SAMPLE,
            frame_rate: sample_rate,
            byte_order: ByteOrder::LittleEndian,
        }
    }

    /// Byte length of `frames` PCM frames in this format, saturating at `u64::MAX`
    pub fn bytes_for_frames(&self, frames: u64) -> u64 {
        frames.saturating_mul(self.frame_size as u64)
    }

    /// Largest multiple of the frame size not exceeding `len`, at least one frame
    pub fn align_down(&self, len: usize) -> usize {
        let frame = self.frame_size.max(1);
        (len / frame * frame).max(frame)
    }
}

/// Decoded PCM audio plus the format describing it.
///
/// `data.len()` is always a multiple of `format.frame_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundBuffer {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

impl SoundBuffer {
    pub fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of PCM frames in the buffer
    pub fn frame_count(&self) -> usize {
        self.data.len() / self.format.frame_size.max(1)
    }

    /// Duration in milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.format.sample_rate == 0 {
            return 0;
        }
        (self.frame_count() as u64 * 1000) / self.format.sample_rate as u64
    }

    /// Decode the buffer back into interleaved `i16` samples
    pub fn samples(&self) -> Vec<i16> {
        let decode: fn([u8; 2]) -> i16 = match self.format.byte_order {
            ByteOrder::LittleEndian => i16::from_le_bytes,
            ByteOrder::BigEndian => i16::from_be_bytes,
        };
        self.data
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| decode([pair[0], pair[1]]))
            .collect()
    }

    /// Swap the byte order of every sample in place
    pub fn reverse_byte_order(&mut self) {
        reverse_sample_bytes(&mut self.data);
        self.format.byte_order = match self.format.byte_order {
            ByteOrder::LittleEndian => ByteOrder::BigEndian,
            ByteOrder::BigEndian => ByteOrder::LittleEndian,
        };
    }
}

/// Swap the two bytes of every 16-bit sample in `buffer`.
///
/// A trailing odd byte is left untouched.
pub fn reverse_sample_bytes(buffer: &mut [u8]) {
    for pair in buffer.chunks_exact_mut(BYTES_PER_SAMPLE) {
        pair.swap(0, 1);
    }
}
