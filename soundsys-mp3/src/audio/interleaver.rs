//! Per-channel sample interleaving
//!
//! The frame decoder pushes one 16-bit sample at a time for a given channel.
//! [`PcmInterleaver`] writes each sample little-endian at that channel's write
//! position inside a fixed block, so that after a full frame the block holds
//! `[ch0, ch1, ch0, ch1, ...]`.

use super::types::BYTES_PER_SAMPLE;

/// Largest number of samples per channel in one MPEG audio frame
pub const MAX_BLOCK_SAMPLES: usize = 1152;

/// Output sink driven by a frame decoder.
///
/// Only [`append`](SampleSink::append) and [`reset`](SampleSink::reset) carry
/// data. The remaining hooks belong to the decoder's lifecycle and default to
/// no-ops.
pub trait SampleSink {
    /// Append one sample for `channel`
    fn append(&mut self, channel: usize, sample: i16);

    /// Rewind every channel to the start of the block
    fn reset(&mut self);

    /// Called by the decoder when a frame has been fully appended
    fn write_buffer(&mut self, _value: i32) {}

    fn clear_buffer(&mut self) {}

    fn set_stop_flag(&mut self) {}

    fn close(&mut self) {}
}

/// Fixed-size interleaving block for one decoded frame.
///
/// The block holds `MAX_BLOCK_SAMPLES * channels * 2` bytes. Channel `c`
/// starts writing at byte `c * 2` and advances `channels * 2` bytes per
/// sample. Samples that would land past the end of the block are dropped and
/// recorded; callers check [`overflowed`](PcmInterleaver::overflowed).
#[derive(Debug, Clone)]
pub struct PcmInterleaver {
    channels: usize,
    buffer: Vec<u8>,
    write_offsets: Vec<usize>,
    overflowed: bool,
}

impl PcmInterleaver {
    /// Create an interleaver for `channels` channels (clamped to at least 1)
    pub fn new(channels: usize) -> Self {
        let channels = channels.max(1);
        let mut interleaver = Self {
            channels,
            buffer: vec![0; MAX_BLOCK_SAMPLES * channels * BYTES_PER_SAMPLE],
            write_offsets: vec![0; channels],
            overflowed: false,
        };
        interleaver.reset();
        interleaver
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Capacity of the block in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The whole block, including bytes past the current frame
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes covered by the samples appended since the last reset.
    ///
    /// Only whole interleaved frames count: a channel that received fewer
    /// samples than the others limits the length, so bytes left over from an
    /// earlier block are never reported.
    pub fn filled_len(&self) -> usize {
        let stride = self.channels * BYTES_PER_SAMPLE;
        let samples = self
            .write_offsets
            .iter()
            .enumerate()
            .map(|(channel, &offset)| (offset - channel * BYTES_PER_SAMPLE) / stride)
            .min()
            .unwrap_or(0);
        (samples * stride).min(self.buffer.len())
    }

    /// The interleaved bytes produced since the last reset
    pub fn filled(&self) -> &[u8] {
        &self.buffer[..self.filled_len()]
    }

    /// True if an append since the last reset fell outside the block
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}

impl SampleSink for PcmInterleaver {
    fn append(&mut self, channel: usize, sample: i16) {
        let Some(offset) = self.write_offsets.get_mut(channel) else {
            self.overflowed = true;
            return;
        };
        match self.buffer.get_mut(*offset..*offset + BYTES_PER_SAMPLE) {
            Some(slot) => {
                slot.copy_from_slice(&sample.to_le_bytes());
                *offset += self.channels * BYTES_PER_SAMPLE;
            }
            None => self.overflowed = true,
        }
    }

    fn reset(&mut self) {
        for (channel, offset) in self.write_offsets.iter_mut().enumerate() {
            *offset = channel * BYTES_PER_SAMPLE;
        }
        self.overflowed = false;
    }
}
