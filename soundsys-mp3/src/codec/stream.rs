//! Decoded PCM byte stream over a frame decoder
//!
//! [`DecodedMpegStream`] owns a frame decoder and an interleaving block. Each
//! `execute()` decodes one compressed frame into the block when the previous
//! block has been consumed; `read()` copies interleaved bytes out of it.

use crate::audio::frame::{FrameDecoder, FrameError, FrameStatus};
use crate::audio::interleaver::{PcmInterleaver, SampleSink};
use crate::audio::types::AudioFormat;
use std::io;
use tracing::debug;

/// Consecutive empty frames tolerated before the decoder is considered stuck
const MAX_EMPTY_FRAMES: usize = 64;

/// PCM byte stream decoded on demand from compressed frames
pub struct DecodedMpegStream {
    decoder: Option<Box<dyn FrameDecoder>>,
    interleaver: PcmInterleaver,
    format: AudioFormat,
    read_pos: usize,
    block_len: usize,
    finished: bool,
}

impl DecodedMpegStream {
    pub fn new(decoder: Box<dyn FrameDecoder>, format: AudioFormat) -> Self {
        Self {
            decoder: Some(decoder),
            interleaver: PcmInterleaver::new(format.channels as usize),
            format,
            read_pos: 0,
            block_len: 0,
            finished: false,
        }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Total PCM frames in the stream, when the decoder knows it
    pub fn frame_length(&self) -> Option<u64> {
        self.decoder.as_ref().and_then(|decoder| decoder.total_frames())
    }

    pub fn is_closed(&self) -> bool {
        self.decoder.is_none()
    }

    /// True once the decoder has reported the end of the compressed stream
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn pending(&self) -> usize {
        self.block_len - self.read_pos
    }

    /// Decode the next frame if the current block has been consumed.
    pub fn execute(&mut self) -> Result<(), FrameError> {
        if self.pending() > 0 || self.finished {
            return Ok(());
        }

        let decoder = self.decoder.as_mut().ok_or_else(closed)?;
        self.interleaver.reset();
        self.read_pos = 0;
        self.block_len = 0;

        match decoder.decode_frame(&mut self.interleaver)? {
            FrameStatus::EndOfStream => {
                debug!("Frame decoder reported end of stream");
                self.finished = true;
            }
            FrameStatus::Decoded => {
                if self.interleaver.overflowed() {
                    return Err(FrameError::OutOfBounds(format!(
                        "frame exceeded the {} byte output block",
                        self.interleaver.capacity()
                    )));
                }
                self.block_len = self.interleaver.filled_len();
            }
        }
        Ok(())
    }

    /// Copy decoded bytes into `buf`, decoding frames as needed.
    ///
    /// Returns `Ok(0)` at end of stream (or for an empty `buf`).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FrameError> {
        if self.decoder.is_none() {
            return Err(closed());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut empty_frames = 0;
        while self.pending() == 0 && !self.finished {
            self.execute()?;
            if self.pending() == 0 && !self.finished {
                empty_frames += 1;
                if empty_frames >= MAX_EMPTY_FRAMES {
                    return Err(FrameError::Malformed(format!(
                        "{} consecutive frames decoded no samples",
                        empty_frames
                    )));
                }
            }
        }

        let count = self.pending().min(buf.len());
        if count == 0 {
            return Ok(0);
        }
        let start = self.read_pos;
        buf[..count].copy_from_slice(&self.interleaver.buffer()[start..start + count]);
        self.read_pos += count;
        Ok(count)
    }

    /// Release the frame decoder. Later reads fail with a read fault.
    pub fn close(&mut self) -> Result<(), FrameError> {
        self.interleaver.set_stop_flag();
        self.interleaver.close();
        self.read_pos = 0;
        self.block_len = 0;
        match self.decoder.take() {
            Some(mut decoder) => decoder.close(),
            None => Ok(()),
        }
    }
}

fn closed() -> FrameError {
    FrameError::Io(io::Error::new(io::ErrorKind::NotConnected, "decoded stream is closed"))
}
