//! Frame decoder boundary
//!
//! The compressed bitstream is decoded by an external frame decoder. This
//! module defines what the codec needs from it: the first frame's header for
//! probing, and a way to decode one frame at a time into a [`SampleSink`].

use super::interleaver::SampleSink;
use super::source::SourceLocator;
use crate::error::Result;
use std::io;
use thiserror::Error;

/// Channel mode from an MPEG audio frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    SingleChannel,
}

impl ChannelMode {
    /// Only single-channel streams decode to mono
    pub fn channel_count(self) -> u16 {
        match self {
            ChannelMode::SingleChannel => 1,
            _ => 2,
        }
    }
}

/// Parameters read from the first compressed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub mode: ChannelMode,
    pub sample_rate: u32,
}

impl FrameHeader {
    pub fn channels(&self) -> u16 {
        self.mode.channel_count()
    }
}

/// Outcome of decoding one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame was decoded into the sink
    Decoded,
    /// The stream has no more frames
    EndOfStream,
}

/// Faults raised by a frame decoder.
///
/// MPEG decoders characteristically raise `Io` and `OutOfBounds` exactly at
/// clip boundaries. Incremental readers treat both as end-of-stream.
#[derive(Error, Debug)]
pub enum FrameError {
    /// Low-level read fault from the compressed stream
    #[error("read fault: {0}")]
    Io(#[from] io::Error),

    /// Decoder wrote outside its output block
    #[error("decoder index out of bounds: {0}")]
    OutOfBounds(String),

    /// Bitstream could not be decoded
    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl FrameError {
    /// True for the faults that signal the end of a clip rather than a failure
    pub fn is_boundary(&self) -> bool {
        matches!(self, FrameError::Io(_) | FrameError::OutOfBounds(_))
    }
}

/// A decoder positioned on an open compressed stream.
pub trait FrameDecoder: Send {
    /// Header of the first frame in the stream
    fn header(&self) -> FrameHeader;

    /// Total PCM frames in the stream, if the container records it
    fn total_frames(&self) -> Option<u64> {
        None
    }

    /// Decode the next frame into `sink`, one `append` per sample per channel.
    ///
    /// The caller resets the sink before each call. A decoder must not append
    /// more than [`MAX_BLOCK_SAMPLES`](super::interleaver::MAX_BLOCK_SAMPLES)
    /// samples per channel in one call.
    fn decode_frame(&mut self, sink: &mut dyn SampleSink)
        -> std::result::Result<FrameStatus, FrameError>;

    /// Release the underlying stream
    fn close(&mut self) -> std::result::Result<(), FrameError> {
        Ok(())
    }
}

/// Opens frame decoders over compressed sources.
pub trait FrameDecoderProvider: Send + Sync {
    /// Read the first frame header and release the stream
    fn probe(&self, source: &dyn SourceLocator) -> Result<FrameHeader> {
        let mut decoder = self.open(source)?;
        let header = decoder.header();
        // Probe streams are discarded; a close failure changes nothing
        let _ = decoder.close();
        Ok(header)
    }

    /// Open a fresh decoder positioned at the start of the source
    fn open(&self, source: &dyn SourceLocator) -> Result<Box<dyn FrameDecoder>>;
}
