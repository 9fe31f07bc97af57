//! Scripted frame decoder
//!
//! Produces `frames` frames of `samples_per_frame` samples per channel, then
//! ends the stream the way `tail` says. Sample values are deterministic so two
//! decodes of the same script yield identical bytes.

use soundsys_mp3::audio::frame::{
    ChannelMode, FrameDecoder, FrameDecoderProvider, FrameError, FrameHeader, FrameStatus,
};
use soundsys_mp3::audio::interleaver::{SampleSink, MAX_BLOCK_SAMPLES};
use soundsys_mp3::audio::source::SourceLocator;
use soundsys_mp3::Error;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// How the scripted stream ends after its last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// Clean end of stream
    End,
    /// Low-level read fault
    ReadFault,
    /// Decoder writes past its output block
    Overflow,
    /// Undecodable frame
    Malformed,
}

/// Provider handing out [`ScriptedDecoder`]s
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    mode: ChannelMode,
    sample_rate: u32,
    frames: usize,
    samples_per_frame: usize,
    report_length: bool,
    tail: Tail,
    glitch_after: Option<usize>,
    fail_open: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(mode: ChannelMode, sample_rate: u32) -> Self {
        Self {
            mode,
            sample_rate,
            frames: 0,
            samples_per_frame: 0,
            report_length: false,
            tail: Tail::End,
            glitch_after: None,
            fail_open: false,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn mono(sample_rate: u32) -> Self {
        Self::new(ChannelMode::SingleChannel, sample_rate)
    }

    pub fn stereo(sample_rate: u32) -> Self {
        Self::new(ChannelMode::JointStereo, sample_rate)
    }

    /// `frames` compressed frames of `samples_per_frame` samples per channel
    pub fn frames(mut self, frames: usize, samples_per_frame: usize) -> Self {
        self.frames = frames;
        self.samples_per_frame = samples_per_frame;
        self
    }

    /// Report the total PCM frame count, making the length known up front
    pub fn known_length(mut self) -> Self {
        self.report_length = true;
        self
    }

    pub fn tail(mut self, tail: Tail) -> Self {
        self.tail = tail;
        self
    }

    /// Raise one read fault after `frames` frames, then carry on decoding
    pub fn glitch_after(mut self, frames: usize) -> Self {
        self.glitch_after = Some(frames);
        self
    }

    /// Every open fails, so probing fails
    pub fn failing(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn channels(&self) -> usize {
        self.mode.channel_count() as usize
    }

    /// Bytes the whole script decodes to
    pub fn pcm_len(&self) -> usize {
        self.frames * self.samples_per_frame * self.channels() * 2
    }

    /// Decoders opened so far (probe included)
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Decoders closed so far
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl FrameDecoderProvider for ScriptedProvider {
    fn open(&self, source: &dyn SourceLocator) -> soundsys_mp3::Result<Box<dyn FrameDecoder>> {
        if self.fail_open {
            return Err(Error::Probe(format!(
                "no frame sync in {}",
                source.describe()
            )));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);

        let total = (self.frames * self.samples_per_frame) as u64;
        Ok(Box::new(ScriptedDecoder {
            header: FrameHeader {
                mode: self.mode,
                sample_rate: self.sample_rate,
            },
            channels: self.channels(),
            remaining: self.frames,
            decoded: 0,
            glitch_after: self.glitch_after,
            samples_per_frame: self.samples_per_frame,
            next_sample: 0,
            total_frames: self.report_length.then_some(total),
            tail: self.tail,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct ScriptedDecoder {
    header: FrameHeader,
    channels: usize,
    remaining: usize,
    decoded: usize,
    glitch_after: Option<usize>,
    samples_per_frame: usize,
    next_sample: i16,
    total_frames: Option<u64>,
    tail: Tail,
    closed: Arc<AtomicUsize>,
}

impl FrameDecoder for ScriptedDecoder {
    fn header(&self) -> FrameHeader {
        self.header
    }

    fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    fn decode_frame(&mut self, sink: &mut dyn SampleSink) -> Result<FrameStatus, FrameError> {
        if self.glitch_after == Some(self.decoded) {
            self.glitch_after = None;
            return Err(FrameError::Io(io::Error::new(
                io::ErrorKind::Other,
                "transient read glitch",
            )));
        }
        if self.remaining == 0 {
            return match self.tail {
                Tail::End => Ok(FrameStatus::EndOfStream),
                Tail::ReadFault => Err(FrameError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "bitstream ended mid-frame",
                ))),
                Tail::Overflow => {
                    for _ in 0..=MAX_BLOCK_SAMPLES {
                        sink.append(0, 0);
                    }
                    Ok(FrameStatus::Decoded)
                }
                Tail::Malformed => Err(FrameError::Malformed("lost frame sync".into())),
            };
        }

        self.remaining -= 1;
        self.decoded += 1;
        for _ in 0..self.samples_per_frame {
            let value = self.next_sample;
            self.next_sample = self.next_sample.wrapping_add(1);
            for channel in 0..self.channels {
                let sample = if channel == 0 { value } else { value.wrapping_neg() };
                sink.append(channel, sample);
            }
        }
        sink.write_buffer(1);
        Ok(FrameStatus::Decoded)
    }

    fn close(&mut self) -> Result<(), FrameError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
