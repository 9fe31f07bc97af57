//! MPEG audio frame decoder using symphonia
//!
//! Implements the [`FrameDecoderProvider`] boundary on top of symphonia's
//! format probe and MPEG audio codec. Each decoded packet is converted to
//! signed 16-bit samples and handed to the sink frame by frame, at most
//! [`MAX_BLOCK_SAMPLES`] samples per channel per call.
//!
//! # Supported Formats
//!
//! Per Cargo.toml symphonia features:
//! - MPEG Layer I/II/III (mpa: mp1, mp2, mp3)
//! - WAV / PCM (wav, pcm), used for generated test fixtures

use super::frame::{ChannelMode, FrameDecoder, FrameDecoderProvider, FrameError, FrameHeader, FrameStatus};
use super::interleaver::{SampleSink, MAX_BLOCK_SAMPLES};
use super::source::{SourceLocator, SourceStream};
use crate::error::{Error, Result};
use std::io::{self, Read, Seek, SeekFrom};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Bridges a [`SourceStream`] into symphonia's media source
struct StreamAdapter(Box<dyn SourceStream>);

impl Read for StreamAdapter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Seek for StreamAdapter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.seek(pos)
    }
}

impl MediaSource for StreamAdapter {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        self.0.byte_len()
    }
}

/// Opens symphonia-backed frame decoders
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaProvider;

impl FrameDecoderProvider for SymphoniaProvider {
    fn open(&self, source: &dyn SourceLocator) -> Result<Box<dyn FrameDecoder>> {
        let name = source.describe();
        debug!("Opening compressed source: {}", name);

        let stream = source
            .open()
            .map_err(|e| Error::Source(format!("Failed to open {}: {}", name, e)))?;

        let mss = MediaSourceStream::new(Box::new(StreamAdapter(stream)), Default::default());

        // Create hint from file extension
        let mut hint = Hint::new();
        if let Some(ext) = source.extension() {
            hint.with_extension(&ext);
        }

        // Probe format; for MPEG audio this reads the first frame header
        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Probe(format!("Failed to probe {}: {}", name, e)))?;

        let format = probed.format;

        // Get the first decodable track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Probe(format!("No audio track found in {}", name)))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params
            .sample_rate
            .filter(|&rate| rate > 0)
            .ok_or_else(|| Error::Probe(format!("Sample rate not found in {}", name)))?;

        let channels = codec_params
            .channels
            .map(|c| c.count())
            .ok_or_else(|| Error::Probe(format!("Channel count not found in {}", name)))?;

        let mode = match channels {
            1 => ChannelMode::SingleChannel,
            2 => ChannelMode::Stereo,
            n => {
                return Err(Error::Probe(format!(
                    "Unsupported channel count {} in {}",
                    n, name
                )))
            }
        };

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to create decoder for {}: {}", name, e)))?;

        debug!(
            "Audio format: sample_rate={}, channels={}, frames={:?}",
            sample_rate, channels, codec_params.n_frames
        );

        Ok(Box::new(SymphoniaFrameDecoder {
            header: FrameHeader { mode, sample_rate },
            total_frames: codec_params.n_frames,
            track_id,
            reader: Some(OpenStream { format, decoder }),
            pending: PendingBlock::default(),
        }))
    }
}

struct OpenStream {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
}

/// Planar samples of the last decoded packet not yet handed to the sink
#[derive(Default)]
struct PendingBlock {
    planar: Vec<i16>,
    channels: usize,
    frames: usize,
    cursor: usize,
}

impl PendingBlock {
    fn load(&mut self, planar: &[i16], channels: usize) {
        self.planar.clear();
        self.planar.extend_from_slice(planar);
        self.channels = channels.max(1);
        self.frames = planar.len() / self.channels;
        self.cursor = 0;
    }

    fn is_empty(&self) -> bool {
        self.cursor >= self.frames
    }

    /// Push up to `max_frames` frames, channel samples in order within each frame
    fn deliver(&mut self, sink: &mut dyn SampleSink, max_frames: usize) -> usize {
        let end = (self.cursor + max_frames).min(self.frames);
        for frame in self.cursor..end {
            for channel in 0..self.channels {
                sink.append(channel, self.planar[channel * self.frames + frame]);
            }
        }
        let delivered = end - self.cursor;
        self.cursor = end;
        delivered
    }
}

/// Frame decoder over one open symphonia stream
pub struct SymphoniaFrameDecoder {
    header: FrameHeader,
    total_frames: Option<u64>,
    track_id: u32,
    reader: Option<OpenStream>,
    pending: PendingBlock,
}

impl SymphoniaFrameDecoder {
    /// Decode the next packet of our track into `pending`.
    ///
    /// Returns `false` at end of stream.
    fn next_packet(&mut self) -> std::result::Result<bool, FrameError> {
        let Some(stream) = self.reader.as_mut() else {
            return Err(FrameError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "stream closed",
            )));
        };

        loop {
            let packet = match stream.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    debug!("Reached end of stream");
                    return Ok(false);
                }
                Err(SymphoniaError::IoError(e)) => return Err(FrameError::Io(e)),
                Err(SymphoniaError::ResetRequired) => {
                    debug!("Stream parameters changed, treating as end of stream");
                    return Ok(false);
                }
                Err(e) => return Err(FrameError::Malformed(e.to_string())),
            };

            // Skip packets from other tracks
            if packet.track_id() != self.track_id {
                continue;
            }

            match stream.decoder.decode(&packet) {
                Ok(decoded) => {
                    if decoded.frames() == 0 {
                        continue;
                    }
                    let spec = *decoded.spec();
                    let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    samples.copy_planar_ref(decoded);
                    self.pending.load(samples.samples(), spec.channels.count());
                    return Ok(true);
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(SymphoniaError::IoError(e)) => return Err(FrameError::Io(e)),
                Err(e) => return Err(FrameError::Malformed(e.to_string())),
            }
        }
    }
}

impl FrameDecoder for SymphoniaFrameDecoder {
    fn header(&self) -> FrameHeader {
        self.header
    }

    fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    fn decode_frame(
        &mut self,
        sink: &mut dyn SampleSink,
    ) -> std::result::Result<FrameStatus, FrameError> {
        if self.pending.is_empty() && !self.next_packet()? {
            return Ok(FrameStatus::EndOfStream);
        }

        self.pending.deliver(sink, MAX_BLOCK_SAMPLES);
        sink.write_buffer(1);
        Ok(FrameStatus::Decoded)
    }

    fn close(&mut self) -> std::result::Result<(), FrameError> {
        if self.reader.take().is_some() {
            debug!("Closed compressed stream");
        }
        self.pending = PendingBlock::default();
        Ok(())
    }
}

// ========================================
// Tests
// ========================================
