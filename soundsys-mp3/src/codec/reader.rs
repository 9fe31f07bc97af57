//! Incremental and whole-clip PCM readers
//!
//! Both readers pump a [`DecodedMpegStream`] and share the end-of-stream
//! discipline: a pump step yielding no bytes ends the stream, and so do the
//! read and bounds faults MPEG decoders raise at clip boundaries. Those faults
//! are logged at debug level only.

use super::flags::SessionFlags;
use super::stream::DecodedMpegStream;
use crate::audio::frame::FrameError;
use crate::audio::types::SoundBuffer;
use tracing::{debug, error, warn};

/// Bytes gathered by one [`pump_into`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pumped {
    pub filled: usize,
    /// The stream ended on a boundary fault rather than a clean end
    pub boundary_fault: bool,
}

/// Pump `stream` until `buf` is full or end-of-stream is latched.
///
/// Boundary faults latch end-of-stream and return normally. Any other fault is
/// returned to the caller with end-of-stream untouched.
pub(crate) fn pump_into(
    stream: &mut DecodedMpegStream,
    flags: &SessionFlags,
    buf: &mut [u8],
) -> Result<Pumped, FrameError> {
    let mut filled = 0;
    while !flags.end_of_stream() && filled < buf.len() {
        let step = stream
            .execute()
            .and_then(|()| stream.read(&mut buf[filled..]));
        match step {
            Ok(0) => {
                flags.mark_end_of_stream();
                break;
            }
            Ok(count) => filled += count,
            Err(e) if e.is_boundary() => {
                debug!("Decoder fault at clip boundary, treating as end of stream: {}", e);
                flags.mark_end_of_stream();
                return Ok(Pumped {
                    filled,
                    boundary_fault: true,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(Pumped {
        filled,
        boundary_fault: false,
    })
}

/// Produces one bounded PCM chunk per call for incremental playback.
#[derive(Debug, Clone, Copy)]
pub struct StreamingReader {
    chunk_size: usize,
}

impl StreamingReader {
    /// `chunk_size` is rounded down to whole PCM frames when reading
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Read up to one chunk.
    ///
    /// Returns `None` when nothing was decoded, in which case end-of-stream is
    /// latched. A chunk shorter than requested only happens at end-of-stream.
    pub fn read(&self, stream: &mut DecodedMpegStream, flags: &SessionFlags) -> Option<SoundBuffer> {
        let format = stream.format();
        let mut data = vec![0u8; format.align_down(self.chunk_size)];

        let filled = match pump_into(stream, flags, &mut data) {
            Ok(Pumped {
                boundary_fault: true,
                ..
            }) => return None,
            Ok(pumped) => pumped.filled,
            Err(e) => {
                error!("Exception thrown while reading from the decoded stream: {}", e);
                flags.mark_end_of_stream();
                return None;
            }
        };

        if filled == 0 {
            flags.mark_end_of_stream();
            return None;
        }

        data.truncate(filled);
        Some(SoundBuffer::new(data, format))
    }
}

/// Decodes everything left in a stream into a single buffer.
#[derive(Debug, Clone, Copy)]
pub struct FullReader {
    file_chunk_size: usize,
    max_file_size: usize,
}

impl FullReader {
    pub fn new(file_chunk_size: usize, max_file_size: usize) -> Self {
        Self {
            file_chunk_size,
            max_file_size,
        }
    }

    /// Read the rest of the stream, then close it.
    ///
    /// Uses one exact allocation when the stream reports its frame count,
    /// otherwise grows the result chunk by chunk up to the size ceiling.
    /// End-of-stream is latched once the read completes. Returns `None`
    /// without decoding when end-of-stream was already latched.
    pub fn read_all(
        &self,
        stream: &mut DecodedMpegStream,
        flags: &SessionFlags,
    ) -> Option<SoundBuffer> {
        if flags.end_of_stream() {
            debug!("End of stream already reached, nothing left to read");
            if let Err(e) = stream.close() {
                debug!("Ignoring failure closing decoded stream: {}", e);
            }
            return None;
        }

        let format = stream.format();
        let known_len = stream
            .frame_length()
            .filter(|&frames| frames > 0)
            .map(|frames| format.bytes_for_frames(frames));

        let data = match known_len {
            Some(len) if len <= self.max_file_size as u64 => {
                self.read_known_length(stream, len as usize)
            }
            Some(len) => {
                warn!(
                    "Decoded length {} exceeds maximum file size {}, reading incrementally",
                    len, self.max_file_size
                );
                self.read_unknown_length(stream, flags)
            }
            None => self.read_unknown_length(stream, flags),
        };

        if let Err(e) = stream.close() {
            debug!("Ignoring failure closing decoded stream: {}", e);
        }
        flags.mark_end_of_stream();

        match data {
            Some(data) if !data.is_empty() => Some(SoundBuffer::new(data, format)),
            _ => None,
        }
    }

    fn read_known_length(&self, stream: &mut DecodedMpegStream, len: usize) -> Option<Vec<u8>> {
        debug!("Reading {} decoded bytes into a single buffer", len);
        let mut data = vec![0u8; len];
        let mut total = 0;

        while total < len {
            let step = stream
                .execute()
                .and_then(|()| stream.read(&mut data[total..]));
            match step {
                Ok(0) => break,
                Ok(count) => total += count,
                Err(e) => {
                    error!(
                        "Exception thrown while reading from the decoded stream after {} of {} bytes: {:?}",
                        total, len, e
                    );
                    return None;
                }
            }
        }

        if total == 0 {
            return None;
        }
        if total < len {
            warn!("Stream ended after {} of {} expected bytes", total, len);
        }
        Some(data)
    }

    fn read_unknown_length(
        &self,
        stream: &mut DecodedMpegStream,
        flags: &SessionFlags,
    ) -> Option<Vec<u8>> {
        let format = stream.format();
        let ceiling = format.align_down(self.max_file_size);
        let mut chunk = vec![0u8; format.align_down(self.file_chunk_size).min(ceiling)];
        let mut data: Vec<u8> = Vec::new();

        while !flags.end_of_stream() && data.len() < ceiling {
            let room = (ceiling - data.len()).min(chunk.len());
            match pump_into(stream, flags, &mut chunk[..room]) {
                Ok(pumped) => data.extend_from_slice(&chunk[..pumped.filled]),
                Err(e) => {
                    error!(
                        "Exception thrown while reading from the decoded stream after {} bytes: {:?}",
                        data.len(),
                        e
                    );
                    return None;
                }
            }
        }

        if data.len() >= ceiling && !flags.end_of_stream() {
            warn!("Reached maximum file size of {} bytes, truncating", ceiling);
        }
        Some(data)
    }
}
