//! MPEG audio codec session
//!
//! [`CodecMp3`] owns one decoding session: the format probed from the first
//! frame, the decoded stream, and the shared `initialized` / `end_of_stream`
//! flags. Reads lock the session for their duration; flag accessors do not,
//! so a playback thread can poll them while a read is in flight.

use super::flags::SessionFlags;
use super::reader::{FullReader, StreamingReader};
use super::stream::DecodedMpegStream;
use super::Codec;
use crate::audio::decoder::SymphoniaProvider;
use crate::audio::frame::FrameDecoderProvider;
use crate::audio::source::SourceLocator;
use crate::audio::types::{AudioFormat, SoundBuffer};
use crate::error::Result;
use soundsys_common::{BufferConfig, SoundSystemConfig};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

#[derive(Default)]
struct Session {
    format: Option<AudioFormat>,
    stream: Option<DecodedMpegStream>,
}

impl Session {
    /// Close and drop the decoded stream, ignoring close failures
    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                debug!("Ignoring failure closing decoded stream: {}", e);
            }
        }
    }
}

/// Codec for MPEG Layer I/II/III audio
pub struct CodecMp3 {
    provider: Arc<dyn FrameDecoderProvider>,
    buffers: BufferConfig,
    session: Mutex<Session>,
    flags: Arc<SessionFlags>,
}

impl CodecMp3 {
    /// Codec using symphonia for frame decoding and default buffer sizes
    pub fn new() -> Self {
        Self::build(Arc::new(SymphoniaProvider), BufferConfig::default())
    }

    /// Codec using symphonia and the buffer sizes from `config`
    pub fn from_config(config: &SoundSystemConfig) -> Result<Self> {
        Self::with_provider(Arc::new(SymphoniaProvider), config.buffers)
    }

    /// Codec using a custom frame decoder.
    ///
    /// Fails with [`Error::Config`](crate::Error::Config) if `buffers` does
    /// not validate.
    pub fn with_provider(
        provider: Arc<dyn FrameDecoderProvider>,
        buffers: BufferConfig,
    ) -> Result<Self> {
        buffers.validate()?;
        Ok(Self::build(provider, buffers))
    }

    fn build(provider: Arc<dyn FrameDecoderProvider>, buffers: BufferConfig) -> Self {
        Self {
            provider,
            buffers,
            session: Mutex::new(Session::default()),
            flags: Arc::new(SessionFlags::new()),
        }
    }

    pub fn buffer_config(&self) -> BufferConfig {
        self.buffers
    }

    /// Shared handle on the session flags, for polling from another thread
    pub fn status(&self) -> Arc<SessionFlags> {
        Arc::clone(&self.flags)
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Probe the first frame, then reopen the source for decoding
    fn open_session(&self, source: &dyn SourceLocator) -> Result<(AudioFormat, DecodedMpegStream)> {
        let header = self.provider.probe(source)?;
        let format = AudioFormat::pcm_s16le(header.sample_rate, header.channels());
        debug!(
            "Probed {}: {:?}, {} Hz",
            source.describe(),
            header.mode,
            header.sample_rate
        );

        let decoder = self.provider.open(source)?;
        Ok((format, DecodedMpegStream::new(decoder, format)))
    }
}

impl Default for CodecMp3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for CodecMp3 {
    fn reverse_byte_order(&self, reverse: bool) {
        debug!("Ignoring byte order reversal request ({}), output stays little-endian", reverse);
    }

    fn initialize(&self, source: Option<&dyn SourceLocator>) -> bool {
        self.flags.set_initialized(false);

        let mut session = self.lock_session();
        session.release();
        session.format = None;

        let Some(source) = source else {
            error!("Source locator missing in method 'initialize'");
            return false;
        };

        match self.open_session(source) {
            Ok((format, stream)) => {
                session.format = Some(format);
                session.stream = Some(stream);
                drop(session);

                self.flags.begin_session();
                info!(
                    "Initialized {}: {} Hz, {} channel(s)",
                    source.describe(),
                    format.sample_rate,
                    format.channels
                );
                true
            }
            Err(e) => {
                error!("Unable to set up input streams for {}: {}", source.describe(), e);
                false
            }
        }
    }

    fn initialized(&self) -> bool {
        self.flags.initialized()
    }

    fn read(&self) -> Option<SoundBuffer> {
        let mut session = self.lock_session();
        let Some(stream) = session.stream.as_mut() else {
            self.flags.mark_end_of_stream();
            return None;
        };

        StreamingReader::new(self.buffers.streaming_buffer_size).read(stream, &self.flags)
    }

    fn read_all(&self) -> Option<SoundBuffer> {
        let mut session = self.lock_session();
        if session.format.is_none() {
            error!("Audio format missing in method 'read_all'");
            return None;
        }
        let Some(stream) = session.stream.as_mut() else {
            error!("No decoded stream available in method 'read_all'");
            self.flags.mark_end_of_stream();
            return None;
        };

        FullReader::new(self.buffers.file_chunk_size, self.buffers.max_file_size)
            .read_all(stream, &self.flags)
    }

    fn end_of_stream(&self) -> bool {
        self.flags.end_of_stream()
    }

    fn cleanup(&self) {
        self.lock_session().release();
    }

    fn audio_format(&self) -> Option<AudioFormat> {
        self.lock_session().format
    }
}

impl Drop for CodecMp3 {
    fn drop(&mut self) {
        self.cleanup();
    }
}
