//! Codec plugin surface
//!
//! A [`Codec`] turns a compressed source into PCM for a playback consumer.
//! No method returns an error: failures are logged and reported through
//! `bool` / `Option` results.

pub mod flags;
pub mod mp3;
pub mod reader;
pub mod stream;

pub use flags::SessionFlags;
pub use mp3::CodecMp3;
pub use reader::{FullReader, StreamingReader};
pub use stream::DecodedMpegStream;

use crate::audio::source::SourceLocator;
use crate::audio::types::{AudioFormat, SoundBuffer};

/// Capability surface a playback consumer drives.
///
/// Methods take `&self` so one codec can be shared between a playback thread
/// and a control thread.
pub trait Codec: Send + Sync {
    /// Accepted for compatibility. Output byte order does not change.
    fn reverse_byte_order(&self, reverse: bool);

    /// Probe `source` and open it for decoding. `None` is a usage error.
    fn initialize(&self, source: Option<&dyn SourceLocator>) -> bool;

    fn initialized(&self) -> bool;

    /// Decode the next bounded chunk
    fn read(&self) -> Option<SoundBuffer>;

    /// Decode everything that remains
    fn read_all(&self) -> Option<SoundBuffer>;

    fn end_of_stream(&self) -> bool;

    /// Release decoding resources. Idempotent.
    fn cleanup(&self);

    fn audio_format(&self) -> Option<AudioFormat>;
}
