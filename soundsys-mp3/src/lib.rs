//! # SoundSys MP3 Codec (soundsys-mp3)
//!
//! Decodes MPEG Layer audio into 16-bit little-endian PCM for a real-time
//! sound pipeline.
//!
//! **Purpose:** Deliver decoded audio either as bounded chunks while a sound
//! plays ([`Codec::read`]) or as one buffer for the whole clip
//! ([`Codec::read_all`]).
//!
//! **Architecture:** compressed source → frame decoder (symphonia) →
//! per-channel interleaver → decoded byte stream → streaming / full reader

pub mod audio;
pub mod codec;
pub mod error;

pub use audio::{AudioFormat, SoundBuffer};
pub use codec::{Codec, CodecMp3};
pub use error::{Error, Result};
