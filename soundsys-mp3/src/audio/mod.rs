//! Audio building blocks
//!
//! PCM types, the interleaving sink, the frame decoder boundary, compressed
//! sources, and the symphonia-backed frame decoder.

pub mod decoder;
pub mod frame;
pub mod interleaver;
pub mod source;
pub mod types;

pub use types::{reverse_sample_bytes, AudioFormat, ByteOrder, SampleEncoding, SoundBuffer};
