//! Whole-clip read tests
//!
//! Known-length and unknown-length paths, the size ceiling, and stream
//! release after the read.

mod helpers;

use helpers::{ScriptedProvider, Tail};
use soundsys_common::BufferConfig;
use soundsys_mp3::audio::source::MemorySource;
use soundsys_mp3::{Codec, CodecMp3};
use std::sync::Arc;

fn open_with(provider: &ScriptedProvider, buffers: BufferConfig) -> CodecMp3 {
    let codec = CodecMp3::with_provider(Arc::new(provider.clone()), buffers).unwrap();
    let source = MemorySource::new("clip", vec![0u8; 32]);
    assert!(codec.initialize(Some(&source)));
    codec
}

fn open(provider: &ScriptedProvider) -> CodecMp3 {
    open_with(provider, BufferConfig::default())
}

#[test]
fn test_two_frame_mono_clip() {
    // Two PCM frames of 16-bit mono at 8 kHz
    let provider = ScriptedProvider::mono(8000).frames(1, 2).known_length();
    let codec = open(&provider);

    let format = codec.audio_format().unwrap();
    assert_eq!(format.sample_rate, 8000);
    assert_eq!(format.channels, 1);
    assert_eq!(format.frame_size, 2);

    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), 4);
    assert_eq!(pcm.data, vec![0, 0, 1, 0]);
    assert!(codec.end_of_stream());
}

#[test]
fn test_known_length_is_exact() {
    let provider = ScriptedProvider::stereo(44100).frames(6, 1152).known_length();
    let codec = open(&provider);

    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), 2 * 6 * 1152 * 2);
    assert_eq!(pcm.frame_count(), 6 * 1152);
}

#[test]
fn test_known_length_is_deterministic() {
    let provider = ScriptedProvider::stereo(32000).frames(3, 576).known_length();

    let first = open(&provider).read_all().unwrap();
    let second = open(&provider).read_all().unwrap();
    assert_eq!(first.data, second.data);
}

#[test]
fn test_unknown_length_collects_everything() {
    let provider = ScriptedProvider::stereo(44100).frames(10, 1152);
    let buffers = BufferConfig {
        file_chunk_size: 1000,
        ..BufferConfig::default()
    };
    let codec = open_with(&provider, buffers);

    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), provider.pcm_len());
    assert!(codec.end_of_stream());
}

#[test]
fn test_unknown_length_respects_ceiling() {
    let provider = ScriptedProvider::mono(8000).frames(100, 64);
    let buffers = BufferConfig {
        streaming_buffer_size: 256,
        file_chunk_size: 256,
        max_file_size: 1000,
    };
    let codec = open_with(&provider, buffers);

    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), 1000);
    assert!(codec.end_of_stream());
}

#[test]
fn test_oversized_known_length_respects_ceiling() {
    let provider = ScriptedProvider::mono(8000).frames(100, 64).known_length();
    let buffers = BufferConfig {
        streaming_buffer_size: 256,
        file_chunk_size: 256,
        max_file_size: 1024,
    };
    let codec = open_with(&provider, buffers);

    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), 1024);
}

#[test]
fn test_unknown_length_keeps_bytes_before_boundary_fault() {
    let provider = ScriptedProvider::mono(8000).frames(3, 10).tail(Tail::ReadFault);
    let codec = open(&provider);

    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), 60);
    assert!(codec.end_of_stream());
}

#[test]
fn test_known_length_stops_at_reported_length() {
    let provider = ScriptedProvider::mono(8000)
        .frames(3, 10)
        .known_length()
        .tail(Tail::Overflow);
    let codec = open(&provider);

    // The faulting frame lies past the reported length and is never decoded
    let pcm = codec.read_all().unwrap();
    assert_eq!(pcm.len(), 60);
}

#[test]
fn test_empty_clip_returns_none() {
    let provider = ScriptedProvider::mono(8000).known_length().tail(Tail::ReadFault);
    let codec = open(&provider);

    assert!(codec.read_all().is_none());
    assert!(codec.end_of_stream());
}

#[test]
fn test_malformed_frame_fails_read_all() {
    let provider = ScriptedProvider::mono(8000).frames(2, 10).tail(Tail::Malformed);
    let codec = open(&provider);

    assert!(codec.read_all().is_none());
    assert!(codec.end_of_stream());
}

#[test]
fn test_read_all_releases_stream() {
    let provider = ScriptedProvider::mono(8000).frames(2, 10).known_length();
    let codec = open(&provider);
    assert_eq!(provider.close_count(), 1);

    assert!(codec.read_all().is_some());
    assert_eq!(provider.close_count(), 2);

    // Stream is closed: nothing more to read
    assert!(codec.read().is_none());
    assert!(codec.read_all().is_none());

    // cleanup after read_all does not close twice
    codec.cleanup();
    assert_eq!(provider.close_count(), 2);
}

#[test]
fn test_read_all_after_streaming_returns_remainder() {
    let provider = ScriptedProvider::mono(8000).frames(4, 8);
    let buffers = BufferConfig {
        streaming_buffer_size: 16,
        ..BufferConfig::default()
    };
    let codec = open_with(&provider, buffers);

    let first = codec.read().unwrap();
    assert_eq!(first.len(), 16);

    let rest = codec.read_all().unwrap();
    assert_eq!(rest.len(), 48);
}

#[test]
fn test_read_all_after_end_of_stream_returns_nothing() {
    // A transient fault after the first frame; the decoder would recover
    let provider = ScriptedProvider::mono(8000)
        .frames(4, 2)
        .known_length()
        .glitch_after(1);
    let codec = open(&provider);

    assert!(codec.read().is_none());
    assert!(codec.end_of_stream());

    assert!(codec.read_all().is_none());
    assert!(codec.end_of_stream());
    assert_eq!(provider.close_count(), 2);
}

#[test]
fn test_read_all_before_initialize_fails() {
    let provider = ScriptedProvider::mono(8000).frames(2, 10);
    let codec = CodecMp3::with_provider(Arc::new(provider), BufferConfig::default()).unwrap();

    assert!(codec.read_all().is_none());
    assert!(!codec.end_of_stream());
}
