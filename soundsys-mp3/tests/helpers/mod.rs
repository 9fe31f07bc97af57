//! Test helpers for soundsys-mp3 integration tests
//!
//! - `scripted`: frame decoder whose frames and terminating fault are scripted
//! - `wav_fixtures`: small PCM WAV files for the symphonia-backed path

#![allow(dead_code)]

pub mod scripted;
pub mod wav_fixtures;

pub use scripted::{ScriptedProvider, Tail};
pub use wav_fixtures::{write_wav, WavFixture};
