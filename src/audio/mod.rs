//! Audio input.
//!
//! The renderer consumes any [`DecodedAudio`] implementation. This module
//! provides:
//! - [`PlanarBuffer`], an owned per-channel buffer
//! - a Symphonia based loader for files and in-memory bytes
//! - synthetic signal generators for tests, benches and demos

pub mod buffer;
pub mod loader;
pub mod synth;

pub use buffer::{DecodedAudio, PlanarBuffer};
pub use loader::{decode_bytes, load_audio, AudioData};

use thiserror::Error;

/// Errors raised while decoding or validating audio.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open audio file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to decode audio: {0}")]
    DecodeError(#[from] symphonia::core::errors::Error),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Unknown sample rate")]
    UnknownSampleRate,

    #[error("Audio buffer has no channels")]
    NoChannels,

    #[error("Audio buffer contains no samples")]
    EmptyBuffer,

    #[error("Channel {channel} has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        found: usize,
    },
}
