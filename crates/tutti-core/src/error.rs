//! Error types for tutti-core.

use thiserror::Error;

/// Error type for tutti-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Channel {channel} has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid audio params: {sample_rate} Hz, {channel_count} channels")]
    InvalidAudioParams {
        sample_rate: u32,
        channel_count: usize,
    },

    #[error("Invalid timebase: {0}")]
    InvalidTimebase(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
