//! Error types for tutti-cache.

use crate::id::CacheId;
use crate::payload::PayloadKind;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for cache operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload mismatch: expected {expected:?} cache, found {found:?}")]
    PayloadMismatch {
        expected: PayloadKind,
        found: PayloadKind,
    },

    #[error("Passthrough cycle: cache {0} cannot pass through to itself")]
    PassthroughCycle(CacheId),

    #[error("Corrupt cache state: {}", .0.display())]
    CorruptState(PathBuf),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] tutti_core::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
