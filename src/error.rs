//! Centralized error type for the umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use tutti_cache::CacheId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] tutti_core::Error),

    #[error(transparent)]
    Cache(#[from] tutti_cache::Error),

    #[error("Unknown cache: {0}")]
    UnknownCache(CacheId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
