//! # Tutti Render Cache
//!
//! Tracks which parts of an editing timeline have current rendered output,
//! and stores that output.
//!
//! ## Architecture
//!
//! This umbrella crate coordinates:
//! - **tutti-core** - Exact time values, range sets, job versions, PCM parameters
//! - **tutti-analysis** - Waveform min/max mipmaps and drawing
//! - **tutti-cache** - Cache engines: validity tracking, segmented PCM, waveforms, frames
//!
//! ## Quick Start
//!
//! ```no_run
//! use tutti_render_cache::prelude::*;
//!
//! let system = CacheSystem::builder()
//!     .cache_root("/tmp/render-cache")
//!     .build()?;
//!
//! let audio = system.create_audio_cache(AudioParams::new(48_000, 2, SampleFormat::F32))?;
//! let mut cache = audio.lock();
//!
//! // Render [0, 1) and store it
//! let range = TimeRange::new(0, 1);
//! let samples = SampleBuffer::new(2, 48_000);
//! cache.write_pcm(&range, &TimeRangeList::from(range), Some(&samples))?;
//!
//! // An edit makes part of it stale
//! cache.invalidate(&TimeRange::new(Rational::new(1, 4), Rational::new(1, 2)));
//! assert!(cache.has_invalidated_ranges(&range));
//! # Ok::<(), tutti_render_cache::Error>(())
//! ```

/// Re-export of tutti-core for direct access
pub use tutti_core as core;

pub use tutti_analysis as analysis;
pub use tutti_cache as cache;

pub use tutti_core::{
    AudioParams, FrameIterator, JobClock, JobVersion, RangeJobTracker, Rational, SampleBuffer,
    SampleFormat, TimeRange, TimeRangeList,
};

pub use tutti_analysis::{PixelRect, Raster, WaveformBlock, WaveformCanvas, WaveformSummaryBuffer};

pub use tutti_cache::{
    CacheConfig, CacheEngine, CacheEvent, CacheHandle, CacheId, ContextId, EventBus, Payload,
    PayloadKind,
};

mod builder;
mod error;
mod system;

pub use builder::CacheSystemBuilder;
pub use error::{Error, Result};
pub use system::CacheSystem;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{CacheSystem, CacheSystemBuilder};

    // Time
    pub use crate::core::{Rational, TimeRange, TimeRangeList};

    // Audio
    pub use crate::core::{AudioParams, SampleBuffer, SampleFormat};

    // Caches
    pub use crate::cache::{CacheEngine, CacheEvent, CacheHandle, CacheId, ContextId};
}
