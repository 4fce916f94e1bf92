//! Render caches: which parts of a timeline hold current output, and the
//! output itself.
//!
//! A [`CacheEngine`] tracks validated ranges for one output and owns one
//! [`Payload`]:
//!
//! - **Audio**: raw PCM in fixed-size per-channel segment files
//! - **Waveform**: in-memory min/max mipmaps for drawing
//! - **Frames**: one encoded file per video frame
//!
//! Caches can pass through to another cache's data instead of copying it,
//! publish [`CacheEvent`]s on an [`EventBus`], and persist their state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tutti_cache::{CacheConfig, CacheEngine, EventBus};
//! use tutti_core::TimeRange;
//!
//! let mut cache = CacheEngine::waveform(&CacheConfig::default(), Arc::new(EventBus::new()), 2);
//! cache.validate(&TimeRange::new(0, 10), true);
//! cache.invalidate(&TimeRange::new(4, 6));
//! assert_eq!(cache.get_invalidated_ranges(&TimeRange::new(0, 10)).len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod frame_cache;
pub mod id;
pub mod passthrough;
pub mod payload;
pub mod segmented;
pub mod state;
pub mod waveform_cache;

pub use config::{CacheConfig, DEFAULT_SEGMENT_SIZE};
pub use engine::{CacheEngine, CacheHandle};
pub use error::{Error, Result};
pub use events::{CacheEvent, EventBus};
pub use frame_cache::FramePayload;
pub use id::{CacheId, ContextId};
pub use passthrough::{Passthrough, PassthroughExport};
pub use payload::{Payload, PayloadHandle, PayloadKind, PayloadParams};
pub use segmented::SegmentedAudioStore;
pub use waveform_cache::{SharedWaveform, WaveformPayload};
