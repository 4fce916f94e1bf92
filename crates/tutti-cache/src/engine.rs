//! Validity tracking shared by every cache payload.
//!
//! A [`CacheEngine`] is a plain data structure: it never locks around its own
//! calls. Callers that share one across threads wrap it in a [`CacheHandle`]
//! and hold the lock for any multi-step sequence.

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::events::{CacheEvent, EventBus};
use crate::frame_cache::FramePayload;
use crate::id::{CacheId, ContextId};
use crate::passthrough::Passthrough;
use crate::payload::{Payload, PayloadKind};
use crate::segmented::SegmentedAudioStore;
use crate::waveform_cache::WaveformPayload;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tutti_core::{remove_ranged, AudioParams, Rational, TimeRange, TimeRangeList};

/// Lock handle for a shared cache.
pub type CacheHandle = Arc<Mutex<CacheEngine>>;

/// Tracks which time ranges of one output hold current data.
#[derive(Debug)]
pub struct CacheEngine {
    id: CacheId,
    pub(crate) payload: Payload,
    pub(crate) validated: TimeRangeList,
    requested: TimeRangeList,
    request_context: Option<ContextId>,
    pub(crate) passthroughs: Vec<Passthrough>,
    pub(crate) saving_enabled: bool,
    cache_root: PathBuf,
    events: Arc<EventBus>,
    pub(crate) last_loaded_state: Option<SystemTime>,
}

impl CacheEngine {
    /// Cache of raw PCM in segment files.
    pub fn audio(config: &CacheConfig, events: Arc<EventBus>, params: AudioParams) -> Result<Self> {
        if !params.is_valid() {
            return Err(tutti_core::Error::InvalidAudioParams {
                sample_rate: params.sample_rate(),
                channel_count: params.channel_count(),
            }
            .into());
        }
        let segment_size = config.segment_size_per_channel;
        Ok(Self::with_payload(config, events, |dir| {
            Payload::Audio(SegmentedAudioStore::new(dir, params, segment_size))
        }))
    }

    /// Cache of waveform summaries.
    pub fn waveform(config: &CacheConfig, events: Arc<EventBus>, channels: usize) -> Self {
        Self::with_payload(config, events, |_| {
            Payload::Waveform(WaveformPayload::new(channels))
        })
    }

    /// Cache of encoded video frames at `timebase`.
    pub fn frames(config: &CacheConfig, events: Arc<EventBus>, timebase: Rational) -> Result<Self> {
        FramePayload::check_timebase(timebase)?;
        Ok(Self::with_payload(config, events, |dir| {
            Payload::Frames(FramePayload::new(dir, timebase))
        }))
    }

    fn with_payload(
        config: &CacheConfig,
        events: Arc<EventBus>,
        build: impl FnOnce(PathBuf) -> Payload,
    ) -> Self {
        let id = CacheId::new();
        let payload = build(config.cache_root.join(id.to_string()));
        tracing::debug!("Created {:?} cache {}", payload.kind(), id);

        Self {
            id,
            payload,
            validated: TimeRangeList::new(),
            requested: TimeRangeList::new(),
            request_context: None,
            passthroughs: Vec::new(),
            saving_enabled: config.saving_enabled,
            cache_root: config.cache_root.clone(),
            events,
            last_loaded_state: None,
        }
    }

    pub fn into_handle(self) -> CacheHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn id(&self) -> CacheId {
        self.id
    }

    /// Re-key the cache. Disk-backed payloads follow to the new directory.
    pub fn set_id(&mut self, id: CacheId) {
        self.id = id;
        self.last_loaded_state = None;
        let directory = self.directory();
        self.payload.set_directory(directory);
    }

    /// `<cache_root>/<id>`
    pub fn directory(&self) -> PathBuf {
        self.cache_root.join(self.id.to_string())
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn saving_enabled(&self) -> bool {
        self.saving_enabled
    }

    pub fn set_saving_enabled(&mut self, enabled: bool) {
        self.saving_enabled = enabled;
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn validated_ranges(&self) -> &TimeRangeList {
        &self.validated
    }

    pub fn requested_ranges(&self) -> &TimeRangeList {
        &self.requested
    }

    pub fn request_context(&self) -> Option<ContextId> {
        self.request_context
    }

    /// Parts of `bounds` not covered by validated data.
    pub fn get_invalidated_ranges(&self, bounds: &TimeRange) -> TimeRangeList {
        let mut invalidated = TimeRangeList::from(*bounds);
        invalidated.remove_list(&self.validated);
        invalidated
    }

    pub fn has_invalidated_ranges(&self, bounds: &TimeRange) -> bool {
        !bounds.is_empty() && !self.validated.contains_range(bounds, true, true)
    }

    pub fn has_validated_ranges(&self, bounds: &TimeRange) -> bool {
        self.validated.overlaps_with(bounds, false, false)
    }

    /// Mark `range` stale. Passthrough claims on it are dropped too.
    pub fn invalidate(&mut self, range: &TimeRange) {
        if range.is_empty() {
            return;
        }
        self.validated.remove(range);
        remove_ranged(&mut self.passthroughs, range);

        self.events.publish(CacheEvent::Invalidated {
            cache: self.id,
            range: *range,
        });
    }

    pub fn invalidate_all(&mut self) {
        self.invalidate(&TimeRange::new(Rational::ZERO, Rational::MAX));
    }

    /// Mark `range` current.
    pub fn validate(&mut self, range: &TimeRange, notify: bool) {
        if range.is_empty() {
            return;
        }
        self.validated.insert(*range);

        if notify {
            self.events.publish(CacheEvent::Validated {
                cache: self.id,
                range: *range,
            });
        }
    }

    /// Ask whoever listens for `range` to be filled.
    pub fn request(&mut self, context: ContextId, range: &TimeRange) {
        if range.is_empty() {
            return;
        }
        self.request_context = Some(context);
        self.requested.insert(*range);

        self.events.publish(CacheEvent::Requested {
            cache: self.id,
            context,
            range: *range,
        });
    }

    pub fn clear_request_range(&mut self, range: &TimeRange) {
        self.requested.remove(range);
    }

    /// Publish a request again for everything still pending.
    pub fn resignal_requests(&self) {
        let Some(context) = self.request_context else {
            return;
        };
        for range in &self.requested {
            self.events.publish(CacheEvent::Requested {
                cache: self.id,
                context,
                range: *range,
            });
        }
    }

    pub fn cancel_all(&self) {
        self.events.publish(CacheEvent::CancelAll { cache: self.id });
    }

    pub(crate) fn mismatch(&self, expected: PayloadKind) -> Error {
        Error::PayloadMismatch {
            expected,
            found: self.payload.kind(),
        }
    }
}
