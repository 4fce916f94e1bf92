//! CacheSystem: owns every cache of an editing session.

use crate::{CacheSystemBuilder, Error, Result};
use crossbeam_channel::Receiver;
use dashmap::DashMap;
use std::sync::Arc;
use tutti_cache::{CacheConfig, CacheEngine, CacheEvent, CacheHandle, CacheId, EventBus};
use tutti_core::{AudioParams, JobClock, JobVersion, Rational};

/// Application context for render caches.
///
/// Holds the shared config, the event bus every cache publishes to, the job
/// clock, and a registry of caches by id. Caches are handed out as
/// [`CacheHandle`]s; the registry never holds a cache lock itself.
///
/// # Example
///
/// ```no_run
/// use tutti_render_cache::prelude::*;
///
/// let system = CacheSystem::builder().cache_root("/tmp/render-cache").build()?;
/// let events = system.subscribe();
///
/// let cache = system.create_waveform_cache(2);
/// cache.lock().validate(&TimeRange::new(0, 10), true);
/// assert!(events.try_recv().is_ok());
/// # Ok::<(), tutti_render_cache::Error>(())
/// ```
pub struct CacheSystem {
    config: CacheConfig,
    events: Arc<EventBus>,
    caches: DashMap<CacheId, CacheHandle>,
    clock: JobClock,
}

impl CacheSystem {
    pub fn builder() -> CacheSystemBuilder {
        CacheSystemBuilder::default()
    }

    pub(crate) fn from_config(config: CacheConfig) -> Self {
        Self {
            config,
            events: Arc::new(EventBus::new()),
            caches: DashMap::new(),
            clock: JobClock::new(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Receive events from every cache in this system.
    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn job_clock(&self) -> &JobClock {
        &self.clock
    }

    /// Call after any graph change; work stamped earlier is no longer current.
    pub fn advance_graph_version(&self) -> JobVersion {
        self.clock.advance()
    }

    pub fn create_audio_cache(&self, params: AudioParams) -> Result<CacheHandle> {
        let engine = CacheEngine::audio(&self.config, self.events.clone(), params)?;
        Ok(self.register(engine))
    }

    pub fn create_waveform_cache(&self, channels: usize) -> CacheHandle {
        self.register(CacheEngine::waveform(&self.config, self.events.clone(), channels))
    }

    pub fn create_frame_cache(&self, timebase: Rational) -> Result<CacheHandle> {
        let engine = CacheEngine::frames(&self.config, self.events.clone(), timebase)?;
        Ok(self.register(engine))
    }

    fn register(&self, engine: CacheEngine) -> CacheHandle {
        let id = engine.id();
        let handle = engine.into_handle();
        self.caches.insert(id, handle.clone());
        handle
    }

    pub fn cache(&self, id: CacheId) -> Option<CacheHandle> {
        self.caches.get(&id).map(|entry| entry.value().clone())
    }

    /// Remove a cache from the registry. Handles already given out stay usable.
    pub fn remove_cache(&self, id: CacheId) -> Option<CacheHandle> {
        self.caches.remove(&id).map(|(_, handle)| handle)
    }

    pub fn caches(&self) -> Vec<CacheId> {
        self.caches.iter().map(|entry| *entry.key()).collect()
    }

    pub fn cache_count(&self) -> usize {
        self.caches.len()
    }

    /// Re-key a cache, moving it to `<cache_root>/<new>`.
    pub fn set_cache_id(&self, old: CacheId, new: CacheId) -> Result<()> {
        let (_, handle) = self.caches.remove(&old).ok_or(Error::UnknownCache(old))?;
        handle.lock().set_id(new);
        self.caches.insert(new, handle);
        Ok(())
    }

    /// Make `target` pass through to everything `source` has computed.
    ///
    /// The source is snapshotted under its own lock, which is released before
    /// the target is locked.
    pub fn set_passthrough(&self, target: CacheId, source: CacheId) -> Result<()> {
        let source_handle = self.cache(source).ok_or(Error::UnknownCache(source))?;
        let target_handle = self.cache(target).ok_or(Error::UnknownCache(target))?;

        let export = source_handle.lock().export_passthrough();
        target_handle.lock().set_passthrough(&export)?;
        Ok(())
    }

    /// Save every cache. Stops at the first failure.
    pub fn save_all(&self) -> Result<()> {
        for handle in self.handles() {
            handle.lock().save_state()?;
        }
        Ok(())
    }

    /// Load every cache with a changed state file. Returns how many loaded.
    pub fn load_all(&self) -> Result<usize> {
        let mut loaded = 0;
        for handle in self.handles() {
            if handle.lock().load_state()? {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    // Collected first so no registry shard is held while a cache is locked.
    fn handles(&self) -> Vec<CacheHandle> {
        self.caches.iter().map(|entry| entry.value().clone()).collect()
    }
}
