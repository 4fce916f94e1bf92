//! Builder for configuring and constructing a `CacheSystem`.

use crate::{CacheSystem, Result};
use std::path::PathBuf;
use tutti_cache::CacheConfig;

/// Settings not given explicitly fall back to [`CacheConfig::default`].
///
/// # Example
///
/// ```no_run
/// use tutti_render_cache::CacheSystem;
///
/// let system = CacheSystem::builder()
///     .cache_root("/var/cache/my-editor")
///     .segment_size_per_channel(4 * 1024 * 1024)
///     .build()?;
/// # Ok::<(), tutti_render_cache::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CacheSystemBuilder {
    config: Option<CacheConfig>,
    cache_root: Option<PathBuf>,
    segment_size_per_channel: Option<u64>,
    saving_enabled: Option<bool>,
}

impl CacheSystemBuilder {
    /// Start from a complete config. Individual setters still override it.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn cache_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(path.into());
        self
    }

    /// Default: 10 MiB
    pub fn segment_size_per_channel(mut self, bytes: u64) -> Self {
        self.segment_size_per_channel = Some(bytes);
        self
    }

    /// Default: true
    pub fn saving_enabled(mut self, enabled: bool) -> Self {
        self.saving_enabled = Some(enabled);
        self
    }

    /// Creates the cache root directory if it does not exist.
    pub fn build(self) -> Result<CacheSystem> {
        let mut config = self.config.unwrap_or_default();
        if let Some(root) = self.cache_root {
            config.cache_root = root;
        }
        if let Some(size) = self.segment_size_per_channel {
            config.segment_size_per_channel = size;
        }
        if let Some(enabled) = self.saving_enabled {
            config.saving_enabled = enabled;
        }

        std::fs::create_dir_all(&config.cache_root)?;
        tracing::debug!("Cache root at {}", config.cache_root.display());

        Ok(CacheSystem::from_config(config))
    }
}
