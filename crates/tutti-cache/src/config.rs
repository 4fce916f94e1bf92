//! Cache configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default bytes per channel in one segment file (10 MiB).
pub const DEFAULT_SEGMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Where caches live on disk and how audio is chunked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Root directory; each cache gets `<cache_root>/<id>`.
    pub cache_root: PathBuf,
    /// Maximum bytes per channel in one segment file (default: 10 MiB)
    pub segment_size_per_channel: u64,
    /// Whether caches persist their state (default: true)
    pub saving_enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_root: std::env::temp_dir().join("tutti-render-cache"),
            segment_size_per_channel: DEFAULT_SEGMENT_SIZE,
            saving_enabled: true,
        }
    }
}

impl CacheConfig {
    /// Create config rooted at `path`.
    pub fn with_cache_root(path: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: path.into(),
            ..Default::default()
        }
    }

    /// Parse JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
