//! Job versioning: ordering "when was this computed" against graph changes.

use crate::time::{remove_ranged, Rational, Ranged, TimeRange, TimeRangeList};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque, totally ordered stamp taken from a [`JobClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct JobVersion(pub u64);

impl JobVersion {
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic version source owned by the application context.
///
/// Clones share the same counter, so every holder of a handle observes the
/// same sequence of versions.
#[derive(Debug, Clone, Default)]
pub struct JobClock {
    counter: Arc<AtomicU64>,
}

impl JobClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `value`.
    pub fn starting_at(value: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(value)),
        }
    }

    /// Copy of the current version.
    pub fn acquire(&self) -> JobVersion {
        JobVersion(self.counter.load(Ordering::Acquire))
    }

    /// Bump the counter and return the new version.
    pub fn advance(&self) -> JobVersion {
        JobVersion(self.counter.fetch_add(1, Ordering::AcqRel) + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedJob {
    range: TimeRange,
    version: JobVersion,
}

impl Ranged for TrackedJob {
    fn time_range(&self) -> &TimeRange {
        &self.range
    }

    fn time_range_mut(&mut self) -> &mut TimeRange {
        &mut self.range
    }
}

/// Records which [`JobVersion`] last computed each stretch of time.
#[derive(Debug, Clone, Default)]
pub struct RangeJobTracker {
    jobs: Vec<TrackedJob>,
}

impl RangeJobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `range` as computed at `version`, evicting older claims on it.
    pub fn insert(&mut self, range: TimeRange, version: JobVersion) {
        if range.is_empty() {
            return;
        }
        remove_ranged(&mut self.jobs, &range);
        self.jobs.push(TrackedJob { range, version });
    }

    /// Whether the data at `t` was computed no earlier than `version`.
    ///
    /// Untracked points are never current.
    pub fn is_current(&self, t: Rational, version: JobVersion) -> bool {
        self.jobs
            .iter()
            .rev()
            .find(|job| job.range.contains(t))
            .is_some_and(|job| version >= job.version)
    }

    /// Every part of `range` whose tracked version is at most `version`.
    pub fn current_sub_ranges(&self, range: &TimeRange, version: JobVersion) -> TimeRangeList {
        let mut current = TimeRangeList::new();

        for job in self.jobs.iter().rev() {
            if job.version <= version && job.range.overlaps_with(range, false, false) {
                let piece = job.range.intersected(range);
                debug_assert!(
                    !current.overlaps_with(&piece, false, false),
                    "tracked jobs overlap at {piece:?}"
                );
                current.insert(piece);
            }
        }

        current
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
