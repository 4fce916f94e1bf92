//! Borrowing another cache's computed data instead of storing a copy.

use crate::engine::CacheEngine;
use crate::error::{Error, Result};
use crate::id::CacheId;
use crate::payload::{PayloadHandle, PayloadParams};
use tutti_core::{Rational, Ranged, TimeRange, TimeRangeList};

/// A claim that `range` is already computed in cache `source`.
#[derive(Debug, Clone)]
pub struct Passthrough {
    pub range: TimeRange,
    pub source: CacheId,
    pub handle: PayloadHandle,
}

impl Ranged for Passthrough {
    fn time_range(&self) -> &TimeRange {
        &self.range
    }

    fn time_range_mut(&mut self) -> &mut TimeRange {
        &mut self.range
    }
}

/// Snapshot of a cache taken so another cache can pass through to it
/// without holding both locks at once.
#[derive(Debug, Clone)]
pub struct PassthroughExport {
    pub source: CacheId,
    pub validated: TimeRangeList,
    pub passthroughs: Vec<Passthrough>,
    pub handle: PayloadHandle,
    pub saving_enabled: bool,
    pub params: PayloadParams,
}

impl CacheEngine {
    pub fn passthroughs(&self) -> &[Passthrough] {
        &self.passthroughs
    }

    /// Most recently added passthrough covering `t`.
    pub fn passthrough_at(&self, t: Rational) -> Option<&Passthrough> {
        self.passthroughs.iter().rev().find(|p| p.range.contains(t))
    }

    pub fn clear_passthroughs(&mut self) {
        self.passthroughs.clear();
    }

    pub fn export_passthrough(&self) -> PassthroughExport {
        PassthroughExport {
            source: self.id(),
            validated: self.validated.clone(),
            passthroughs: self.passthroughs.clone(),
            handle: self.payload.handle(),
            saving_enabled: self.saving_enabled,
            params: self.payload.params(),
        }
    }

    /// Replace this cache's passthroughs with everything `export` has computed.
    ///
    /// The list is rebuilt flat: the source's validated ranges point at the
    /// source, and its own passthroughs are copied as they are. Entries that
    /// would point back at this cache are dropped.
    pub fn set_passthrough(&mut self, export: &PassthroughExport) -> Result<()> {
        if export.source == self.id() {
            return Err(Error::PassthroughCycle(self.id()));
        }
        if export.params.kind() != self.kind() {
            return Err(self.mismatch(export.params.kind()));
        }

        let mut passthroughs: Vec<Passthrough> = export
            .validated
            .iter()
            .map(|range| Passthrough {
                range: *range,
                source: export.source,
                handle: export.handle.clone(),
            })
            .collect();

        for chained in &export.passthroughs {
            if chained.source == self.id() {
                tracing::warn!(
                    "Dropping passthrough {:?} from {} that points back at {}",
                    chained.range,
                    export.source,
                    self.id()
                );
                continue;
            }
            passthroughs.push(chained.clone());
        }

        tracing::debug!(
            "Cache {} passes through {} ranges from {}",
            self.id(),
            passthroughs.len(),
            export.source
        );

        self.passthroughs = passthroughs;
        self.saving_enabled = export.saving_enabled;
        self.payload.apply_params(&export.params);
        Ok(())
    }

    pub fn set_passthrough_from(&mut self, other: &CacheEngine) -> Result<()> {
        self.set_passthrough(&other.export_passthrough())
    }
}
