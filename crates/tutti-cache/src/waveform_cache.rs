//! In-memory waveform summaries behind the cache validity tracking.

use crate::engine::CacheEngine;
use crate::error::Result;
use crate::payload::{Payload, PayloadHandle, PayloadKind};
use parking_lot::RwLock;
use std::sync::Arc;
use tutti_analysis::{PixelRect, Summary, WaveformCanvas, WaveformSummaryBuffer};
use tutti_core::{Rational, TimeRange, TimeRangeList};

/// Summary buffer readable by passthrough targets while its owner keeps
/// writing.
pub type SharedWaveform = Arc<RwLock<WaveformSummaryBuffer>>;

#[derive(Debug)]
pub struct WaveformPayload {
    buffer: SharedWaveform,
}

impl WaveformPayload {
    pub fn new(channels: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(WaveformSummaryBuffer::new(channels))),
        }
    }

    pub fn shared(&self) -> SharedWaveform {
        self.buffer.clone()
    }
}

impl CacheEngine {
    pub fn waveform_buffer(&self) -> Result<SharedWaveform> {
        match &self.payload {
            Payload::Waveform(waveform) => Ok(waveform.shared()),
            _ => Err(self.mismatch(PayloadKind::Waveform)),
        }
    }

    /// Copy the parts of `waveform` that fall in `valid_ranges` and validate
    /// them. `waveform` starts at `range`'s in point; `None` writes silence.
    pub fn write_waveform(
        &mut self,
        range: &TimeRange,
        valid_ranges: &TimeRangeList,
        waveform: Option<&WaveformSummaryBuffer>,
    ) -> Result<()> {
        let shared = self.waveform_buffer()?;
        {
            let mut buffer = shared.write();
            for sub in valid_ranges.iter() {
                match waveform {
                    Some(source) => buffer.overwrite_sums(
                        source,
                        sub.in_point(),
                        sub.in_point() - range.in_point(),
                        sub.length(),
                    ),
                    None => buffer.overwrite_silence(sub.in_point(), sub.length()),
                }
            }
        }

        for sub in valid_ranges.sorted() {
            self.validate(&sub, true);
        }
        Ok(())
    }

    pub fn waveform_length(&self) -> Result<Rational> {
        Ok(self.waveform_buffer()?.read().length())
    }

    /// One block per channel covering `[start, start + length)`.
    pub fn waveform_summary(&self, start: Rational, length: Rational) -> Result<Summary> {
        Ok(self.waveform_buffer()?.read().summary_from_time(start, length))
    }

    /// Draw at `scale` pixels per second with the left edge at `start_time`.
    ///
    /// Columns covered by a passthrough are drawn from its source; the rest
    /// come from this cache's own summaries.
    pub fn draw_waveform(
        &self,
        canvas: &mut impl WaveformCanvas,
        rect: PixelRect,
        scale: f64,
        start_time: Rational,
        rectified: bool,
    ) -> Result<()> {
        let local = self.waveform_buffer()?;
        if rect.is_empty() || scale <= 0.0 {
            return Ok(());
        }

        let column_of = |t: Rational| rect.x + ((t - start_time).to_f64() * scale).floor() as i32;
        let time_of = |x: i32| start_time + Rational::from_f64((x - rect.x) as f64 / scale);
        let mut covered = vec![false; rect.width as usize];

        for passthrough in &self.passthroughs {
            let PayloadHandle::Waveform(source) = &passthrough.handle else {
                continue;
            };
            let columns = rect.with_columns(
                column_of(passthrough.range.in_point()),
                column_of(passthrough.range.out_point()),
            );
            if columns.is_empty() {
                continue;
            }

            let from = passthrough.range.in_point().max(start_time);
            source
                .read()
                .draw_waveform(canvas, columns, scale, from, rectified);
            for x in columns.x..columns.right() {
                covered[(x - rect.x) as usize] = true;
            }
        }

        let buffer = local.read();
        let mut x = rect.x;
        while x < rect.right() {
            if covered[(x - rect.x) as usize] {
                x += 1;
                continue;
            }
            let run_start = x;
            while x < rect.right() && !covered[(x - rect.x) as usize] {
                x += 1;
            }
            let columns = rect.with_columns(run_start, x);
            buffer.draw_waveform(canvas, columns, scale, time_of(run_start), rectified);
        }
        Ok(())
    }
}
