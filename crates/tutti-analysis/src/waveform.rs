//! Waveform Summaries
//!
//! Multi-resolution min/max summaries of audio for drawing at any zoom.
//!
//! ## Layout
//!
//! - **Mipmaps**: one level per rate, from 1/8 to 1024 buckets per second, doubling
//! - **Exact aggregation**: every bucket is the min/max of the two finer buckets it spans
//! - **Virtual start**: trimming the front only moves an offset, storage is reclaimed lazily
//! - **Interleaved**: each level stores `buckets * channels` blocks, channel-minor

use crate::draw::{PixelRect, WaveformCanvas};
use std::collections::BTreeMap;
use tutti_core::{Rational, SampleBuffer};

const MIPMAP_LEVELS: u32 = 14;

/// Coarsest level rate, in buckets per second.
pub fn minimum_rate() -> Rational {
    Rational::new(1, 8)
}

/// Finest level rate, in buckets per second.
pub fn maximum_rate() -> Rational {
    Rational::from_integer(1024)
}

/// All level rates, coarsest first.
pub fn mipmap_rates() -> Vec<Rational> {
    (0..MIPMAP_LEVELS)
        .map(|level| Rational::new(1i64 << level, 8))
        .collect()
}

/// Peak range of one channel over one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformBlock {
    /// Minimum sample value in this bucket
    pub min: f32,
    /// Maximum sample value in this bucket
    pub max: f32,
}

impl WaveformBlock {
    pub const SILENT: WaveformBlock = WaveformBlock { min: 0.0, max: 0.0 };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn merged(self, other: &WaveformBlock) -> WaveformBlock {
        WaveformBlock {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// One block per channel.
pub type Summary = Vec<WaveformBlock>;

/// Multi-resolution min/max summary of a multichannel signal.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct WaveformSummaryBuffer {
    virtual_start: Rational,
    channels: usize,
    length: Rational,
    mipmaps: BTreeMap<Rational, Vec<WaveformBlock>>,
}

impl WaveformSummaryBuffer {
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            ..Self::default()
        }
    }

    /// Rebuild a buffer from stored parts. Levels are truncated to whole buckets.
    pub fn from_parts(
        channels: usize,
        virtual_start: Rational,
        length: Rational,
        mut mipmaps: BTreeMap<Rational, Vec<WaveformBlock>>,
    ) -> Self {
        for data in mipmaps.values_mut() {
            let whole = if channels == 0 {
                0
            } else {
                data.len() - data.len() % channels
            };
            data.truncate(whole);
        }
        Self {
            virtual_start,
            channels,
            length,
            mipmaps,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    /// Changing the channel count discards all summarized data.
    pub fn set_channel_count(&mut self, channels: usize) {
        if channels != self.channels {
            self.channels = channels;
            self.mipmaps.clear();
        }
    }

    pub fn length(&self) -> Rational {
        self.length
    }

    pub fn virtual_start(&self) -> Rational {
        self.virtual_start
    }

    pub fn is_empty(&self) -> bool {
        self.mipmaps.is_empty()
    }

    pub fn clear(&mut self) {
        self.mipmaps.clear();
        self.virtual_start = Rational::ZERO;
        self.length = Rational::ZERO;
    }

    /// Rates that currently hold data, coarsest first.
    pub fn rates(&self) -> Vec<Rational> {
        self.mipmaps.keys().copied().collect()
    }

    /// Raw storage of one level.
    pub fn level(&self, rate: Rational) -> Option<&[WaveformBlock]> {
        self.mipmaps.get(&rate).map(Vec::as_slice)
    }

    pub fn levels(&self) -> impl Iterator<Item = (Rational, &[WaveformBlock])> {
        self.mipmaps.iter().map(|(rate, data)| (*rate, data.as_slice()))
    }

    /// Min/max of `length` raw samples per channel starting at `start_index`.
    pub fn sum_samples(samples: &SampleBuffer, start_index: usize, length: usize) -> Summary {
        samples
            .channels()
            .map(|channel| {
                let end = start_index.saturating_add(length).min(channel.len());
                let start = start_index.min(end);
                block_of(&channel[start..end])
            })
            .collect()
    }

    /// Fold interleaved summary blocks into one block per channel.
    pub fn resum_samples(blocks: &[WaveformBlock], channels: usize) -> Summary {
        (0..channels)
            .map(|channel| {
                let mut iter = blocks.iter().skip(channel).step_by(channels);
                match iter.next() {
                    Some(first) => iter.fold(*first, |acc, block| acc.merged(block)),
                    None => WaveformBlock::SILENT,
                }
            })
            .collect()
    }

    /// Summarize `samples` into every level, placing the first sample at `start`.
    pub fn overwrite_samples(&mut self, samples: &SampleBuffer, sample_rate: u32, start: Rational) {
        if samples.is_empty() || sample_rate == 0 {
            return;
        }
        if self.channels == 0 {
            self.channels = samples.channel_count();
        }

        let sample_count = samples.sample_count() as i64;
        let sr = Rational::from_integer(sample_rate as i64);
        let end = start + Rational::new(sample_count, sample_rate as i64);
        let pos_start = start + self.virtual_start;
        let pos_end = end + self.virtual_start;

        let finest = maximum_rate();
        let first = (pos_start * finest).floor().max(0);
        let last = (pos_end * finest).ceil();
        if last > first {
            let channels = self.channels;
            // Span that held summarized data before this write.
            let old_start = self.virtual_start;
            let old_end = self.length + self.virtual_start;
            let level = self.level_storage(finest, last);
            for bucket in first..last {
                let t0 = Rational::from_integer(bucket) / finest;
                let t1 = Rational::from_integer(bucket + 1) / finest;
                // Sample k lands in this bucket iff its time falls in [t0, t1).
                let s0 = ((t0 - pos_start) * sr).ceil().clamp(0, sample_count);
                let s1 = ((t1 - pos_start) * sr).ceil().clamp(0, sample_count);
                if s0 >= s1 {
                    continue;
                }
                let mut summary = Self::sum_samples(samples, s0 as usize, (s1 - s0) as usize);

                // Edge buckets keep the peaks of older data outside this write.
                let keeps_head = t0 < pos_start && t0 < old_end && pos_start > old_start;
                let keeps_tail = t1 > pos_end && pos_end < old_end && t1 > old_start;
                if keeps_head || keeps_tail {
                    let offset = bucket as usize * channels;
                    for (c, block) in summary.iter_mut().enumerate().take(channels) {
                        *block = block.merged(&level[offset + c]);
                    }
                }
                write_bucket(level, bucket as usize, channels, &summary);
            }
        }

        let rates = mipmap_rates();
        for pair in rates.windows(2).rev() {
            self.resum_level(pair[1], pair[0], pos_start, pos_end);
        }

        self.length = self.length.max(end);
    }

    /// Copy already summarized data from `sums`, reading at `offset` and
    /// writing at `dest`. A zero `length` copies to the end of `sums`.
    pub fn overwrite_sums(
        &mut self,
        sums: &WaveformSummaryBuffer,
        dest: Rational,
        offset: Rational,
        length: Rational,
    ) {
        let length = if length.is_zero() {
            sums.length - offset
        } else {
            length
        };
        if length <= Rational::ZERO || sums.channels == 0 {
            return;
        }
        if self.channels == 0 {
            self.channels = sums.channels;
        }

        let channels = self.channels;
        for (&rate, source) in &sums.mipmaps {
            let src_start = ((offset + sums.virtual_start) * rate).floor().max(0);
            let dst_start = ((dest + self.virtual_start) * rate).floor();
            let dst_end = ((dest + length + self.virtual_start) * rate).ceil();
            let available = (source.len() / sums.channels) as i64 - src_start;
            let count = (dst_end - dst_start).min(available);
            if count <= 0 || dst_start + count <= 0 {
                continue;
            }

            let level = self.level_storage(rate, dst_start + count);
            for i in 0..count {
                let d = dst_start + i;
                if d < 0 {
                    continue;
                }
                let s = (src_start + i) as usize;
                for c in 0..channels {
                    level[d as usize * channels + c] = if c < sums.channels {
                        source[s * sums.channels + c]
                    } else {
                        WaveformBlock::SILENT
                    };
                }
            }
        }

        self.length = self.length.max(dest + length);
    }

    /// Flatten `[start, start + length)` to zero at every level.
    pub fn overwrite_silence(&mut self, start: Rational, length: Rational) {
        if length <= Rational::ZERO {
            return;
        }
        let pos_start = start + self.virtual_start;
        let first = |rate: Rational| (pos_start * rate).floor();
        self.fill_silence(first, pos_start + length);
        self.length = self.length.max(start + length);
    }

    /// Drop `length` from the front. A negative value re-exposes previously
    /// trimmed data, down to the start of storage.
    pub fn trim_in(&mut self, length: Rational) {
        let length = length.max(-self.virtual_start).min(self.length);
        if length.is_zero() {
            return;
        }
        self.virtual_start += length;
        self.length -= length;
    }

    /// Truncate or extend to `length`. Growth is filled with silence.
    pub fn resize(&mut self, length: Rational) {
        let length = length.max(Rational::ZERO);
        let vs = self.virtual_start;

        if length < self.length {
            let channels = self.channels;
            for (&rate, data) in &mut self.mipmaps {
                let keep = ((length + vs) * rate).ceil().max(0) as usize * channels;
                data.truncate(keep);
            }
        } else if length > self.length {
            // Buckets still partly holding real data keep it.
            let old_end = self.length + vs;
            self.fill_silence(|rate| (old_end * rate).ceil(), length + vs);
        }

        self.length = length;
    }

    /// Keep only `[in_point, in_point + length)`.
    pub fn trim_range(&mut self, in_point: Rational, length: Rational) {
        self.trim_in(in_point);
        self.resize(length);
    }

    /// Copy of `[offset, offset + length)` as a standalone buffer.
    pub fn mid(&self, offset: Rational, length: Rational) -> WaveformSummaryBuffer {
        let length = length.max(Rational::ZERO);
        let mut out = WaveformSummaryBuffer::new(self.channels);
        out.length = length;
        if self.channels == 0 {
            return out;
        }

        for (&rate, data) in &self.mipmaps {
            let available = data.len() / self.channels;
            let start = ((offset + self.virtual_start) * rate).floor().max(0) as usize;
            let end = ((offset + length + self.virtual_start) * rate).ceil().max(0) as usize;
            let start = start.min(available);
            let end = end.clamp(start, available);
            out.mipmaps.insert(
                rate,
                data[start * self.channels..end * self.channels].to_vec(),
            );
        }
        out
    }

    /// Copy of everything from `offset` on.
    pub fn mid_to_end(&self, offset: Rational) -> WaveformSummaryBuffer {
        self.mid(offset, self.length - offset)
    }

    /// The level best matching `scale` buckets per second: the coarsest level
    /// at least that fine, else the finest stored level.
    pub fn mipmap_for_scale(&self, scale: f64) -> Option<(Rational, &[WaveformBlock])> {
        self.mipmaps
            .iter()
            .find(|(rate, _)| rate.to_f64() >= scale)
            .or_else(|| self.mipmaps.iter().next_back())
            .map(|(rate, data)| (*rate, data.as_slice()))
    }

    /// One block per channel covering `[start, start + length)`.
    pub fn summary_from_time(&self, start: Rational, length: Rational) -> Summary {
        let silent = vec![WaveformBlock::SILENT; self.channels];
        if length <= Rational::ZERO || self.channels == 0 {
            return silent;
        }

        let Some((rate, data)) = self.mipmap_for_scale(length.recip().to_f64()) else {
            return silent;
        };

        let available = data.len() / self.channels;
        let first = ((start + self.virtual_start) * rate).floor().max(0) as usize;
        let end = ((start + length + self.virtual_start) * rate).ceil().max(0) as usize;
        let first = first.min(available);
        let end = end.clamp(first, available);
        Self::resum_samples(&data[first * self.channels..end * self.channels], self.channels)
    }

    /// Draw the buffer into `rect`, `scale` pixels per second, with the left
    /// edge at `start_time`.
    pub fn draw_waveform(
        &self,
        canvas: &mut impl WaveformCanvas,
        rect: PixelRect,
        scale: f64,
        start_time: Rational,
        rectified: bool,
    ) {
        if self.channels == 0 || rect.width <= 0 || scale <= 0.0 {
            return;
        }
        let Some((rate, data)) = self.mipmap_for_scale(scale) else {
            return;
        };

        let rate = rate.to_f64();
        let vs = self.virtual_start.to_f64();
        let base = start_time.to_f64() + vs;
        let end = self.length.to_f64() + vs;
        let available = (data.len() / self.channels).min((end * rate).ceil().max(0.0) as usize);

        for px in 0..rect.width {
            let t0 = base + px as f64 / scale;
            let t1 = base + (px + 1) as f64 / scale;
            if t0 >= end {
                break;
            }

            let first = (t0 * rate).floor().max(0.0) as usize;
            let last = ((t1 * rate).ceil().max(0.0) as usize).max(first + 1).min(available);
            if first >= last {
                continue;
            }

            let summary = Self::resum_samples(
                &data[first * self.channels..last * self.channels],
                self.channels,
            );
            Self::draw_sample(canvas, &summary, rect.x + px, rect.y, rect.height, rectified);
        }
    }

    /// Draw one column, splitting `height` evenly between channels.
    pub fn draw_sample(
        canvas: &mut impl WaveformCanvas,
        summary: &[WaveformBlock],
        x: i32,
        y: i32,
        height: i32,
        rectified: bool,
    ) {
        if summary.is_empty() {
            return;
        }
        let channel_height = height / summary.len() as i32;
        if channel_height <= 0 {
            return;
        }
        let half = channel_height as f32 / 2.0;

        for (i, block) in summary.iter().enumerate() {
            let top = y + channel_height * i as i32;
            let bottom = top + channel_height - 1;

            if rectified {
                let extent = (((block.max - block.min) * half).round() as i32).clamp(0, channel_height - 1);
                canvas.vertical_line(x, bottom - extent, bottom);
            } else {
                let mid = top + half as i32;
                let y_top = (mid - (block.max * half).round() as i32).clamp(top, bottom);
                let y_bottom = (mid - (block.min * half).round() as i32).clamp(top, bottom);
                canvas.vertical_line(x, y_top, y_bottom);
            }
        }
    }

    fn level_storage(&mut self, rate: Rational, buckets: i64) -> &mut Vec<WaveformBlock> {
        let needed = buckets.max(0) as usize * self.channels;
        let level = self.mipmaps.entry(rate).or_default();
        if level.len() < needed {
            level.resize(needed, WaveformBlock::SILENT);
        }
        level
    }

    fn resum_level(&mut self, finer: Rational, rate: Rational, pos_start: Rational, pos_end: Rational) {
        let channels = self.channels;
        let first = (pos_start * rate).floor().max(0);
        let last = (pos_end * rate).ceil();
        if last <= first || channels == 0 {
            return;
        }
        let Some(source) = self.mipmaps.get(&finer) else {
            return;
        };

        let source_buckets = (source.len() / channels) as i64;
        let sums: Vec<(i64, Summary)> = (first..last)
            .filter(|bucket| bucket * 2 < source_buckets)
            .map(|bucket| {
                let c0 = (bucket * 2) as usize;
                let c1 = ((bucket * 2 + 2).min(source_buckets)) as usize;
                (
                    bucket,
                    Self::resum_samples(&source[c0 * channels..c1 * channels], channels),
                )
            })
            .collect();

        let level = self.level_storage(rate, last);
        for (bucket, summary) in sums {
            write_bucket(level, bucket as usize, channels, &summary);
        }
    }

    fn fill_silence(&mut self, first_bucket: impl Fn(Rational) -> i64, pos_end: Rational) {
        let channels = self.channels;
        if channels == 0 {
            return;
        }
        for rate in mipmap_rates() {
            let first = first_bucket(rate).max(0);
            let last = (pos_end * rate).ceil();
            if last <= first {
                continue;
            }
            let level = self.level_storage(rate, last);
            level[first as usize * channels..last as usize * channels].fill(WaveformBlock::SILENT);
        }
    }
}

fn block_of(samples: &[f32]) -> WaveformBlock {
    if samples.is_empty() {
        return WaveformBlock::SILENT;
    }

    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &sample in samples {
        min = min.min(sample);
        max = max.max(sample);
    }
    WaveformBlock { min, max }
}

fn write_bucket(level: &mut [WaveformBlock], bucket: usize, channels: usize, summary: &[WaveformBlock]) {
    for c in 0..channels {
        level[bucket * channels + c] = summary.get(c).copied().unwrap_or_default();
    }
}
