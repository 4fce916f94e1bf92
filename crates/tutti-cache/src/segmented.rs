//! Raw PCM chunked into fixed-size per-channel segment files.
//!
//! Channel `c` of byte range `[s * size, (s + 1) * size)` lives in
//! `<directory>/{s}.{c}`. Files are created on first write, carry no header,
//! and never grow past the segment size.

use crate::engine::CacheEngine;
use crate::error::Result;
use crate::payload::{Payload, PayloadHandle, PayloadKind};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tutti_core::{AudioParams, Rational, SampleBuffer, TimeRange, TimeRangeList};

const ZERO_CHUNK: usize = 64 * 1024;

/// Per-channel segment files for one cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedAudioStore {
    directory: PathBuf,
    params: AudioParams,
    requested_segment_size: u64,
    segment_size: u64,
}

impl SegmentedAudioStore {
    /// `segment_size` is rounded down to whole samples (at least one).
    pub fn new(directory: impl Into<PathBuf>, params: AudioParams, segment_size: u64) -> Self {
        Self {
            directory: directory.into(),
            params,
            requested_segment_size: segment_size,
            segment_size: Self::aligned_segment_size(segment_size, &params),
        }
    }

    fn aligned_segment_size(requested: u64, params: &AudioParams) -> u64 {
        let bytes = params.bytes_per_sample() as u64;
        (requested - requested % bytes).max(bytes)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub(crate) fn set_directory(&mut self, directory: PathBuf) {
        self.directory = directory;
    }

    pub fn params(&self) -> AudioParams {
        self.params
    }

    pub(crate) fn set_params(&mut self, params: AudioParams) {
        self.params = params;
        self.segment_size = Self::aligned_segment_size(self.requested_segment_size, &params);
    }

    /// Bytes per channel held by one segment file.
    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }

    pub fn segment_path(&self, segment: u64, channel: usize) -> PathBuf {
        self.directory.join(format!("{segment}.{channel}"))
    }

    /// Write `length` of audio at timeline `write_start`, reading `samples`
    /// from `buffer_start` on. Whatever `samples` cannot supply (all of it
    /// when `None`) is written as silence.
    ///
    /// A segment or channel that fails is skipped and the rest still written;
    /// the result is `false` if anything failed. Nothing is rolled back.
    pub fn write_part_of_sample_buffer(
        &self,
        samples: Option<&SampleBuffer>,
        write_start: Rational,
        buffer_start: Rational,
        length: Rational,
    ) -> bool {
        let bytes_per_sample = self.params.bytes_per_sample() as u64;
        let dest_start = self.params.time_to_bytes_per_channel(write_start).max(0) as u64;
        let dest_end = dest_start + self.params.time_to_bytes_per_channel(length).max(0) as u64;
        let src_start = self.params.time_to_bytes_per_channel(buffer_start).max(0) as u64;
        let src_total = samples.map_or(0, |s| {
            self.params
                .samples_to_bytes_per_channel(s.sample_count() as i64) as u64
        });
        let src_end = src_total.min(src_start + (dest_end - dest_start));

        let mut success = true;
        if let Err(e) = fs::create_dir_all(&self.directory) {
            tracing::warn!(
                "Failed to create cache directory {}: {}",
                self.directory.display(),
                e
            );
            success = false;
        }

        let mut dest = dest_start;
        let mut src = src_start;
        let mut encoded = Vec::new();

        while dest < dest_end {
            let segment = dest / self.segment_size;
            let offset = dest % self.segment_size;
            let step = (self.segment_size - offset).min(dest_end - dest);
            let real = src_end.saturating_sub(src).min(step);
            let silence = step - real;

            for channel in 0..self.params.channel_count() {
                encoded.clear();
                if let Some(samples) = samples.filter(|_| real > 0) {
                    let first = (src / bytes_per_sample) as usize;
                    let count = (real / bytes_per_sample) as usize;
                    let data = samples.channel(channel);
                    let end = (first + count).min(data.len());
                    let start = first.min(end);
                    self.params.format().encode_slice(&data[start..end], &mut encoded);
                }
                // Missing channels in `samples` come out as silence as well.
                let zeros = silence + (real - encoded.len() as u64);

                if let Err(e) = self.write_segment(segment, channel, offset, &encoded, zeros) {
                    tracing::warn!(
                        "Failed to write {}: {}",
                        self.segment_path(segment, channel).display(),
                        e
                    );
                    success = false;
                }
            }

            dest += step;
            src += step;
        }

        success
    }

    fn write_segment(
        &self,
        segment: u64,
        channel: usize,
        offset: u64,
        data: &[u8],
        zeros: u64,
    ) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.segment_path(segment, channel))?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;

        let chunk = [0u8; ZERO_CHUNK];
        let mut remaining = zeros;
        while remaining > 0 {
            let n = remaining.min(ZERO_CHUNK as u64) as usize;
            file.write_all(&chunk[..n])?;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// `length` bytes of one channel starting at byte `start`. Missing files
    /// and short segments read as zeros.
    pub fn read_channel_bytes(&self, channel: usize, start: u64, length: u64) -> Vec<u8> {
        let mut out = vec![0u8; length as usize];
        let mut pos = start;
        let end = start + length;

        while pos < end {
            let segment = pos / self.segment_size;
            let offset = pos % self.segment_size;
            let step = (self.segment_size - offset).min(end - pos);
            let window = (pos - start) as usize..(pos - start + step) as usize;

            if let Err(e) = self.read_segment(segment, channel, offset, &mut out[window]) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to read {}: {}",
                        self.segment_path(segment, channel).display(),
                        e
                    );
                }
            }
            pos += step;
        }
        out
    }

    fn read_segment(&self, segment: u64, channel: usize, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = File::open(self.segment_path(segment, channel))?;
        file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(())
    }

    /// Decode `range` back into planar samples.
    pub fn read_pcm(&self, range: &TimeRange) -> SampleBuffer {
        let first = self.params.time_to_samples(range.in_point()).max(0);
        let last = self.params.time_to_samples(range.out_point()).max(first);
        let count = (last - first) as usize;

        let mut buffer = SampleBuffer::new(self.params.channel_count(), count);
        let start = self.params.samples_to_bytes_per_channel(first) as u64;
        let length = self.params.samples_to_bytes_per_channel(last - first) as u64;

        let mut decoded = Vec::with_capacity(count);
        for channel in 0..self.params.channel_count() {
            let bytes = self.read_channel_bytes(channel, start, length);
            decoded.clear();
            self.params.format().decode_slice(&bytes, &mut decoded);
            if let Some(out) = buffer.channel_mut(channel) {
                let n = out.len().min(decoded.len());
                out[..n].copy_from_slice(&decoded[..n]);
            }
        }
        buffer
    }
}

impl CacheEngine {
    pub fn audio_store(&self) -> Result<&SegmentedAudioStore> {
        match &self.payload {
            Payload::Audio(store) => Ok(store),
            _ => Err(self.mismatch(PayloadKind::Audio)),
        }
    }

    pub fn audio_params(&self) -> Result<AudioParams> {
        self.audio_store().map(SegmentedAudioStore::params)
    }

    /// Changing the parameters invalidates everything cached.
    pub fn set_audio_params(&mut self, params: AudioParams) -> Result<()> {
        if !params.is_valid() {
            return Err(tutti_core::Error::InvalidAudioParams {
                sample_rate: params.sample_rate(),
                channel_count: params.channel_count(),
            }
            .into());
        }
        let changed = match &mut self.payload {
            Payload::Audio(store) if store.params() != params => {
                store.set_params(params);
                true
            }
            Payload::Audio(_) => false,
            _ => return Err(self.mismatch(PayloadKind::Audio)),
        };
        if changed {
            self.invalidate_all();
        }
        Ok(())
    }

    /// Write the parts of `samples` that fall in `valid_ranges` and validate
    /// each part that was written. `samples` starts at `range`'s in point;
    /// `None` writes silence.
    pub fn write_pcm(
        &mut self,
        range: &TimeRange,
        valid_ranges: &TimeRangeList,
        samples: Option<&SampleBuffer>,
    ) -> Result<bool> {
        let store = self.audio_store()?.clone();
        let mut success = true;

        for sub in valid_ranges.sorted() {
            let written = store.write_part_of_sample_buffer(
                samples,
                sub.in_point(),
                sub.in_point() - range.in_point(),
                sub.length(),
            );
            if written {
                self.validate(&sub, true);
            } else {
                success = false;
            }
        }
        Ok(success)
    }

    pub fn write_silence(&mut self, range: &TimeRange) -> Result<bool> {
        self.write_pcm(range, &TimeRangeList::from(*range), None)
    }

    /// Read `range`, taking passthrough-covered parts from their source.
    pub fn read_pcm(&self, range: &TimeRange) -> Result<SampleBuffer> {
        let store = self.audio_store()?;
        let mut buffer = store.read_pcm(range);
        let params = store.params();
        let first = params.time_to_samples(range.in_point());

        for passthrough in &self.passthroughs {
            let PayloadHandle::Audio(source) = &passthrough.handle else {
                continue;
            };
            if !passthrough.range.overlaps_with(range, false, false) {
                continue;
            }
            let piece = passthrough.range.intersected(range);
            let borrowed = source.read_pcm(&piece);
            let at = (params.time_to_samples(piece.in_point()) - first).max(0) as usize;

            for channel in 0..buffer.channel_count() {
                let src = borrowed.channel(channel);
                if let Some(dst) = buffer.channel_mut(channel) {
                    let end = (at + src.len()).min(dst.len());
                    if at < end {
                        dst[at..end].copy_from_slice(&src[..end - at]);
                    }
                }
            }
        }
        Ok(buffer)
    }
}
