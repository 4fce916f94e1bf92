//! Saving and restoring a cache's validity state.
//!
//! `<directory>/state` layout, little-endian:
//!
//! ```text
//! [version: u8] [kind: u8]
//! [range count: u32] [for each range: in (i64 num, i64 den), out (i64 num, i64 den)]
//! [payload section]
//!   audio:    [sample rate: u32] [channels: u32] [format tag: u8]
//!   frames:   [timebase (i64 num, i64 den)]
//!   waveform: [channels: u32] [virtual start] [length] [level count: u32]
//!             [for each level: [rate] [block count: u32] [blocks: (f32 min, f32 max)...]]
//! ```

use crate::engine::CacheEngine;
use crate::error::{Error, Result};
use crate::payload::{Payload, PayloadKind};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use tutti_analysis::{WaveformBlock, WaveformSummaryBuffer};
use tutti_core::{AudioParams, Rational, SampleFormat, TimeRange, TimeRangeList};

const STATE_VERSION: u8 = 1;
const STATE_FILE: &str = "state";

/// Payload section as read back from disk.
enum PayloadState {
    Audio(AudioParams),
    Frames(Rational),
    Waveform(WaveformSummaryBuffer),
}

impl CacheEngine {
    pub fn state_path(&self) -> PathBuf {
        self.directory().join(STATE_FILE)
    }

    /// Write the validated ranges and payload parameters. Does nothing when
    /// saving is disabled.
    pub fn save_state(&self) -> Result<()> {
        if !self.saving_enabled {
            return Ok(());
        }
        fs::create_dir_all(self.directory())?;
        fs::write(self.state_path(), self.serialize_state())?;
        tracing::debug!(
            "Saved state of cache {} ({} validated ranges)",
            self.id(),
            self.validated.len()
        );
        Ok(())
    }

    /// Restore state saved by [`save_state`](Self::save_state).
    ///
    /// Returns `false` when saving is disabled, there is no state file, or it
    /// has not changed since the last load.
    pub fn load_state(&mut self) -> Result<bool> {
        if !self.saving_enabled {
            return Ok(false);
        }
        let path = self.state_path();
        let modified = match fs::metadata(&path) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if self.last_loaded_state.is_some_and(|last| modified <= last) {
            return Ok(false);
        }

        let data = fs::read(&path)?;
        let (kind, validated, payload) =
            deserialize_state(&data).ok_or_else(|| Error::CorruptState(path.clone()))?;
        if kind != self.kind() {
            return Err(self.mismatch(kind));
        }

        match (&mut self.payload, payload) {
            (Payload::Audio(store), PayloadState::Audio(params)) => store.set_params(params),
            (Payload::Frames(frames), PayloadState::Frames(timebase)) => frames.set_timebase(timebase),
            (Payload::Waveform(waveform), PayloadState::Waveform(buffer)) => {
                *waveform.shared().write() = buffer;
            }
            _ => return Err(Error::CorruptState(path)),
        }

        self.validated = validated;
        self.last_loaded_state = Some(modified);
        tracing::debug!("Loaded state of cache {}", self.id());
        Ok(true)
    }

    fn serialize_state(&self) -> Vec<u8> {
        let mut data = Vec::new();

        data.push(STATE_VERSION);
        data.push(self.kind().tag());
        data.extend_from_slice(&(self.validated.len() as u32).to_le_bytes());
        for range in &self.validated {
            put_rational(&mut data, range.in_point());
            put_rational(&mut data, range.out_point());
        }

        match &self.payload {
            Payload::Audio(store) => {
                let params = store.params();
                data.extend_from_slice(&params.sample_rate().to_le_bytes());
                data.extend_from_slice(&(params.channel_count() as u32).to_le_bytes());
                data.push(params.format().tag());
            }
            Payload::Frames(frames) => put_rational(&mut data, frames.timebase()),
            Payload::Waveform(waveform) => {
                let buffer = waveform.shared();
                let buffer = buffer.read();
                data.extend_from_slice(&(buffer.channel_count() as u32).to_le_bytes());
                put_rational(&mut data, buffer.virtual_start());
                put_rational(&mut data, buffer.length());

                let levels: Vec<_> = buffer.levels().collect();
                data.extend_from_slice(&(levels.len() as u32).to_le_bytes());
                for (rate, blocks) in levels {
                    put_rational(&mut data, rate);
                    data.extend_from_slice(&(blocks.len() as u32).to_le_bytes());
                    for block in blocks {
                        data.extend_from_slice(&block.min.to_le_bytes());
                        data.extend_from_slice(&block.max.to_le_bytes());
                    }
                }
            }
        }

        data
    }
}

fn put_rational(data: &mut Vec<u8>, value: Rational) {
    data.extend_from_slice(&value.numerator().to_le_bytes());
    data.extend_from_slice(&value.denominator().to_le_bytes());
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(bytes)
    }

    fn u8(&mut self) -> Option<u8> {
        Some(self.take(1)?[0])
    }

    fn u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn i64(&mut self) -> Option<i64> {
        Some(i64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn f32(&mut self) -> Option<f32> {
        Some(f32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn rational(&mut self) -> Option<Rational> {
        let num = self.i64()?;
        let den = self.i64()?;
        if den <= 0 {
            return None;
        }
        Some(Rational::new(num, den))
    }
}

fn deserialize_state(data: &[u8]) -> Option<(PayloadKind, TimeRangeList, PayloadState)> {
    let mut reader = Reader { data, pos: 0 };

    if reader.u8()? != STATE_VERSION {
        return None;
    }
    let kind = PayloadKind::from_tag(reader.u8()?)?;

    let range_count = reader.u32()?;
    let mut validated = TimeRangeList::new();
    for _ in 0..range_count {
        let in_point = reader.rational()?;
        let out_point = reader.rational()?;
        validated.insert(TimeRange::new(in_point, out_point));
    }

    let payload = match kind {
        PayloadKind::Audio => {
            let sample_rate = reader.u32()?;
            let channels = reader.u32()? as usize;
            let format = SampleFormat::from_tag(reader.u8()?)?;
            let params = AudioParams::new(sample_rate, channels, format);
            if !params.is_valid() {
                return None;
            }
            PayloadState::Audio(params)
        }
        PayloadKind::Frames => {
            let timebase = reader.rational()?;
            if timebase <= Rational::ZERO {
                return None;
            }
            PayloadState::Frames(timebase)
        }
        PayloadKind::Waveform => {
            let channels = reader.u32()? as usize;
            let virtual_start = reader.rational()?;
            let length = reader.rational()?;

            let level_count = reader.u32()?;
            let mut mipmaps = BTreeMap::new();
            for _ in 0..level_count {
                let rate = reader.rational()?;
                let block_count = reader.u32()? as usize;
                // Guard the allocation against a truncated file.
                if data.len() < reader.pos + block_count * 8 {
                    return None;
                }
                let mut blocks = Vec::with_capacity(block_count);
                for _ in 0..block_count {
                    let min = reader.f32()?;
                    let max = reader.f32()?;
                    blocks.push(WaveformBlock::new(min, max));
                }
                mipmaps.insert(rate, blocks);
            }
            PayloadState::Waveform(WaveformSummaryBuffer::from_parts(
                channels,
                virtual_start,
                length,
                mipmaps,
            ))
        }
    };

    Some((kind, validated, payload))
}
