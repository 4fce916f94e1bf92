//! Raw PCM sample formats.

use serde::{Deserialize, Serialize};

/// Storage format of a single PCM sample. All formats are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleFormat {
    U8,
    S16,
    S32,
    S64,
    #[default]
    F32,
    F64,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 6] = [
        SampleFormat::U8,
        SampleFormat::S16,
        SampleFormat::S32,
        SampleFormat::S64,
        SampleFormat::F32,
        SampleFormat::F64,
    ];

    /// Bytes occupied by one sample of one channel.
    pub const fn byte_count(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::S16 => 2,
            SampleFormat::S32 | SampleFormat::F32 => 4,
            SampleFormat::S64 | SampleFormat::F64 => 8,
        }
    }

    /// Stable tag for on-disk metadata.
    pub const fn tag(self) -> u8 {
        match self {
            SampleFormat::U8 => 0,
            SampleFormat::S16 => 1,
            SampleFormat::S32 => 2,
            SampleFormat::S64 => 3,
            SampleFormat::F32 => 4,
            SampleFormat::F64 => 5,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Append the encoded form of `sample` to `out`.
    ///
    /// Integer formats clamp to `[-1.0, 1.0]` before scaling.
    pub fn encode(self, sample: f32, out: &mut Vec<u8>) {
        let clamped = sample.clamp(-1.0, 1.0) as f64;
        match self {
            SampleFormat::U8 => out.push((clamped * 127.0 + 128.0).round() as u8),
            SampleFormat::S16 => {
                out.extend_from_slice(&((clamped * i16::MAX as f64).round() as i16).to_le_bytes())
            }
            SampleFormat::S32 => {
                out.extend_from_slice(&((clamped * i32::MAX as f64).round() as i32).to_le_bytes())
            }
            SampleFormat::S64 => {
                out.extend_from_slice(&((clamped * i64::MAX as f64) as i64).to_le_bytes())
            }
            SampleFormat::F32 => out.extend_from_slice(&sample.to_le_bytes()),
            SampleFormat::F64 => out.extend_from_slice(&(sample as f64).to_le_bytes()),
        }
    }

    pub fn encode_slice(self, samples: &[f32], out: &mut Vec<u8>) {
        out.reserve(samples.len() * self.byte_count());
        for &sample in samples {
            self.encode(sample, out);
        }
    }

    /// Decode one sample. Returns `None` when `bytes` is shorter than
    /// [`byte_count`](Self::byte_count).
    pub fn decode(self, bytes: &[u8]) -> Option<f32> {
        let bytes = bytes.get(..self.byte_count())?;
        let value = match self {
            SampleFormat::U8 => (bytes[0] as f32 - 128.0) / 127.0,
            SampleFormat::S16 => i16::from_le_bytes(bytes.try_into().ok()?) as f32 / i16::MAX as f32,
            SampleFormat::S32 => {
                (i32::from_le_bytes(bytes.try_into().ok()?) as f64 / i32::MAX as f64) as f32
            }
            SampleFormat::S64 => {
                (i64::from_le_bytes(bytes.try_into().ok()?) as f64 / i64::MAX as f64) as f32
            }
            SampleFormat::F32 => f32::from_le_bytes(bytes.try_into().ok()?),
            SampleFormat::F64 => f64::from_le_bytes(bytes.try_into().ok()?) as f32,
        };
        Some(value)
    }

    /// Decode every whole sample in `bytes`; a trailing partial sample is ignored.
    pub fn decode_slice(self, bytes: &[u8], out: &mut Vec<f32>) {
        out.extend(
            bytes
                .chunks_exact(self.byte_count())
                .filter_map(|chunk| self.decode(chunk)),
        );
    }
}
