//! Audio stream parameters and time/sample/byte conversions.

use super::SampleFormat;
use crate::time::Rational;
use serde::{Deserialize, Serialize};

/// Sample rate, channel count and sample format of a PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioParams {
    sample_rate: u32,
    channel_count: usize,
    format: SampleFormat,
}

impl AudioParams {
    pub fn new(sample_rate: u32, channel_count: usize, format: SampleFormat) -> Self {
        Self {
            sample_rate,
            channel_count,
            format,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    #[inline]
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        self.format.byte_count()
    }

    /// Duration of one sample.
    pub fn time_base(&self) -> Rational {
        Rational::new(1, self.sample_rate as i64)
    }

    pub fn is_valid(&self) -> bool {
        self.sample_rate > 0 && self.channel_count > 0
    }

    /// Samples needed to cover `time`, rounded up.
    pub fn time_to_samples(&self, time: Rational) -> i64 {
        (time * Rational::from_integer(self.sample_rate as i64)).ceil()
    }

    pub fn time_to_bytes_per_channel(&self, time: Rational) -> i64 {
        self.samples_to_bytes_per_channel(self.time_to_samples(time))
    }

    pub fn samples_to_bytes_per_channel(&self, samples: i64) -> i64 {
        samples * self.bytes_per_sample() as i64
    }

    pub fn bytes_per_channel_to_samples(&self, bytes: i64) -> i64 {
        bytes / self.bytes_per_sample() as i64
    }

    pub fn samples_to_time(&self, samples: i64) -> Rational {
        Rational::new(samples, self.sample_rate as i64)
    }

    pub fn bytes_per_channel_to_time(&self, bytes: i64) -> Rational {
        self.samples_to_time(self.bytes_per_channel_to_samples(bytes))
    }
}

impl Default for AudioParams {
    fn default() -> Self {
        Self::new(48_000, 2, SampleFormat::F32)
    }
}
