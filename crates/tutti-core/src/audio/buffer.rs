//! Planar multichannel sample buffers.

use crate::error::{Error, Result};

/// Planar f32 audio: one contiguous vector per channel, all the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_count: usize,
}

impl SampleBuffer {
    /// Silent buffer of the given shape.
    pub fn new(channel_count: usize, sample_count: usize) -> Self {
        Self {
            channels: vec![vec![0.0; sample_count]; channel_count],
            sample_count,
        }
    }

    /// Wrap existing channel data. Every channel must have the same length.
    pub fn from_planar(channels: Vec<Vec<f32>>) -> Result<Self> {
        let sample_count = channels.first().map_or(0, Vec::len);
        if let Some((channel, data)) = channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != sample_count)
        {
            return Err(Error::ChannelLengthMismatch {
                channel,
                expected: sample_count,
                found: data.len(),
            });
        }
        Ok(Self {
            channels,
            sample_count,
        })
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0 || self.channels.is_empty()
    }

    /// Samples of one channel; an out-of-range index gives an empty slice.
    pub fn channel(&self, index: usize) -> &[f32] {
        self.channels.get(index).map_or(&[], Vec::as_slice)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Set one sample; out-of-range positions are ignored.
    pub fn set(&mut self, channel: usize, index: usize, value: f32) {
        if let Some(sample) = self.channels.get_mut(channel).and_then(|c| c.get_mut(index)) {
            *sample = value;
        }
    }

    pub fn silence(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }

    /// Zero `length` samples starting at `start`, clamped to the buffer.
    pub fn silence_range(&mut self, start: usize, length: usize) {
        let start = start.min(self.sample_count);
        let end = start.saturating_add(length).min(self.sample_count);
        for channel in &mut self.channels {
            channel[start..end].fill(0.0);
        }
    }
}
