//! What a cache stores, selected when the cache is created.

use crate::frame_cache::FramePayload;
use crate::segmented::SegmentedAudioStore;
use crate::waveform_cache::{SharedWaveform, WaveformPayload};
use std::path::PathBuf;
use tutti_core::{AudioParams, Rational};

/// Discriminant of [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Audio,
    Waveform,
    Frames,
}

impl PayloadKind {
    pub(crate) const fn tag(self) -> u8 {
        match self {
            PayloadKind::Audio => 0,
            PayloadKind::Waveform => 1,
            PayloadKind::Frames => 2,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(PayloadKind::Audio),
            1 => Some(PayloadKind::Waveform),
            2 => Some(PayloadKind::Frames),
            _ => None,
        }
    }
}

/// Cache contents behind the shared validity tracking.
#[derive(Debug)]
pub enum Payload {
    /// Raw PCM in per-channel segment files.
    Audio(SegmentedAudioStore),
    /// In-memory waveform summaries.
    Waveform(WaveformPayload),
    /// One encoded file per video frame.
    Frames(FramePayload),
}

/// Shared read access to another cache's payload.
///
/// Waveforms are shared by reference count; disk-backed payloads are shared
/// by pointing at the same directory.
#[derive(Debug, Clone)]
pub enum PayloadHandle {
    Audio(SegmentedAudioStore),
    Waveform(SharedWaveform),
    Frames(FramePayload),
}

/// Parameters a passthrough copies from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadParams {
    Audio(AudioParams),
    Waveform { channels: usize },
    Frames { timebase: Rational },
}

impl PayloadParams {
    pub fn kind(&self) -> PayloadKind {
        match self {
            PayloadParams::Audio(_) => PayloadKind::Audio,
            PayloadParams::Waveform { .. } => PayloadKind::Waveform,
            PayloadParams::Frames { .. } => PayloadKind::Frames,
        }
    }
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Audio(_) => PayloadKind::Audio,
            Payload::Waveform(_) => PayloadKind::Waveform,
            Payload::Frames(_) => PayloadKind::Frames,
        }
    }

    pub fn handle(&self) -> PayloadHandle {
        match self {
            Payload::Audio(store) => PayloadHandle::Audio(store.clone()),
            Payload::Waveform(waveform) => PayloadHandle::Waveform(waveform.shared()),
            Payload::Frames(frames) => PayloadHandle::Frames(frames.clone()),
        }
    }

    pub fn params(&self) -> PayloadParams {
        match self {
            Payload::Audio(store) => PayloadParams::Audio(store.params()),
            Payload::Waveform(waveform) => PayloadParams::Waveform {
                channels: waveform.shared().read().channel_count(),
            },
            Payload::Frames(frames) => PayloadParams::Frames {
                timebase: frames.timebase(),
            },
        }
    }

    /// Adopt `params` if they describe this kind of payload.
    pub(crate) fn apply_params(&mut self, params: &PayloadParams) -> bool {
        match (self, params) {
            (Payload::Audio(store), PayloadParams::Audio(p)) => store.set_params(*p),
            (Payload::Waveform(waveform), PayloadParams::Waveform { channels }) => {
                waveform.shared().write().set_channel_count(*channels)
            }
            (Payload::Frames(frames), PayloadParams::Frames { timebase }) => {
                frames.set_timebase(*timebase)
            }
            _ => return false,
        }
        true
    }

    pub(crate) fn set_directory(&mut self, directory: PathBuf) {
        match self {
            Payload::Audio(store) => store.set_directory(directory),
            Payload::Waveform(_) => {}
            Payload::Frames(frames) => frames.set_directory(directory),
        }
    }
}
