//! Encoded video frames, one file per timestamp.
//!
//! Frame `ts` covers `[ts * timebase, (ts + 1) * timebase)` and is stored as
//! `<directory>/{ts}.frame`. Frame bytes are opaque here.

use crate::engine::CacheEngine;
use crate::error::Result;
use crate::payload::{Payload, PayloadHandle, PayloadKind};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tutti_core::{FrameIterator, Rational, TimeRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePayload {
    directory: PathBuf,
    timebase: Rational,
}

impl FramePayload {
    pub fn new(directory: impl Into<PathBuf>, timebase: Rational) -> Self {
        Self {
            directory: directory.into(),
            timebase,
        }
    }

    pub fn check_timebase(timebase: Rational) -> Result<()> {
        if timebase <= Rational::ZERO {
            return Err(tutti_core::Error::InvalidTimebase(format!("{timebase:?}")).into());
        }
        Ok(())
    }

    pub fn timebase(&self) -> Rational {
        self.timebase
    }

    pub(crate) fn set_timebase(&mut self, timebase: Rational) {
        self.timebase = timebase;
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub(crate) fn set_directory(&mut self, directory: PathBuf) {
        self.directory = directory;
    }

    pub fn to_time(&self, timestamp: i64) -> Rational {
        Rational::from_integer(timestamp) * self.timebase
    }

    /// Nearest frame to `time`.
    pub fn to_timestamp(&self, time: Rational) -> i64 {
        (time / self.timebase + Rational::new(1, 2)).floor()
    }

    pub fn frame_path(&self, timestamp: i64) -> PathBuf {
        self.directory.join(format!("{timestamp}.frame"))
    }

    fn read(&self, timestamp: i64) -> Result<Option<Vec<u8>>> {
        match fs::read(self.frame_path(timestamp)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl CacheEngine {
    pub fn frame_payload(&self) -> Result<&FramePayload> {
        match &self.payload {
            Payload::Frames(frames) => Ok(frames),
            _ => Err(self.mismatch(PayloadKind::Frames)),
        }
    }

    pub fn timebase(&self) -> Result<Rational> {
        self.frame_payload().map(FramePayload::timebase)
    }

    /// Changing the timebase invalidates every cached frame.
    pub fn set_timebase(&mut self, timebase: Rational) -> Result<()> {
        FramePayload::check_timebase(timebase)?;
        let changed = match &mut self.payload {
            Payload::Frames(frames) if frames.timebase() != timebase => {
                frames.set_timebase(timebase);
                true
            }
            Payload::Frames(_) => false,
            _ => return Err(self.mismatch(PayloadKind::Frames)),
        };
        if changed {
            self.invalidate_all();
        }
        Ok(())
    }

    pub fn validate_timestamp(&mut self, timestamp: i64) -> Result<()> {
        let frames = self.frame_payload()?;
        let range = TimeRange::new(frames.to_time(timestamp), frames.to_time(timestamp + 1));
        self.validate(&range, true);
        Ok(())
    }

    /// Validate the frame nearest to `time`.
    pub fn validate_time(&mut self, time: Rational) -> Result<()> {
        let timestamp = self.frame_payload()?.to_timestamp(time);
        self.validate_timestamp(timestamp)
    }

    pub fn is_frame_cached(&self, time: Rational) -> bool {
        self.validated.contains(time)
    }

    pub fn frame_path(&self, timestamp: i64) -> Result<PathBuf> {
        Ok(self.frame_payload()?.frame_path(timestamp))
    }

    pub fn save_frame(&self, timestamp: i64, bytes: &[u8]) -> Result<()> {
        let frames = self.frame_payload()?;
        fs::create_dir_all(frames.directory())?;
        fs::write(frames.frame_path(timestamp), bytes)?;
        tracing::debug!("Saved frame {} of cache {}", timestamp, self.id());
        Ok(())
    }

    /// Stored bytes for `timestamp`, from a passthrough source when one
    /// covers the frame. `None` if nothing was saved.
    ///
    /// A validated frame whose file has gone missing is invalidated.
    pub fn load_frame(&mut self, timestamp: i64) -> Result<Option<Vec<u8>>> {
        let frames = self.frame_payload()?;
        let time = frames.to_time(timestamp);
        let range = TimeRange::new(time, frames.to_time(timestamp + 1));

        if let Some(passthrough) = self.passthrough_at(time) {
            if let PayloadHandle::Frames(source) = &passthrough.handle {
                let source_timestamp = source.to_timestamp(time);
                if let Some(bytes) = source.read(source_timestamp)? {
                    return Ok(Some(bytes));
                }
            }
        }

        let bytes = frames.read(timestamp)?;
        if bytes.is_none() && self.validated.contains(time) {
            tracing::debug!("Frame {} of cache {} is missing on disk", timestamp, self.id());
            self.invalidate(&range);
        }
        Ok(bytes)
    }

    /// Frames in `bounds` that still need rendering.
    pub fn invalidated_frames(&self, bounds: &TimeRange) -> Result<FrameIterator> {
        let timebase = self.timebase()?;
        Ok(FrameIterator::new(&self.get_invalidated_ranges(bounds), timebase))
    }
}
