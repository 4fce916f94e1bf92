//! Timeline primitives shared by the render cache crates.
//!
//! # Primary API
//!
//! - [`Rational`], [`TimeRange`], [`TimeRangeList`]: exact time values and interval sets
//! - [`FrameIterator`]: frame-aligned walk over a range list
//! - [`JobClock`] / [`RangeJobTracker`]: version stamps for computed ranges
//! - [`AudioParams`] / [`SampleBuffer`]: PCM description and planar buffers
//!
//! # Example
//!
//! ```
//! use tutti_core::{TimeRange, TimeRangeList};
//!
//! let mut valid = TimeRangeList::new();
//! valid.insert(TimeRange::new(0, 10));
//! valid.remove(&TimeRange::new(4, 6));
//! assert_eq!(valid.len(), 2);
//! ```

pub mod audio;
pub mod error;
pub mod job;
pub mod time;

pub use audio::{AudioParams, SampleBuffer, SampleFormat};
pub use error::{Error, Result};
pub use job::{JobClock, JobVersion, RangeJobTracker};
pub use time::{remove_ranged, FrameIterator, Ranged, Rational, TimeRange, TimeRangeList};
