//! Rational timeline values, ranges and range sets.

mod frames;
mod range;
mod range_list;
mod rational;

pub use frames::FrameIterator;
pub use range::TimeRange;
pub use range_list::{remove_ranged, Ranged, TimeRangeList};
pub use rational::Rational;
