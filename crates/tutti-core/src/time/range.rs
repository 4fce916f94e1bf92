//! Half-open time ranges.

use super::Rational;
use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// A time range `[in, out)`.
///
/// Construction normalises the order of the two points, so `in <= out`
/// always holds for a value obtained through the public API.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeRange {
    in_point: Rational,
    out_point: Rational,
}

impl TimeRange {
    pub fn new(in_point: impl Into<Rational>, out_point: impl Into<Rational>) -> Self {
        let mut range = Self {
            in_point: in_point.into(),
            out_point: out_point.into(),
        };
        range.normalize();
        range
    }

    /// Range starting at `in_point` lasting `length`.
    pub fn with_length(in_point: Rational, length: Rational) -> Self {
        Self::new(in_point, in_point + length)
    }

    #[inline]
    pub fn in_point(&self) -> Rational {
        self.in_point
    }

    #[inline]
    pub fn out_point(&self) -> Rational {
        self.out_point
    }

    #[inline]
    pub fn length(&self) -> Rational {
        self.out_point - self.in_point
    }

    /// True for zero-length ranges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.in_point == self.out_point
    }

    pub fn set_in(&mut self, in_point: Rational) {
        self.in_point = in_point;
        self.normalize();
    }

    pub fn set_out(&mut self, out_point: Rational) {
        self.out_point = out_point;
        self.normalize();
    }

    pub fn set_range(&mut self, in_point: Rational, out_point: Rational) {
        self.in_point = in_point;
        self.out_point = out_point;
        self.normalize();
    }

    /// Whether the two ranges share any time.
    ///
    /// With `in_inclusive`, a range ending exactly at our in point counts as
    /// overlapping; with `out_inclusive`, one starting exactly at our out point
    /// does. Passing `true, true` therefore also matches ranges that merely touch.
    pub fn overlaps_with(&self, other: &TimeRange, in_inclusive: bool, out_inclusive: bool) -> bool {
        let clear_of_in = if in_inclusive {
            other.out_point < self.in_point
        } else {
            other.out_point <= self.in_point
        };
        let clear_of_out = if out_inclusive {
            other.in_point > self.out_point
        } else {
            other.in_point >= self.out_point
        };
        !clear_of_in && !clear_of_out
    }

    /// Whether `other` lies entirely within this range.
    ///
    /// Exclusive flags require `other` to stay strictly away from that boundary.
    pub fn contains_range(&self, other: &TimeRange, in_inclusive: bool, out_inclusive: bool) -> bool {
        let in_ok = if in_inclusive {
            other.in_point >= self.in_point
        } else {
            other.in_point > self.in_point
        };
        let out_ok = if out_inclusive {
            other.out_point <= self.out_point
        } else {
            other.out_point < self.out_point
        };
        in_ok && out_ok
    }

    /// Whether the point `t` lies in `[in, out)`.
    #[inline]
    pub fn contains(&self, t: Rational) -> bool {
        t >= self.in_point && t < self.out_point
    }

    /// Smallest range covering both.
    pub fn combined(&self, other: &TimeRange) -> TimeRange {
        TimeRange::new(
            self.in_point.min(other.in_point),
            self.out_point.max(other.out_point),
        )
    }

    /// Shared part of both ranges. Disjoint ranges give a zero-length range.
    pub fn intersected(&self, other: &TimeRange) -> TimeRange {
        let in_point = self.in_point.max(other.in_point);
        let out_point = self.out_point.min(other.out_point);
        if out_point < in_point {
            TimeRange::new(in_point, in_point)
        } else {
            TimeRange::new(in_point, out_point)
        }
    }

    /// Consecutive chunks of `chunk_size` starting at the in point; the last
    /// one may be shorter. A non-positive chunk size yields the range itself.
    pub fn split(&self, chunk_size: Rational) -> Vec<TimeRange> {
        if chunk_size <= Rational::ZERO || self.is_empty() {
            return vec![*self];
        }

        let mut chunks = Vec::new();
        let mut start = self.in_point;
        while start < self.out_point {
            let end = (start + chunk_size).min(self.out_point);
            chunks.push(TimeRange::new(start, end));
            start = end;
        }
        chunks
    }

    fn normalize(&mut self) {
        if self.out_point < self.in_point {
            core::mem::swap(&mut self.in_point, &mut self.out_point);
        }
    }
}

impl Add<Rational> for TimeRange {
    type Output = TimeRange;

    fn add(self, rhs: Rational) -> TimeRange {
        TimeRange::new(self.in_point + rhs, self.out_point + rhs)
    }
}

impl Sub<Rational> for TimeRange {
    type Output = TimeRange;

    fn sub(self, rhs: Rational) -> TimeRange {
        TimeRange::new(self.in_point - rhs, self.out_point - rhs)
    }
}

impl AddAssign<Rational> for TimeRange {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl SubAssign<Rational> for TimeRange {
    fn sub_assign(&mut self, rhs: Rational) {
        *self = *self - rhs;
    }
}

impl fmt::Debug for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.in_point, self.out_point)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
