//! Frame-by-frame iteration over a [`TimeRangeList`].

use super::{Rational, TimeRange, TimeRangeList};

/// Yields every frame time covered by a list of ranges at a fixed timebase.
///
/// Each range's in point is snapped down to the timebase grid. Gaps between
/// ranges are skipped, and a frame shared by two ranges is produced once.
#[derive(Clone, Debug)]
pub struct FrameIterator {
    ranges: Vec<TimeRange>,
    timebase: Rational,
    range_index: usize,
    next_frame: Option<i64>,
    last_frame: Option<i64>,
}

impl FrameIterator {
    /// A non-positive timebase produces an empty iterator.
    pub fn new(list: &TimeRangeList, timebase: Rational) -> Self {
        let ranges = if timebase > Rational::ZERO {
            list.sorted()
        } else {
            Vec::new()
        };
        Self {
            ranges,
            timebase,
            range_index: 0,
            next_frame: None,
            last_frame: None,
        }
    }

    pub fn timebase(&self) -> Rational {
        self.timebase
    }

    /// Snap `t` down to the frame grid.
    pub fn snap(&self, t: Rational) -> Rational {
        self.frame_time(self.frame_index(t))
    }

    fn frame_index(&self, t: Rational) -> i64 {
        (t / self.timebase).floor()
    }

    fn frame_time(&self, index: i64) -> Rational {
        Rational::from_integer(index) * self.timebase
    }
}

impl Iterator for FrameIterator {
    type Item = Rational;

    fn next(&mut self) -> Option<Rational> {
        loop {
            let range = *self.ranges.get(self.range_index)?;

            let index = match self.next_frame {
                Some(index) => index,
                None => {
                    let first = self.frame_index(range.in_point());
                    match self.last_frame {
                        Some(last) if last >= first => last + 1,
                        _ => first,
                    }
                }
            };

            if self.frame_time(index) >= range.out_point() {
                self.range_index += 1;
                self.next_frame = None;
                continue;
            }

            self.next_frame = Some(index + 1);
            self.last_frame = Some(index);
            return Some(self.frame_time(index));
        }
    }
}
