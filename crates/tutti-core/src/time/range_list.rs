//! Sets of non-overlapping time ranges.

use super::{Rational, TimeRange};
use serde::{Deserialize, Serialize};

/// Anything that carries a mutable [`TimeRange`].
///
/// Lets [`remove_ranged`] trim lists of tagged ranges (tracked jobs,
/// passthrough records) with the same rule used by [`TimeRangeList`].
pub trait Ranged: Clone {
    fn time_range(&self) -> &TimeRange;
    fn time_range_mut(&mut self) -> &mut TimeRange;
}

impl Ranged for TimeRange {
    fn time_range(&self) -> &TimeRange {
        self
    }

    fn time_range_mut(&mut self) -> &mut TimeRange {
        self
    }
}

/// Remove `remove` from every element of `list`.
///
/// Elements swallowed whole are dropped, elements strictly containing
/// `remove` are split in two (the second half is appended), and elements
/// overlapping one end are trimmed. Zero-length removals do nothing.
pub fn remove_ranged<T: Ranged>(list: &mut Vec<T>, remove: &TimeRange) {
    if remove.is_empty() {
        return;
    }

    let mut additions = Vec::new();

    list.retain_mut(|item| {
        let current = *item.time_range();

        if remove.contains_range(&current, true, true) {
            return false;
        }

        if current.contains_range(remove, false, false) {
            let mut tail = item.clone();
            tail.time_range_mut().set_in(remove.out_point());
            item.time_range_mut().set_out(remove.in_point());
            additions.push(tail);
        } else if current.in_point() < remove.in_point() && current.out_point() > remove.in_point() {
            item.time_range_mut().set_out(remove.in_point());
        } else if current.in_point() < remove.out_point() && current.out_point() > remove.out_point() {
            item.time_range_mut().set_in(remove.out_point());
        }
        true
    });

    list.extend(additions);
}

/// A set of mutually non-overlapping, non-adjacent time ranges.
///
/// Inserting merges every member that overlaps or touches the new range into
/// one combined member, appended at the end. Members keep that insertion
/// order rather than being sorted by time.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRangeList {
    ranges: Vec<TimeRange>,
}

impl TimeRangeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, range: TimeRange) {
        if range.is_empty() || self.contains_range(&range, true, true) {
            return;
        }

        let mut merged = range;
        self.ranges.retain(|existing| {
            if existing.overlaps_with(&merged, true, true) {
                merged = merged.combined(existing);
                false
            } else {
                true
            }
        });
        self.ranges.push(merged);
    }

    pub fn insert_list(&mut self, other: &TimeRangeList) {
        for range in other.iter() {
            self.insert(*range);
        }
    }

    pub fn remove(&mut self, range: &TimeRange) {
        remove_ranged(&mut self.ranges, range);
    }

    pub fn remove_list(&mut self, other: &TimeRangeList) {
        for range in other.iter() {
            self.remove(range);
        }
    }

    /// Whether a single member covers all of `range`.
    pub fn contains_range(&self, range: &TimeRange, in_inclusive: bool, out_inclusive: bool) -> bool {
        self.ranges
            .iter()
            .any(|r| r.contains_range(range, in_inclusive, out_inclusive))
    }

    /// Whether any member contains the point `t`.
    pub fn contains(&self, t: Rational) -> bool {
        self.ranges.iter().any(|r| r.contains(t))
    }

    pub fn overlaps_with(&self, range: &TimeRange, in_inclusive: bool, out_inclusive: bool) -> bool {
        self.ranges
            .iter()
            .any(|r| r.overlaps_with(range, in_inclusive, out_inclusive))
    }

    /// The parts of this set that fall within `range`.
    pub fn intersects(&self, range: &TimeRange) -> TimeRangeList {
        let mut out = TimeRangeList::new();
        for r in &self.ranges {
            if r.overlaps_with(range, false, false) {
                out.insert(r.intersected(range));
            }
        }
        out
    }

    /// Move every member by `diff`.
    pub fn shift(&mut self, diff: Rational) {
        for r in &mut self.ranges {
            *r += diff;
        }
    }

    /// Move every in point forward by `diff`, dropping members that vanish.
    pub fn trim_in(&mut self, diff: Rational) {
        for r in &mut self.ranges {
            let in_point = (r.in_point() + diff).min(r.out_point());
            r.set_in(in_point);
        }
        self.ranges.retain(|r| !r.is_empty());
    }

    /// Move every out point back by `diff`, dropping members that vanish.
    pub fn trim_out(&mut self, diff: Rational) {
        for r in &mut self.ranges {
            let out_point = (r.out_point() - diff).max(r.in_point());
            r.set_out(out_point);
        }
        self.ranges.retain(|r| !r.is_empty());
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeRange> {
        self.ranges.iter()
    }

    pub fn as_slice(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn first(&self) -> Option<&TimeRange> {
        self.ranges.first()
    }

    pub fn last(&self) -> Option<&TimeRange> {
        self.ranges.last()
    }

    pub fn get(&self, index: usize) -> Option<&TimeRange> {
        self.ranges.get(index)
    }

    /// Members ordered by in point.
    pub fn sorted(&self) -> Vec<TimeRange> {
        let mut sorted = self.ranges.clone();
        sorted.sort_by_key(|r| r.in_point());
        sorted
    }

    /// Total covered length.
    pub fn total_length(&self) -> Rational {
        self.ranges
            .iter()
            .fold(Rational::ZERO, |acc, r| acc + r.length())
    }
}

impl From<TimeRange> for TimeRangeList {
    fn from(range: TimeRange) -> Self {
        let mut list = TimeRangeList::new();
        list.insert(range);
        list
    }
}

impl FromIterator<TimeRange> for TimeRangeList {
    fn from_iter<I: IntoIterator<Item = TimeRange>>(iter: I) -> Self {
        let mut list = TimeRangeList::new();
        for range in iter {
            list.insert(range);
        }
        list
    }
}

impl<'a> IntoIterator for &'a TimeRangeList {
    type Item = &'a TimeRange;
    type IntoIter = std::slice::Iter<'a, TimeRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl std::fmt::Debug for TimeRangeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ranges.iter()).finish()
    }
}
