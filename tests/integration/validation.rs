//! Validity lifecycle integration tests
//!
//! Tests the invalidated → requested → validated cycle as a render scheduler
//! drives it, and the range-set properties it relies on.

use crate::helpers::*;
use tutti_render_cache::prelude::*;
use tutti_render_cache::{JobVersion, RangeJobTracker};

/// Validate [0,10), invalidate [4,6): only [4,6) is left to render.
#[test]
fn test_validate_invalidate_end_to_end() {
    let (_dir, system) = test_system();
    let cache = system.create_waveform_cache(2);
    let mut cache = cache.lock();

    cache.validate(&r(0, 10), true);
    cache.invalidate(&r(4, 6));

    assert_eq!(cache.get_invalidated_ranges(&r(0, 10)).as_slice(), &[r(4, 6)]);
    assert!(cache.has_invalidated_ranges(&r(0, 10)));
    assert!(!cache.has_invalidated_ranges(&r(0, 4)));
}

#[test]
fn test_merge_keeps_insertion_order() {
    let mut set = TimeRangeList::new();
    set.insert(r(0, 6));
    set.insert(r(20, 30));
    set.insert(r(6, 10));
    assert_eq!(set.as_slice(), &[r(20, 30), r(0, 10)]);
}

#[test]
fn test_remove_split_cover_and_repeat() {
    let mut set = TimeRangeList::from(r(0, 10));
    set.insert(r(20, 30));

    set.remove(&r(4, 6));
    set.remove(&r(18, 32));
    let once = set.clone();
    set.remove(&r(4, 6));

    assert_eq!(set, once);
    assert_eq!(set.sorted(), vec![r(0, 4), r(6, 10)]);
}

#[test]
fn test_newly_extended_range_starts_invalidated() {
    let (_dir, system) = test_system();
    let cache = system.create_waveform_cache(1);
    let mut cache = cache.lock();

    cache.validate(&r(0, 10), false);
    assert_eq!(cache.get_invalidated_ranges(&r(0, 15)).as_slice(), &[r(10, 15)]);
}

#[test]
fn test_request_fill_cycle() {
    let (_dir, system) = test_system();
    let events = system.subscribe();
    let handle = system.create_waveform_cache(1);
    let context = ContextId::generate();

    let id = {
        let mut cache = handle.lock();
        cache.request(context, &r(0, 5));
        cache.id()
    };

    // Scheduler side: pick up the request, "render" it, validate.
    let event = events.try_recv().unwrap();
    let CacheEvent::Requested { cache: target, range, .. } = event else {
        panic!("expected a request, got {:?}", event);
    };
    assert_eq!(target, id);

    {
        let worker_handle = system.cache(target).unwrap();
        let mut cache = worker_handle.lock();
        cache.validate(&range, true);
        cache.clear_request_range(&range);
    }

    assert_eq!(
        events.try_recv().unwrap(),
        CacheEvent::Validated { cache: id, range: r(0, 5) }
    );
    let cache = handle.lock();
    assert!(cache.requested_ranges().is_empty());
    assert!(!cache.has_invalidated_ranges(&r(0, 5)));
}

#[test]
fn test_cancel_all_is_advisory() {
    let (_dir, system) = test_system();
    let events = system.subscribe();
    let handle = system.create_waveform_cache(1);
    let mut cache = handle.lock();

    cache.request(ContextId::generate(), &r(0, 5));
    cache.cancel_all();
    // A late fill still lands.
    cache.validate(&r(0, 5), false);

    let received: Vec<_> = events.try_iter().collect();
    assert!(matches!(received.last(), Some(CacheEvent::CancelAll { .. })));
    assert!(!cache.has_invalidated_ranges(&r(0, 5)));
}

#[test]
fn test_stale_fill_is_detectable() {
    let (_dir, system) = test_system();
    let mut tracker = RangeJobTracker::new();

    let stamped = system.job_clock().acquire();
    tracker.insert(r(0, 10), stamped);

    // The graph changes while the job runs.
    let latest = system.advance_graph_version();
    tracker.insert(r(4, 6), latest);

    assert!(tracker.is_current(t(1, 1), stamped));
    assert!(!tracker.is_current(t(5, 1), stamped));
    assert!(tracker.is_current(t(5, 1), latest));
    assert!(!tracker.is_current(t(12, 1), JobVersion(u64::MAX)));

    let current = tracker.current_sub_ranges(&r(0, 10), stamped);
    assert_eq!(current.sorted(), vec![r(0, 4), r(6, 10)]);
}
