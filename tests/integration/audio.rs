//! Segmented PCM integration tests
//!
//! Tests writing rendered audio into per-channel segment files and reading it
//! back, across segment boundaries and sample formats.

use crate::helpers::tolerances::*;
use crate::helpers::*;
use std::fs;
use tutti_render_cache::prelude::*;

fn segment_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .filter(|name| name != "state")
        .collect();
    names.sort();
    names
}

#[test]
fn test_write_then_read_back() {
    let (_dir, system) = test_system();
    let handle = system.create_audio_cache(stereo_f32()).unwrap();
    let mut cache = handle.lock();

    let samples = sine_buffer(5.0, 2, 1000);
    let range = r(0, 1);
    assert!(cache
        .write_pcm(&range, &TimeRangeList::from(range), Some(&samples))
        .unwrap());

    let back = cache.read_pcm(&range).unwrap();
    assert_eq!(back, samples);
    assert!(!cache.has_invalidated_ranges(&range));
}

/// 100 samples of f32 per segment; 250 samples starting at sample 50 touch
/// segments 0..=2 on both channels.
#[test]
fn test_segment_boundaries() {
    let (_dir, system) = test_system_with_segment_size(400);
    let handle = system.create_audio_cache(stereo_f32()).unwrap();
    let mut cache = handle.lock();

    let range = TimeRange::new(t(50, 1000), t(300, 1000));
    let samples = sine_buffer(3.0, 2, 250);
    assert!(cache
        .write_pcm(&range, &TimeRangeList::from(range), Some(&samples))
        .unwrap());

    let dir = cache.directory();
    assert_eq!(
        segment_files(&dir),
        vec!["0.0", "0.1", "1.0", "1.1", "2.0", "2.1"]
    );
    for name in segment_files(&dir) {
        let size = fs::metadata(dir.join(&name)).unwrap().len();
        assert!(size <= 400, "{} holds {} bytes", name, size);
    }
    assert_eq!(fs::metadata(dir.join("1.0")).unwrap().len(), 400);
    assert_eq!(fs::metadata(dir.join("2.1")).unwrap().len(), 400);

    let back = cache.read_pcm(&range).unwrap();
    assert_eq!(back, samples);
}

#[test]
fn test_only_valid_sub_ranges_are_written() {
    let (_dir, system) = test_system();
    let handle = system.create_audio_cache(stereo_f32()).unwrap();
    let mut cache = handle.lock();

    let range = r(0, 1);
    let samples = sine_buffer(2.0, 2, 1000);
    let valid: TimeRangeList = [
        TimeRange::new(0, t(1, 4)),
        TimeRange::new(t(3, 4), 1),
    ]
    .into_iter()
    .collect();
    assert!(cache.write_pcm(&range, &valid, Some(&samples)).unwrap());

    assert_eq!(
        cache.get_invalidated_ranges(&range).as_slice(),
        &[TimeRange::new(t(1, 4), t(3, 4))]
    );

    let back = cache.read_pcm(&range).unwrap();
    assert_samples_eq(&back.channel(0)[..250], &samples.channel(0)[..250], FLOAT_EPSILON);
    assert_samples_eq(&back.channel(1)[750..], &samples.channel(1)[750..], FLOAT_EPSILON);
    assert!(back.channel(0)[250..750].iter().all(|&s| s == 0.0));
}

#[test]
fn test_write_silence_overwrites() {
    let (_dir, system) = test_system();
    let handle = system.create_audio_cache(stereo_f32()).unwrap();
    let mut cache = handle.lock();

    let range = r(0, 1);
    let samples = sine_buffer(7.0, 2, 1000);
    cache
        .write_pcm(&range, &TimeRangeList::from(range), Some(&samples))
        .unwrap();
    cache.invalidate(&range);
    assert!(cache.write_silence(&range).unwrap());

    let back = cache.read_pcm(&range).unwrap();
    assert!(back.channels().all(|channel| channel.iter().all(|&s| s == 0.0)));
    assert!(!cache.has_invalidated_ranges(&range));
}

#[test]
fn test_integer_formats_round_trip() {
    let (_dir, system) = test_system();
    for (format, epsilon) in [
        (SampleFormat::S16, INT16_EPSILON),
        (SampleFormat::U8, INT8_EPSILON),
        (SampleFormat::F64, FLOAT_EPSILON),
    ] {
        let params = AudioParams::new(TEST_SAMPLE_RATE, 1, format);
        let handle = system.create_audio_cache(params).unwrap();
        let mut cache = handle.lock();

        let samples = sine_buffer(4.0, 1, 500);
        let range = TimeRange::new(0, t(1, 2));
        cache
            .write_pcm(&range, &TimeRangeList::from(range), Some(&samples))
            .unwrap();

        let back = cache.read_pcm(&range).unwrap();
        assert_samples_eq(back.channel(0), samples.channel(0), epsilon);
    }
}

#[test]
fn test_failed_write_stays_unvalidated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    let system = CacheSystem::builder().cache_root(&root).build().unwrap();
    let handle = system.create_audio_cache(stereo_f32()).unwrap();
    let mut cache = handle.lock();

    // Block the cache directory with a plain file.
    fs::write(cache.directory(), b"in the way").unwrap();

    let range = r(0, 1);
    let ok = cache
        .write_pcm(&range, &TimeRangeList::from(range), Some(&sine_buffer(1.0, 2, 1000)))
        .unwrap();
    assert!(!ok);
    assert!(cache.has_invalidated_ranges(&range));
    assert!(cache.validated_ranges().is_empty());
}

#[test]
fn test_wrong_payload_is_an_error() {
    let (_dir, system) = test_system();
    let handle = system.create_waveform_cache(2);
    let mut cache = handle.lock();
    assert!(matches!(
        cache.write_silence(&r(0, 1)),
        Err(tutti_render_cache::cache::Error::PayloadMismatch { .. })
    ));
}
