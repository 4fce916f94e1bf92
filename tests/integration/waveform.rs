//! Waveform cache integration tests
//!
//! Tests summaries built from rendered audio, sharing them between caches and
//! drawing them at different zoom levels.

use crate::helpers::*;
use tutti_render_cache::analysis::mipmap_rates;
use tutti_render_cache::prelude::*;
use tutti_render_cache::{PixelRect, Raster, WaveformSummaryBuffer};

fn summarize(samples: &SampleBuffer, start: Rational) -> WaveformSummaryBuffer {
    let mut buffer = WaveformSummaryBuffer::new(samples.channel_count());
    buffer.overwrite_samples(samples, TEST_SAMPLE_RATE, start);
    buffer
}

/// Every coarse bucket bounds every raw sample it covers.
#[test]
fn test_coarse_buckets_bound_raw_samples() {
    let samples = sine_buffer(3.7, 2, 4000);
    let buffer = summarize(&samples, Rational::ZERO);

    for rate in mipmap_rates() {
        let Some(level) = buffer.level(rate) else {
            continue;
        };
        for (bucket, blocks) in level.chunks(2).enumerate() {
            let from = (Rational::from_integer(bucket as i64) / rate * Rational::from_integer(TEST_SAMPLE_RATE as i64)).ceil();
            let to = (Rational::from_integer(bucket as i64 + 1) / rate * Rational::from_integer(TEST_SAMPLE_RATE as i64)).ceil();
            let from = (from.max(0) as usize).min(4000);
            let to = (to.max(0) as usize).min(4000);

            for (channel, block) in blocks.iter().enumerate() {
                for &sample in &samples.channel(channel)[from..to] {
                    assert!(
                        block.min <= sample && sample <= block.max,
                        "rate {} bucket {} channel {}: {} outside [{}, {}]",
                        rate,
                        bucket,
                        channel,
                        sample,
                        block.min,
                        block.max
                    );
                }
            }
        }
    }
}

/// Mid then OverwriteSums at the same offset reproduces the original buckets.
#[test]
fn test_mid_overwrite_round_trip() {
    let samples = sine_buffer(2.0, 1, 8000);
    let original = summarize(&samples, Rational::ZERO);

    let offset = Rational::from_integer(2);
    let length = Rational::from_integer(3);
    let piece = original.mid(offset, length);

    let mut copy = WaveformSummaryBuffer::new(1);
    copy.overwrite_sums(&piece, offset, Rational::ZERO, length);

    for rate in mipmap_rates() {
        let first = (offset * rate).floor() as usize;
        let end = ((offset + length) * rate).ceil() as usize;
        let (Some(a), Some(b)) = (original.level(rate), copy.level(rate)) else {
            continue;
        };
        assert_eq!(&a[first..end], &b[first..end], "rate {}", rate);
    }
}

#[test]
fn test_cache_summary_matches_source() {
    let (_dir, system) = test_system();
    let handle = system.create_waveform_cache(2);
    let mut cache = handle.lock();

    let samples = sine_buffer(1.0, 2, 2000);
    let summary = summarize(&samples, Rational::ZERO);
    let range = r(0, 2);
    cache
        .write_waveform(&range, &TimeRangeList::from(range), Some(&summary))
        .unwrap();

    assert_eq!(cache.waveform_length().unwrap(), Rational::from_integer(2));
    let blocks = cache.waveform_summary(Rational::ZERO, Rational::ONE).unwrap();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].max > 0.99 && blocks[0].min < -0.99);
}

/// A derived clip draws from its source's buffer without copying it.
#[test]
fn test_draw_through_passthrough() {
    let (_dir, system) = test_system();
    let source = system.create_waveform_cache(1);
    let derived = system.create_waveform_cache(1);

    let loud = SampleBuffer::from_planar(vec![(0..4000)
        .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
        .collect()])
    .unwrap();
    {
        let mut cache = source.lock();
        let range = r(0, 2);
        cache
            .write_waveform(&range, &TimeRangeList::from(range), Some(&summarize(&loud, Rational::ZERO)))
            .unwrap();
    }

    let (source_id, derived_id) = (source.lock().id(), derived.lock().id());
    system.set_passthrough(derived_id, source_id).unwrap();

    let mut raster = Raster::new(40, 100);
    derived
        .lock()
        .draw_waveform(&mut raster, PixelRect::new(0, 0, 40, 100), 10.0, Rational::ZERO, false)
        .unwrap();
    assert!((0..20).all(|x| raster.column_extent(x) == Some((25, 75))));
    assert!((20..40).all(|x| raster.column_extent(x).is_none()));

    // The source keeps writing; the derived cache sees it through the shared buffer.
    source.lock().waveform_buffer().unwrap().write().overwrite_silence(Rational::ZERO, Rational::ONE);
    raster.clear();
    derived
        .lock()
        .draw_waveform(&mut raster, PixelRect::new(0, 0, 40, 100), 10.0, Rational::ZERO, false)
        .unwrap();
    assert_eq!(raster.column_extent(0), Some((50, 50)));

    // An edit on the derived clip drops its claim on that span.
    derived.lock().invalidate(&TimeRange::new(Rational::ZERO, Rational::ONE));
    raster.clear();
    derived
        .lock()
        .draw_waveform(&mut raster, PixelRect::new(0, 0, 40, 100), 10.0, Rational::ZERO, false)
        .unwrap();
    assert!(raster.column_extent(0).is_none());
    assert_eq!(raster.column_extent(15), Some((25, 75)));
}

#[test]
fn test_rectified_draw() {
    let samples = SampleBuffer::from_planar(vec![(0..2000)
        .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
        .collect()])
    .unwrap();
    let buffer = summarize(&samples, Rational::ZERO);

    let mut raster = Raster::new(10, 100);
    buffer.draw_waveform(&mut raster, PixelRect::new(0, 0, 10, 100), 5.0, Rational::ZERO, true);
    assert_eq!(raster.column_extent(0), Some((49, 99)));
}

#[test]
fn test_trim_then_resize() {
    let samples = sine_buffer(1.0, 1, 4000);
    let mut buffer = summarize(&samples, Rational::ZERO);

    buffer.trim_range(Rational::ONE, Rational::from_integer(2));
    assert_eq!(buffer.virtual_start(), Rational::ONE);
    assert_eq!(buffer.length(), Rational::from_integer(2));

    buffer.resize(Rational::from_integer(5));
    let tail = buffer.summary_from_time(Rational::from_integer(4), Rational::ONE);
    assert_eq!(tail, vec![tutti_render_cache::WaveformBlock::SILENT]);
}
