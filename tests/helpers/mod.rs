//! Test helpers and fixtures for render cache integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): float sample formats
//! - `INT16_EPSILON`: 16-bit sample formats
//! - `INT8_EPSILON`: 8-bit sample formats

#![allow(dead_code)]

pub mod tolerances;

use tempfile::TempDir;
use tutti_render_cache::prelude::*;

/// Low sample rate keeps segment math readable.
pub const TEST_SAMPLE_RATE: u32 = 1000;

/// Cache system rooted in a fresh temporary directory.
///
/// The directory lives as long as the returned guard.
pub fn test_system() -> (TempDir, CacheSystem) {
    test_system_with_segment_size(10 * 1024 * 1024)
}

pub fn test_system_with_segment_size(bytes: u64) -> (TempDir, CacheSystem) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let system = CacheSystem::builder()
        .cache_root(dir.path())
        .segment_size_per_channel(bytes)
        .build()
        .expect("Failed to create cache system");
    (dir, system)
}

pub fn stereo_f32() -> AudioParams {
    AudioParams::new(TEST_SAMPLE_RATE, 2, SampleFormat::F32)
}

pub fn r(a: i64, b: i64) -> TimeRange {
    TimeRange::new(a, b)
}

/// Seconds as an exact fraction.
pub fn t(num: i64, den: i64) -> Rational {
    Rational::new(num, den)
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f64, sample_rate: u32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Multichannel sine buffer; channel `c` runs at `frequency * (c + 1)`.
pub fn sine_buffer(frequency: f64, channels: usize, num_samples: usize) -> SampleBuffer {
    SampleBuffer::from_planar(
        (0..channels)
            .map(|c| generate_sine(frequency * (c + 1) as f64, TEST_SAMPLE_RATE, num_samples))
            .collect(),
    )
    .expect("Channels have equal length")
}

/// Assert two slices match within tolerance.
pub fn assert_samples_eq(actual: &[f32], expected: &[f32], epsilon: f32) {
    assert_eq!(actual.len(), expected.len(), "Length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            approx::abs_diff_eq!(*a, *e, epsilon = epsilon),
            "Sample {} differs: {} vs {} (epsilon {})",
            i,
            a,
            e,
            epsilon
        );
    }
}
