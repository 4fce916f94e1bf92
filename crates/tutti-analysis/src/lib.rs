//! # Tutti Analysis
//!
//! Waveform summaries for timeline drawing.
//!
//! - **Summary buffers**: min/max mipmaps from 1/8 to 1024 buckets per second
//! - **Drawing**: per-pixel strokes onto any [`WaveformCanvas`]
//!
//! ## Example
//!
//! ```rust
//! use tutti_analysis::{PixelRect, Raster, WaveformSummaryBuffer};
//! use tutti_core::{Rational, SampleBuffer};
//!
//! let samples = SampleBuffer::from_planar(vec![vec![0.25; 4800]]).unwrap();
//! let mut waveform = WaveformSummaryBuffer::new(1);
//! waveform.overwrite_samples(&samples, 48_000, Rational::ZERO);
//!
//! let mut raster = Raster::new(64, 32);
//! waveform.draw_waveform(&mut raster, PixelRect::new(0, 0, 64, 32), 640.0, Rational::ZERO, false);
//! ```

pub mod draw;
pub mod waveform;

pub use draw::{PixelRect, Raster, WaveformCanvas};
pub use waveform::{
    maximum_rate, minimum_rate, mipmap_rates, Summary, WaveformBlock, WaveformSummaryBuffer,
};
