//! Integration test modules for the render cache

pub mod audio;
pub mod passthrough;
pub mod persistence;
pub mod validation;
pub mod waveform;
