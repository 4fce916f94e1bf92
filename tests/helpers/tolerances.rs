//! Tolerance constants for comparing decoded audio.
//!
//! Float formats round-trip exactly; integer formats lose up to one
//! quantization step.

/// Floating point rounding errors.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// 16-bit quantization step size.
pub const INT16_EPSILON: f32 = 1.0 / 32768.0;

/// 8-bit quantization step size.
pub const INT8_EPSILON: f32 = 1.0 / 128.0;
