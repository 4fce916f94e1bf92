//! PCM description and buffers.

mod buffer;
mod format;
mod params;

pub use buffer::SampleBuffer;
pub use format::SampleFormat;
pub use params::AudioParams;
