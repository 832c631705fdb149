//! Audio file export
//!
//! Audio sinks that write rendered frames to disk.

pub mod wav;

pub use wav::{WavSink, WAV_BITS_PER_SAMPLE, WAV_CHANNELS};
