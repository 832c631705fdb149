//! Yamaha AICA Sound Processor Emulator
//!
//! A sample-accurate emulator of the AICA sound unit: a 64-voice wavetable
//! synthesizer with per-voice envelopes and LFOs, three sample-clocked
//! timers, a two-view interrupt controller and a register window shared by
//! two CPUs. Register writes go in, interleaved 16-bit stereo frames at
//! 44.1 kHz come out.
//!
//! # Features
//! - 16-bit PCM, 8-bit PCM, 4-bit ADPCM (one-shot and streaming) and noise
//! - hardware-exact attack/decay/release step tables with key-rate scaling
//! - amplitude and pitch LFOs with four waveforms each
//! - CD-audio input and effects-processor return mixing
//! - byte/word register access with per-byte side effects
//! - DMA trigger registers with deferred completion, real-time clock
//!
//! # Crate feature flags
//! - `streaming` (default): thread-safe frame queue audio sink (`streaming`)
//! - `export-wav` (default): WAV file audio sink (`export`, enables `hound`)
//! - `cli` (default): the `aica-render` session renderer binary
//!
//! # Quick start
//! ```
//! use aica::{AccessSize, Aica, AicaConfig, Host};
//!
//! let mut aica = Aica::new(AicaConfig::default(), Host::new());
//!
//! // one cycle of a square wave, 16-bit PCM at address 0
//! let wave: Vec<i16> = (0..32).map(|i| if i < 16 { 8000 } else { -8000 }).collect();
//! aica.ram_mut().load_pcm16(0, &wave);
//!
//! aica.write(0x2800, 0x000F, AccessSize::Word); // MVOL
//! aica.write(0x0008, 0, AccessSize::Word); // LSA
//! aica.write(0x000C, 32, AccessSize::Word); // LEA
//! aica.write(0x0010, 0x001F, AccessSize::Word); // AR = 31
//! aica.write(0x0024, 0x0F00, AccessSize::Word); // DISDL = 15
//! aica.write(0x0000, 0xC200, AccessSize::Word); // loop on, key on + execute
//!
//! for _ in 0..64 {
//!     aica.time_step();
//! }
//! assert!(aica.channel(0).is_enabled());
//! ```

#![warn(missing_docs)]

pub mod aica;
pub mod config;
pub mod host;
pub mod interrupt;
pub mod mixer;
pub mod ram;
pub mod registers;
pub mod session;
pub mod tables;
pub mod timer;
pub mod voice;

#[cfg(feature = "export-wav")]
pub mod export;
#[cfg(feature = "streaming")]
pub mod streaming;

/// Error types for sound unit operations
///
/// The emulation path itself never fails; errors come from loading
/// configuration and sessions and from writing audio files.
#[derive(thiserror::Error, Debug)]
pub enum AicaError {
    /// Error while parsing a session description
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for AicaError {
    /// Converts a String into `AicaError::Other`.
    ///
    /// Prefer the specific variants (`ParseError`, `ConfigError`,
    /// `AudioFileError`) where the failure has a known kind.
    fn from(msg: String) -> Self {
        AicaError::Other(msg)
    }
}

impl From<&str> for AicaError {
    /// Converts a string slice into `AicaError::Other`.
    fn from(msg: &str) -> Self {
        AicaError::Other(msg.to_string())
    }
}

/// Result type for sound unit operations
pub type Result<T> = std::result::Result<T, AicaError>;

// Public API exports
pub use aica::{AccessSize, Aica, BATCH_SAMPLES, SAMPLE_RATE};
pub use config::{AicaConfig, MixingMode};
pub use host::{
    AudioSink, CddaSource, EffectsProcessor, Host, InterruptLines, SystemMemory,
};
pub use interrupt::InterruptFlags;
pub use ram::SoundRam;
pub use session::Session;
pub use timer::TimerId;
pub use voice::{encode_adpcm, EnvelopeState, SampleFormat};

#[cfg(feature = "export-wav")]
pub use export::WavSink;
#[cfg(feature = "streaming")]
pub use streaming::FrameQueue;
