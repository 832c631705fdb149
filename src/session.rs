//! Render Sessions
//!
//! A render session is a JSON description of everything needed to play a
//! piece of sound unit activity offline: configuration, sound RAM images and
//! register writes stamped with the output sample they happen before.
//!
//! ```json
//! {
//!   "duration_samples": 44100,
//!   "ram": [ { "address": 0, "pcm16": [0, 8000, 0, -8000] } ],
//!   "writes": [
//!     { "sample": 0, "addr": 10240, "value": 15, "size": "word" },
//!     { "sample": 0, "addr": 0, "value": 49664 }
//!   ]
//! }
//! ```
//!
//! RAM images come in three encodings: raw `bytes`, little-endian `pcm16`
//! samples, and `adpcm`, which holds 16-bit samples encoded to 4-bit ADPCM
//! on load.

use crate::aica::{AccessSize, Aica, BATCH_SAMPLES};
use crate::config::AicaConfig;
use crate::voice::encode_adpcm;
use crate::{AicaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Width of a session register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteSize {
    /// Single byte
    Byte,
    /// 16-bit word
    #[default]
    Word,
}

impl From<WriteSize> for AccessSize {
    fn from(size: WriteSize) -> Self {
        match size {
            WriteSize::Byte => AccessSize::Byte,
            WriteSize::Word => AccessSize::Word,
        }
    }
}

/// Contents of a sound RAM image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RamData {
    /// Raw bytes
    Bytes(Vec<u8>),
    /// 16-bit PCM samples, stored little endian
    Pcm16(Vec<i16>),
    /// 16-bit samples to be stored as 4-bit ADPCM
    Adpcm(Vec<i16>),
}

impl RamData {
    /// Bytes as they land in sound RAM
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            RamData::Bytes(bytes) => bytes.clone(),
            RamData::Pcm16(samples) => samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
            RamData::Adpcm(samples) => encode_adpcm(samples),
        }
    }
}

/// Data loaded into sound RAM before rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RamImage {
    /// Sound RAM byte address
    pub address: u32,
    /// Contents
    #[serde(flatten)]
    pub data: RamData,
}

/// A register write issued before output sample `sample`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterWrite {
    /// Output sample index
    pub sample: u64,
    /// Register address
    pub addr: u32,
    /// Value
    pub value: u32,
    /// Access width
    #[serde(default)]
    pub size: WriteSize,
}

/// An offline render description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Sound unit configuration
    #[serde(default)]
    pub config: AicaConfig,
    /// Number of output samples to render
    pub duration_samples: u64,
    /// Sound RAM contents
    #[serde(default)]
    pub ram: Vec<RamImage>,
    /// Timestamped register writes
    #[serde(default)]
    pub writes: Vec<RegisterWrite>,
}

impl Session {
    /// Parse and validate a session from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let session: Session =
            serde_json::from_str(text).map_err(|e| AicaError::ParseError(e.to_string()))?;
        session.validate()?;
        Ok(session)
    }

    /// Load a session from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check that every write falls inside the rendered range
    pub fn validate(&self) -> Result<()> {
        if let Some(w) = self.writes.iter().find(|w| w.sample >= self.duration_samples) {
            return Err(AicaError::ParseError(format!(
                "write to {:#06x} at sample {} is past the end ({} samples)",
                w.addr, w.sample, self.duration_samples
            )));
        }
        Ok(())
    }

    /// Load RAM images into `aica`
    pub fn load_ram(&self, aica: &mut Aica) {
        for image in &self.ram {
            let bytes = image.data.to_bytes();
            log::debug!("loading {} bytes at {:#08x}", bytes.len(), image.address);
            aica.ram_mut().load(image.address as usize, &bytes);
        }
    }

    /// Load RAM and clock `aica` through the session
    ///
    /// Writes stamped with sample `n` are applied in file order right before
    /// sample `n` is produced. In batched mode a 32-frame update runs at the
    /// start of every batch. Queued output is flushed at the end.
    pub fn run(&self, aica: &mut Aica) -> Result<()> {
        self.validate()?;
        self.load_ram(aica);

        let mut writes = self.writes.clone();
        writes.sort_by_key(|w| w.sample);
        let mut pending = writes.iter().peekable();

        for sample in 0..self.duration_samples {
            while let Some(w) = pending.next_if(|w| w.sample == sample) {
                aica.write(w.addr, w.value, w.size.into());
            }
            if sample % BATCH_SAMPLES as u64 == 0 {
                aica.update();
            }
            aica.time_step();
        }

        aica.flush_output();
        log::info!("rendered {} samples", self.duration_samples);
        Ok(())
    }

    /// Render to a 16-bit stereo WAV file; returns the frames written
    #[cfg(feature = "export-wav")]
    pub fn render_to_wav<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let wav = crate::export::WavSink::create(path)?;
        let host = crate::host::Host::new().with_audio(wav.clone());
        let mut aica = Aica::new(self.config.clone(), host);
        self.run(&mut aica)?;
        wav.finalize()
    }
}
