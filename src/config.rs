//! Emulation Settings
//!
//! Host-selectable behavior of the sound unit. Everything has a default, so a
//! JSON file only needs the keys it changes:
//!
//! ```json
//! { "mixing": "batched", "cdda_mute": true }
//! ```

use crate::{AicaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How output samples are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MixingMode {
    /// One full mix per time step, including effects returns
    #[default]
    PerSample,
    /// 32 samples per channel per update call, without effects returns
    Batched,
}

/// Sound unit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AicaConfig {
    /// Sample production strategy
    pub mixing: MixingMode,
    /// Drop the CD-audio input from the mix
    pub cdda_mute: bool,
    /// Step the effects processor and mix its returns
    pub effects_enabled: bool,
    /// Compute everything but emit no frames
    pub mute_output: bool,
    /// A zero decay level sends decay 1 back to attack instead of decay 2
    pub zero_sustain_restarts_attack: bool,
    /// Keep the DMA busy flag set until the completion interrupt fires
    pub dma_busy_until_complete: bool,
}

impl Default for AicaConfig {
    fn default() -> Self {
        AicaConfig {
            mixing: MixingMode::PerSample,
            cdda_mute: false,
            effects_enabled: false,
            mute_output: false,
            zero_sustain_restarts_attack: false,
            dma_busy_until_complete: true,
        }
    }
}

impl AicaConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AicaError::ConfigError(e.to_string()))
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AicaError::ConfigError(e.to_string()))
    }

    /// Batched mixing with otherwise default settings
    pub fn batched() -> Self {
        AicaConfig {
            mixing: MixingMode::Batched,
            ..Default::default()
        }
    }
}
