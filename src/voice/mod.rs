//! Voice Engine
//!
//! Owns the 64 channels and routes channel register writes to them. Key
//! execution (KYONEX) is applied here because it acts on every channel at
//! once.

pub mod channel;
pub mod envelope;
pub mod lfo;
pub mod sample;

pub use channel::{Attenuation, Channel, ChannelOutput, StreamMode};
pub use envelope::{AmplitudeEnvelope, EnvelopeState, FilterEnvelope};
pub use lfo::{Lfo, LfoWaveform};
pub use sample::{decode_adpcm, encode_adpcm, SampleFormat};

use crate::ram::SoundRam;
use crate::registers::{channel as reg, RegisterFile, CHANNEL_COUNT, CHANNEL_STRIDE};

/// The 64 voices
#[derive(Debug, Clone)]
pub struct VoiceEngine {
    channels: Vec<Channel>,
}

impl VoiceEngine {
    /// Create disabled channels
    pub fn new() -> Self {
        VoiceEngine {
            channels: (0..CHANNEL_COUNT).map(Channel::new).collect(),
        }
    }

    /// Rebuild all channels from the register file
    pub fn init(&mut self, regs: &mut RegisterFile) {
        for (i, ch) in self.channels.iter_mut().enumerate() {
            ch.init(regs.channel_mut(i));
        }
    }

    /// Channel `index`
    pub fn channel(&self, index: usize) -> &Channel {
        &self.channels[index]
    }

    /// Mutable channel `index`
    pub fn channel_mut(&mut self, index: usize) -> &mut Channel {
        &mut self.channels[index]
    }

    /// All channels
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Number of enabled channels
    pub fn active_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_enabled()).count()
    }

    /// Handle a byte written at `addr` inside the channel area
    pub fn register_written(&mut self, regs: &mut RegisterFile, ram: &SoundRam, addr: usize) {
        let index = addr / CHANNEL_STRIDE;
        let offset = addr % CHANNEL_STRIDE;
        self.channels[index].register_written(regs.channel_mut(index), offset);

        if offset == 0x01 && reg::KYONEX.is_set(regs.channel(index)) {
            reg::KYONEX.write(regs.channel_mut(index), 0);
            self.execute_keys(regs, ram);
        }
    }

    /// Apply KYONB of every channel: key on where set, key off elsewhere
    pub fn execute_keys(&mut self, regs: &mut RegisterFile, ram: &SoundRam) {
        log::debug!("key execute");
        for (i, ch) in self.channels.iter_mut().enumerate() {
            if reg::KYONB.is_set(regs.channel(i)) {
                ch.key_on(ram);
            } else {
                ch.key_off(regs.channel_mut(i));
            }
        }
    }

    /// Step channel `index` by one sample
    #[inline]
    pub fn step_channel(
        &mut self,
        index: usize,
        regs: &mut RegisterFile,
        ram: &SoundRam,
        zero_level_restarts: bool,
    ) -> Option<ChannelOutput> {
        self.channels[index].step(regs.channel_mut(index), ram, zero_level_restarts)
    }
}

impl Default for VoiceEngine {
    fn default() -> Self {
        Self::new()
    }
}
