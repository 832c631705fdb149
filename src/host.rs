//! Host Collaborators
//!
//! Traits for everything outside the sound unit: the audio output, CD-audio
//! source, interrupt lines of both CPUs, system memory for DMA and the
//! effects processor. Each trait has a null implementation so an [`Aica`]
//! can run on its own.
//!
//! [`Aica`]: crate::Aica

use crate::Result;
use crate::ram::SoundRam;

/// Samples in one CD-audio sector (2352 bytes of 16-bit stereo)
pub const CDDA_SECTOR_SAMPLES: usize = 2352 / 2;

/// Number of effect buses fed by the voices
pub const EFFECT_BUSES: usize = 16;

/// Consumer of rendered audio
pub trait AudioSink {
    /// Receive interleaved stereo frames (`[l, r, l, r, ...]`)
    fn push_frames(&mut self, frames: &[i16]);
}

/// Source of CD-audio sectors
pub trait CddaSource {
    /// Fill `sector` with interleaved 16-bit stereo samples
    fn read_sector(&mut self, sector: &mut [i16; CDDA_SECTOR_SAMPLES]);
}

/// Interrupt lines towards both CPUs and the secondary CPU's reset line
pub trait InterruptLines {
    /// Deliver the secondary CPU interrupt state and priority level
    fn secondary_interrupt(&mut self, pending: bool, level: u32);

    /// Assert the primary CPU's sound interrupt
    fn primary_raise(&mut self);

    /// Deassert the primary CPU's sound interrupt
    fn primary_cancel(&mut self);

    /// Signal that a DMA block transfer completed
    fn dma_complete(&mut self) {}

    /// Run (`true`) or hold in reset (`false`) the secondary CPU
    fn set_secondary_running(&mut self, _running: bool) {}
}

/// Main system memory, the other end of DMA transfers
pub trait SystemMemory {
    /// Copy `out.len()` bytes starting at `addr` into `out`
    ///
    /// An error aborts the transfer that issued the read.
    fn read_block(&mut self, addr: u32, out: &mut [u8]) -> Result<()>;

    /// Copy `data` into memory starting at `addr`
    fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()>;
}

/// The effects (DSP) processor
///
/// Only its integration points are modeled: register writes into its image,
/// ring buffer geometry changes, and one step per sample that consumes the
/// effect bus inputs and leaves its outputs in the EFREG registers.
pub trait EffectsProcessor {
    /// A byte at `offset` inside the effects register image changed
    fn register_written(&mut self, _offset: usize, _dsp_regs: &[u8]) {}

    /// Ring buffer moved or resized
    fn ring_buffer_changed(&mut self, _base: u32, _length_mask: u32) {}

    /// Process one sample
    fn step(&mut self, inputs: &[i32; EFFECT_BUSES], dsp_regs: &mut [u8], ram: &mut SoundRam);
}

/// Audio sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn push_frames(&mut self, _frames: &[i16]) {}
}

/// Silent CD-audio source
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCdda;

impl CddaSource for SilentCdda {
    fn read_sector(&mut self, sector: &mut [i16; CDDA_SECTOR_SAMPLES]) {
        sector.fill(0);
    }
}

/// Interrupt lines connected to nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullInterruptLines;

impl InterruptLines for NullInterruptLines {
    fn secondary_interrupt(&mut self, _pending: bool, _level: u32) {}
    fn primary_raise(&mut self) {}
    fn primary_cancel(&mut self) {}
}

/// System memory that reads zeroes and drops writes
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSystemMemory;

impl SystemMemory for NullSystemMemory {
    fn read_block(&mut self, _addr: u32, out: &mut [u8]) -> Result<()> {
        out.fill(0);
        Ok(())
    }

    fn write_block(&mut self, _addr: u32, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// Flat system memory backed by a byte vector, addresses wrap
#[derive(Debug, Clone, Default)]
pub struct VecSystemMemory {
    /// Memory contents
    pub data: Vec<u8>,
}

impl VecSystemMemory {
    /// Zeroed memory of `size` bytes
    pub fn new(size: usize) -> Self {
        VecSystemMemory {
            data: vec![0; size.max(1)],
        }
    }
}

impl SystemMemory for VecSystemMemory {
    fn read_block(&mut self, addr: u32, out: &mut [u8]) -> Result<()> {
        let len = self.data.len();
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.data[(addr as usize + i) % len];
        }
        Ok(())
    }

    fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let len = self.data.len();
        for (i, &b) in data.iter().enumerate() {
            self.data[(addr as usize + i) % len] = b;
        }
        Ok(())
    }
}

/// Effects processor that produces silence
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEffects;

impl EffectsProcessor for NullEffects {
    fn step(&mut self, _inputs: &[i32; EFFECT_BUSES], _dsp_regs: &mut [u8], _ram: &mut SoundRam) {}
}

/// The set of collaborators an [`Aica`](crate::Aica) talks to
pub struct Host {
    /// Audio output
    pub audio: Box<dyn AudioSink + Send>,
    /// CD-audio input
    pub cdda: Box<dyn CddaSource + Send>,
    /// Interrupt and reset lines
    pub lines: Box<dyn InterruptLines + Send>,
    /// DMA counterpart
    pub memory: Box<dyn SystemMemory + Send>,
    /// Effects processor
    pub effects: Box<dyn EffectsProcessor + Send>,
}

impl Host {
    /// Host with null collaborators everywhere
    pub fn new() -> Self {
        Host {
            audio: Box::new(NullAudioSink),
            cdda: Box::new(SilentCdda),
            lines: Box::new(NullInterruptLines),
            memory: Box::new(NullSystemMemory),
            effects: Box::new(NullEffects),
        }
    }

    /// Replace the audio sink
    pub fn with_audio(mut self, audio: impl AudioSink + Send + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    /// Replace the CD-audio source
    pub fn with_cdda(mut self, cdda: impl CddaSource + Send + 'static) -> Self {
        self.cdda = Box::new(cdda);
        self
    }

    /// Replace the interrupt lines
    pub fn with_lines(mut self, lines: impl InterruptLines + Send + 'static) -> Self {
        self.lines = Box::new(lines);
        self
    }

    /// Replace system memory
    pub fn with_memory(mut self, memory: impl SystemMemory + Send + 'static) -> Self {
        self.memory = Box::new(memory);
        self
    }

    /// Replace the effects processor
    pub fn with_effects(mut self, effects: impl EffectsProcessor + Send + 'static) -> Self {
        self.effects = Box::new(effects);
        self
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_memory_wraps() {
        let mut mem = VecSystemMemory::new(8);
        mem.write_block(6, &[1, 2, 3, 4]).unwrap();
        let mut out = [0u8; 4];
        mem.read_block(6, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(mem.data[0], 3);
    }

    #[test]
    fn test_null_collaborators() {
        let mut sector = [7i16; CDDA_SECTOR_SAMPLES];
        SilentCdda.read_sector(&mut sector);
        assert!(sector.iter().all(|&s| s == 0));

        let mut out = [9u8; 3];
        NullSystemMemory.read_block(0, &mut out).unwrap();
        assert_eq!(out, [0; 3]);
    }
}
