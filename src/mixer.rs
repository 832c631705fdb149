//! Output Mixer
//!
//! Sums voice outputs, CD-audio and effect returns into one stereo frame,
//! then applies the master stage and queues frames for the audio sink.
//!
//! Features:
//! - volume/pan through the 16-step logarithmic curve
//! - mono fold, master volume, 18-bit DAC shift, 16-bit saturation
//! - fixed 512-frame output batch flushed to the sink when full

use crate::host::{AudioSink, CddaSource, CDDA_SECTOR_SAMPLES};
use crate::registers::common::{DAC18B, MONO, MVOL};
use crate::registers::RegisterFile;
use crate::tables::{fp_mul, tables};
use crate::voice::ChannelOutput;

/// Frames per sink batch
pub const OUTPUT_BATCH_FRAMES: usize = 512;

/// Stereo accumulator for one output sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StereoMix {
    /// Left sum
    pub left: i32,
    /// Right sum
    pub right: i32,
}

impl StereoMix {
    /// Add a value through a 4-bit level and 5-bit pan
    ///
    /// Pan bit 4 selects which side is attenuated by the low four bits: set
    /// attenuates the right, clear the left.
    pub fn add_panned(&mut self, value: i32, level: u32, pan: u32) {
        let vol = &tables().volume;
        let scaled = fp_mul(value, vol[(level & 0xF) as usize], 15);
        let side = fp_mul(scaled, vol[(0xF - (pan & 0xF)) as usize], 15);
        if pan & 0x10 != 0 {
            self.left += scaled;
            self.right += side;
        } else {
            self.left += side;
            self.right += scaled;
        }
    }

    /// Add a voice's dry output
    ///
    /// A voice whose dry sum is exactly zero contributes its effect send to
    /// both sides instead.
    pub fn add_voice(&mut self, out: &ChannelOutput) {
        if out.left + out.right == 0 {
            self.left += out.effect;
            self.right += out.effect;
        } else {
            self.left += out.left;
            self.right += out.right;
        }
    }
}

/// Chip-wide output controls from the common block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MasterSettings {
    /// Master volume code (MVOL)
    pub volume: u32,
    /// Fold to mono
    pub mono: bool,
    /// 18-bit DAC: drop two more bits
    pub dac18: bool,
}

impl MasterSettings {
    /// Read the settings from the register file
    pub fn from_registers(regs: &RegisterFile) -> Self {
        MasterSettings {
            volume: regs.get(MVOL),
            mono: regs.get(MONO) != 0,
            dac18: regs.get(DAC18B) != 0,
        }
    }

    /// Apply mono fold, master volume and DAC shift, then saturate
    pub fn apply(&self, mix: StereoMix) -> [i16; 2] {
        let (mut left, mut right) = (mix.left as i64, mix.right as i64);
        if self.mono {
            left += right;
            right = left;
        }

        let volume = tables().volume[(self.volume & 0xF) as usize] as i64;
        left = (left * volume) >> 15;
        right = (right * volume) >> 15;

        if self.dac18 {
            left >>= 2;
            right >>= 2;
        }

        [clip16(left), clip16(right)]
    }
}

/// Saturate to signed 16 bits
#[inline]
pub fn clip16(v: i64) -> i16 {
    v.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

/// Fixed-size batch of interleaved frames on the way to the sink
#[derive(Debug, Clone)]
pub struct OutputRing {
    frames: Vec<i16>,
    capacity: usize,
    last: [i16; 2],
}

impl OutputRing {
    /// Ring holding `capacity` frames
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        OutputRing {
            frames: Vec::with_capacity(capacity * 2),
            capacity,
            last: [0; 2],
        }
    }

    /// Queue a frame, flushing to `sink` when the batch is full
    pub fn push(&mut self, frame: [i16; 2], sink: &mut dyn AudioSink) {
        self.last = frame;
        self.frames.extend_from_slice(&frame);
        if self.frames.len() >= self.capacity * 2 {
            self.flush(sink);
        }
    }

    /// Hand queued frames to `sink`
    pub fn flush(&mut self, sink: &mut dyn AudioSink) {
        if !self.frames.is_empty() {
            sink.push_frames(&self.frames);
            self.frames.clear();
        }
    }

    /// Frames waiting for the next flush
    pub fn pending(&self) -> usize {
        self.frames.len() / 2
    }

    /// Most recent frame
    pub fn last_frame(&self) -> [i16; 2] {
        self.last
    }

    /// Drop queued frames
    pub fn clear(&mut self) {
        self.frames.clear();
        self.last = [0; 2];
    }
}

impl Default for OutputRing {
    fn default() -> Self {
        Self::new(OUTPUT_BATCH_FRAMES)
    }
}

/// CD-audio sector buffer
#[derive(Debug, Clone)]
pub struct CddaInput {
    sector: Box<[i16; CDDA_SECTOR_SAMPLES]>,
    index: usize,
}

impl CddaInput {
    /// Empty buffer; the first read fetches a sector
    pub fn new() -> Self {
        CddaInput {
            sector: Box::new([0; CDDA_SECTOR_SAMPLES]),
            index: CDDA_SECTOR_SAMPLES,
        }
    }

    /// Next interleaved left/right pair, refilling from `source` as needed
    pub fn next_frame(&mut self, source: &mut dyn CddaSource) -> (i32, i32) {
        if self.index >= CDDA_SECTOR_SAMPLES {
            source.read_sector(&mut self.sector);
            self.index = 0;
        }
        let pair = (
            self.sector[self.index] as i32,
            self.sector[self.index + 1] as i32,
        );
        self.index += 2;
        pair
    }

    /// Discard buffered samples
    pub fn reset(&mut self) {
        self.index = CDDA_SECTOR_SAMPLES;
    }
}

impl Default for CddaInput {
    fn default() -> Self {
        Self::new()
    }
}
