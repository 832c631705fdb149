//! Voice Channel
//!
//! One of the 64 playback units. The channel caches everything it derives
//! from its register block (start address, loop points, pitch increment,
//! envelope rates, attenuations, stream mode) and refreshes only the parts a
//! register write touches.
//!
//! Per sample the channel:
//! - interpolates between the two held samples at the fractional cursor
//! - applies envelope + LFO attenuation and the three send paths
//! - advances envelopes, the stream cursor and the LFO

use super::envelope::{
    AmplitudeEnvelope, EnvelopeEvent, EnvelopeRates, EnvelopeState, FilterEnvelope,
};
use super::lfo::{Lfo, LfoParams};
use super::sample::{decode_adpcm, AdpcmState, NoiseGenerator, SampleFormat};
use crate::ram::SoundRam;
use crate::registers::channel as reg;
use crate::tables::{fp_mul, tables, ENVELOPE_MAX, SEND_LEVEL};
use num_traits::FromPrimitive;

/// Fractional bits of the pitch accumulator
pub const PITCH_FRAC_BITS: u32 = 10;
const PITCH_FRAC_MASK: u32 = (1 << PITCH_FRAC_BITS) - 1;

/// Playback mode selected by format, loop enable and loop start link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamMode {
    /// Source format
    pub format: SampleFormat,
    /// Wrap to the loop start at the loop end instead of stopping
    pub looping: bool,
    /// Leave attack only once the cursor passes the loop start
    pub loop_link: bool,
}

impl StreamMode {
    /// Decode the mode from a channel register block
    pub fn from_registers(regs: &[u8]) -> Self {
        let format = if reg::SSCTL.is_set(regs) {
            SampleFormat::Noise
        } else {
            SampleFormat::from_u32(reg::PCMS.read(regs)).unwrap_or(SampleFormat::Pcm16)
        };
        StreamMode {
            format,
            looping: reg::LPCTL.is_set(regs),
            loop_link: reg::LPSLNK.is_set(regs),
        }
    }
}

impl Default for StreamMode {
    fn default() -> Self {
        StreamMode {
            format: SampleFormat::Pcm16,
            looping: false,
            loop_link: false,
        }
    }
}

/// One sample of channel output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelOutput {
    /// Dry left
    pub left: i32,
    /// Dry right
    pub right: i32,
    /// Effect send
    pub effect: i32,
    /// Effect bus the send goes to
    pub bus: usize,
}

/// Cached send attenuations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attenuation {
    /// Dry left attenuation index
    pub left: u32,
    /// Dry right attenuation index
    pub right: u32,
    /// Effect send attenuation index
    pub effect: u32,
}

/// Voice channel state
#[derive(Debug, Clone)]
pub struct Channel {
    index: usize,
    enabled: bool,
    mode: StreamMode,

    start: u32,
    cursor: u32,
    fraction: u32,
    increment: u32,
    loop_start: u32,
    loop_end: u32,
    looped: bool,

    s0: i32,
    s1: i32,
    adpcm: AdpcmState,
    noise: NoiseGenerator,

    aeg: AmplitudeEnvelope,
    feg: FilterEnvelope,
    lfo: Lfo,

    attenuation: Attenuation,
    bus: usize,
}

impl Channel {
    /// Disabled channel bound to slot `index`
    pub fn new(index: usize) -> Self {
        Channel {
            index,
            enabled: false,
            mode: StreamMode::default(),
            start: 0,
            cursor: 0,
            fraction: 0,
            increment: 1 << PITCH_FRAC_BITS,
            loop_start: 0,
            loop_end: 0,
            looped: false,
            s0: 0,
            s1: 0,
            adpcm: AdpcmState::new(),
            noise: NoiseGenerator::default(),
            aeg: AmplitudeEnvelope::new(),
            feg: FilterEnvelope::new(),
            lfo: Lfo::new(),
            attenuation: Attenuation::default(),
            bus: 0,
        }
    }

    /// Rebuild every cached field from the register block, then disable
    pub fn init(&mut self, regs: &mut [u8]) {
        *self = Channel::new(self.index);
        for offset in 0..regs.len() {
            self.register_written(regs, offset);
        }
        self.disable(regs);
    }

    /// Slot index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the channel contributes to the mix
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current stream mode
    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    /// Start address in sound RAM
    pub fn start_address(&self) -> u32 {
        self.start
    }

    /// Current sample cursor (CA)
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Pitch increment per output sample (10 fractional bits)
    pub fn increment(&self) -> u32 {
        self.increment
    }

    /// Loop start and end, in samples
    pub fn loop_points(&self) -> (u32, u32) {
        (self.loop_start, self.loop_end)
    }

    /// Loop-passed flag (LP)
    pub fn looped(&self) -> bool {
        self.looped
    }

    /// Clear the loop-passed flag
    pub fn clear_looped(&mut self) {
        self.looped = false;
    }

    /// Amplitude envelope
    pub fn envelope(&self) -> &AmplitudeEnvelope {
        &self.aeg
    }

    /// Filter envelope
    pub fn filter_envelope(&self) -> &FilterEnvelope {
        &self.feg
    }

    /// LFO
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    /// Cached send attenuations
    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    /// Effect bus selected by ISEL
    pub fn effect_bus(&self) -> usize {
        self.bus
    }

    /// Held decoded sample pair
    pub fn samples(&self) -> (i32, i32) {
        (self.s0, self.s1)
    }

    /// Force the amplitude envelope (diagnostics and tests)
    pub fn set_envelope(&mut self, regs: &mut [u8], state: EnvelopeState, level: u32) {
        self.set_envelope_state(regs, state);
        self.aeg.set_level(level);
    }

    /// Start the voice if it is released
    ///
    /// Re-arms the cursor, envelopes and decoder and pre-fetches the first
    /// sample pair. A channel that is still sounding is left alone.
    pub fn key_on(&mut self, ram: &SoundRam) {
        if self.aeg.state() != EnvelopeState::Release {
            return;
        }
        log::trace!("channel {} key on", self.index);

        self.enabled = true;
        self.aeg.set_state(EnvelopeState::Attack);
        self.aeg.set_level(ENVELOPE_MAX);
        self.feg.set_state(EnvelopeState::Attack);

        self.cursor = 0;
        self.fraction = 0;
        self.looped = false;
        self.reset_adpcm();

        self.decode(ram, 0, true);
    }

    /// Release the voice
    pub fn key_off(&mut self, regs: &mut [u8]) {
        if self.aeg.state() != EnvelopeState::Release {
            log::trace!("channel {} key off", self.index);
            self.set_envelope_state(regs, EnvelopeState::Release);
        }
    }

    /// Stop the voice immediately
    pub fn disable(&mut self, regs: &mut [u8]) {
        self.enabled = false;
        self.set_envelope_state(regs, EnvelopeState::Release);
        self.aeg.set_level(ENVELOPE_MAX);
    }

    /// Refresh the cached state depending on register byte `offset`
    ///
    /// Key execution (KYONEX) spans all channels and is handled by the
    /// voice engine.
    pub fn register_written(&mut self, regs: &mut [u8], offset: usize) {
        match offset {
            0x00 | 0x01 => {
                self.update_stream_mode(regs);
                self.update_start(regs);
            }
            0x04 | 0x05 => self.update_start(regs),
            0x08 | 0x09 | 0x0C | 0x0D => self.update_loop(regs),
            0x10 | 0x11 => self.update_envelope(regs),
            0x14 | 0x15 => {
                self.update_stream_mode(regs);
                self.update_envelope(regs);
            }
            0x18 | 0x19 => {
                self.update_pitch(regs);
                self.update_envelope(regs);
            }
            0x1C | 0x1D => self.update_lfo(regs),
            0x20 => {
                self.bus = reg::ISEL.read(regs) as usize;
                self.update_attenuation(regs);
            }
            0x24 | 0x25 | 0x29 => self.update_attenuation(regs),
            0x28 | 0x2C | 0x2D | 0x30 | 0x31 | 0x34 | 0x35 | 0x38 | 0x39 | 0x3C | 0x3D | 0x40
            | 0x41 | 0x44 | 0x45 => self.update_filter(regs),
            _ => {}
        }
    }

    /// Produce one sample and advance, or `None` while disabled
    ///
    /// The returned output belongs to the sample computed before the channel
    /// advanced, so the step that ends a voice still yields its last sample.
    pub fn step(
        &mut self,
        regs: &mut [u8],
        ram: &SoundRam,
        zero_level_restarts: bool,
    ) -> Option<ChannelOutput> {
        if !self.enabled {
            return None;
        }

        let sample = self.interpolate();
        let t = tables();
        let offset = self.lfo.amplitude() + (self.aeg.level() >> 2);
        let output = ChannelOutput {
            left: fp_mul(sample, t.gain(offset + self.attenuation.left), 15),
            right: fp_mul(sample, t.gain(offset + self.attenuation.right), 15),
            effect: fp_mul(sample, t.gain(offset + self.attenuation.effect), 15),
            bus: self.bus,
        };

        match self.aeg.step(self.mode.loop_link, zero_level_restarts) {
            EnvelopeEvent::Enter(EnvelopeState::Release) => {
                self.set_envelope_state(regs, EnvelopeState::Release)
            }
            EnvelopeEvent::Finished => self.disable(regs),
            _ => {}
        }
        self.feg.step();
        self.step_stream(regs, ram);
        self.lfo.step();

        Some(output)
    }

    #[inline]
    fn interpolate(&self) -> i32 {
        let fp = self.fraction as i32;
        fp_mul(self.s0, 1024 - fp, PITCH_FRAC_BITS) + fp_mul(self.s1, fp, PITCH_FRAC_BITS)
    }

    fn set_envelope_state(&mut self, regs: &mut [u8], state: EnvelopeState) {
        self.aeg.set_state(state);
        if state == EnvelopeState::Release {
            reg::KYONB.write(regs, 0);
        }
    }

    fn reset_adpcm(&mut self) {
        self.adpcm.reset();
        self.s0 = 0;
    }

    fn step_stream(&mut self, regs: &mut [u8], ram: &SoundRam) {
        let total = self.fraction + self.increment;
        let mut whole = total >> PITCH_FRAC_BITS;
        self.fraction = total & PITCH_FRAC_MASK;

        while whole > 0 {
            whole -= 1;

            let mut cursor = self.cursor + 1;
            let mut end_check = cursor;
            if self.mode.format == SampleFormat::AdpcmStream {
                end_check &= !3;
            }

            if self.mode.loop_link
                && self.aeg.state() == EnvelopeState::Attack
                && cursor >= self.loop_start
            {
                self.set_envelope_state(regs, EnvelopeState::Decay1);
            }

            if end_check >= self.loop_end {
                self.looped = true;
                cursor = self.loop_start;
                if self.mode.looping {
                    if self.mode.format == SampleFormat::Adpcm {
                        self.reset_adpcm();
                    }
                } else {
                    self.disable(regs);
                }
            }

            self.cursor = cursor;
            self.decode(ram, cursor, whole == 0);
        }
    }

    /// Fetch the sample pair at `cursor`
    ///
    /// Only ADPCM decodes on intermediate advances, to keep its predictor in
    /// sync; other formats fetch once the cursor settles.
    fn decode(&mut self, ram: &SoundRam, cursor: u32, last: bool) {
        let format = self.mode.format;
        if !last && !format.is_adpcm() {
            return;
        }

        let start = self.start as usize;
        let cursor_usize = cursor as usize;
        let (s0, s1) = match format {
            SampleFormat::Noise => self.noise.next_pair(),
            SampleFormat::Pcm16 => {
                let addr = start + cursor_usize * 2;
                (ram.read_i16(addr) as i32, ram.read_i16(addr + 2) as i32)
            }
            SampleFormat::Pcm8 => {
                let addr = start + cursor_usize;
                (
                    (ram.read8(addr) as i8 as i32) << 8,
                    (ram.read8(addr + 1) as i8 as i32) << 8,
                )
            }
            SampleFormat::Adpcm | SampleFormat::AdpcmStream => {
                let shift = (cursor & 1) * 4;
                let first = (ram.read8(start + (cursor_usize >> 1)) >> shift) & 0xF;
                let second = (ram.read8(start + ((cursor_usize + 1) >> 1)) >> (4 - shift)) & 0xF;

                let mut quant = self.adpcm.quant;
                let s0 = decode_adpcm(first, self.s0, &mut quant);
                self.adpcm.quant = quant;
                let s1 = if last {
                    decode_adpcm(second, s0, &mut quant)
                } else {
                    0
                };
                (s0, s1)
            }
        };

        self.s0 = s0;
        self.s1 = s1;
    }

    fn update_stream_mode(&mut self, regs: &[u8]) {
        self.mode = StreamMode::from_registers(regs);
    }

    fn update_start(&mut self, regs: &[u8]) {
        let mut addr = (reg::SA_HI.read(regs) << 16) | reg::SA_LOW.read(regs);
        if reg::PCMS.read(regs) == 0 {
            addr &= !1;
        }
        self.start = addr;
    }

    fn update_loop(&mut self, regs: &[u8]) {
        self.loop_start = reg::LSA.read(regs);
        self.loop_end = reg::LEA.read(regs);
    }

    fn update_envelope(&mut self, regs: &[u8]) {
        let t = tables();
        self.aeg.rates = EnvelopeRates {
            attack: t.attack_steps[effective_rate(regs, reg::AR.read(regs))],
            decay1: t.decay_steps[effective_rate(regs, reg::D1R.read(regs))],
            decay_level: reg::DL.read(regs) << 5,
            decay2: t.decay_steps[effective_rate(regs, reg::D2R.read(regs))],
            release: t.decay_steps[effective_rate(regs, reg::RR.read(regs))],
        };
    }

    fn update_pitch(&mut self, regs: &[u8]) {
        self.increment = pitch_increment(reg::OCT.read(regs), reg::FNS.read(regs));
    }

    fn update_lfo(&mut self, regs: &mut [u8]) {
        self.lfo.configure(LfoParams {
            frequency: reg::LFOF.read(regs),
            amp_wave: reg::ALFOWS.read(regs),
            amp_depth: reg::ALFOS.read(regs),
            pitch_wave: reg::PLFOWS.read(regs),
            pitch_depth: reg::PLFOS.read(regs),
            reset: reg::LFORE.is_set(regs),
        });
        reg::LFORE.write(regs, 0);
    }

    fn update_attenuation(&mut self, regs: &[u8]) {
        let tl = reg::TL.read(regs);
        let pan = reg::DIPAN.read(regs);
        let full = tl + SEND_LEVEL[reg::DISDL.read(regs) as usize];
        let panned = full + SEND_LEVEL[(!pan & 0xF) as usize];

        let (left, right) = if pan & 0x10 != 0 {
            (full, panned)
        } else {
            (panned, full)
        };
        self.attenuation = Attenuation {
            left,
            right,
            effect: tl + SEND_LEVEL[reg::IMXL.read(regs) as usize],
        };
    }

    fn update_filter(&mut self, regs: &[u8]) {
        let params = &mut self.feg.params;
        params.q = reg::Q.read(regs);
        for (level, field) in params.levels.iter_mut().zip(reg::FLV.iter()) {
            *level = field.read(regs);
        }
        params.attack = reg::FAR.read(regs);
        params.decay1 = reg::FD1R.read(regs);
        params.decay2 = reg::FD2R.read(regs);
        params.release = reg::FRR.read(regs);
    }
}

/// Envelope rate after key rate scaling, as a table index
pub fn effective_rate(regs: &[u8], rate: u32) -> usize {
    let krs = reg::KRS.read(regs) as i32;
    let oct = reg::OCT.read(regs) as i32;
    let mut rv = krs + (reg::FNS.read(regs) >> 9) as i32 + rate as i32 * 2;
    if krs == 0xF {
        rv -= 0xF;
    }
    if oct & 8 != 0 {
        rv -= (16 - oct) * 2;
    } else {
        rv += oct * 2;
    }
    rv.clamp(0, 0x3F) as usize
}

/// Cursor advance per output sample for an octave/fine-pitch pair
///
/// `oct` is a signed 4-bit value; negative octaves shift right.
pub fn pitch_increment(oct: u32, fns: u32) -> u32 {
    let base = 1024 | (fns & 0x3FF);
    if oct & 8 != 0 {
        base >> (16 - (oct & 0xF))
    } else {
        base << (oct & 7)
    }
}
