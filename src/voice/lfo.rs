//! Low Frequency Oscillator
//!
//! A free-running 8-bit phase advanced once per period. The period comes from
//! the 5-bit LFOF code: the top three bits pick a power-of-two group and the
//! low two bits a position inside it. Amplitude and pitch outputs each have
//! their own waveform and depth.

/// LFO waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Rising ramp
    Sawtooth = 0,
    /// Two-level square
    Square = 1,
    /// Up/down ramp
    Triangle = 2,
    /// XOR-shuffled phase
    Noise = 3,
}

impl LfoWaveform {
    fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => LfoWaveform::Sawtooth,
            1 => LfoWaveform::Square,
            2 => LfoWaveform::Triangle,
            _ => LfoWaveform::Noise,
        }
    }
}

/// LFO register parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LfoParams {
    /// Frequency code (LFOF)
    pub frequency: u32,
    /// Amplitude waveform (ALFOWS)
    pub amp_wave: u32,
    /// Amplitude depth (ALFOS)
    pub amp_depth: u32,
    /// Pitch waveform (PLFOWS)
    pub pitch_wave: u32,
    /// Pitch depth (PLFOS)
    pub pitch_depth: u32,
    /// Re-synchronize phase (LFORE)
    pub reset: bool,
}

/// Samples per LFO phase step for a frequency code
pub fn lfo_period(code: u32) -> u32 {
    let n = code & 0x1F;
    let s = n >> 2;
    let m = !n & 3;
    let g = 128 >> s;
    let l = (g - 1) << 2;
    l + g * (m + 1)
}

/// Low frequency oscillator
#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    counter: u32,
    period: u32,
    phase: u8,
    amp_wave: LfoWaveform,
    amp_shift: u32,
    pitch_wave: LfoWaveform,
    pitch_shift: u32,
    amp: u32,
    pitch: u32,
}

impl Lfo {
    /// Oscillator at the slowest rate with no modulation
    pub fn new() -> Self {
        let period = lfo_period(0);
        Lfo {
            counter: period,
            period,
            phase: 0,
            amp_wave: LfoWaveform::Sawtooth,
            amp_shift: 8,
            pitch_wave: LfoWaveform::Sawtooth,
            pitch_shift: 8,
            amp: 0,
            pitch: 0,
        }
    }

    /// Apply register parameters
    ///
    /// Setting the frequency restarts the countdown; `reset` also returns the
    /// phase to zero.
    pub fn configure(&mut self, params: LfoParams) {
        self.period = lfo_period(params.frequency);
        self.counter = self.period;
        self.amp_shift = 8 - (params.amp_depth & 7);
        self.pitch_shift = 8 - (params.pitch_depth & 7);
        self.amp_wave = LfoWaveform::from_bits(params.amp_wave);
        self.pitch_wave = LfoWaveform::from_bits(params.pitch_wave);

        if params.reset {
            self.phase = 0;
        }
        self.recompute();
    }

    /// Advance one sample
    #[inline]
    pub fn step(&mut self) {
        self.counter = self.counter.saturating_sub(1);
        if self.counter == 0 {
            self.phase = self.phase.wrapping_add(1);
            self.counter = self.period;
            self.recompute();
        }
    }

    /// Amplitude modulation, added to the attenuation index
    #[inline]
    pub fn amplitude(&self) -> u32 {
        self.amp
    }

    /// Pitch modulation output
    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    /// Current phase
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Samples per phase step
    pub fn period(&self) -> u32 {
        self.period
    }

    fn recompute(&mut self) {
        let p = self.phase as u32;
        let triangle = ((p & 0x7F) ^ if p & 0x80 != 0 { 0x7F } else { 0 }) << 1;
        let noise = (p >> 3) ^ (p << 3) ^ (p & 0xE3);

        let amp = match self.amp_wave {
            LfoWaveform::Sawtooth => p,
            LfoWaveform::Square => {
                if p & 0x80 != 0 {
                    255
                } else {
                    0
                }
            }
            LfoWaveform::Triangle => triangle,
            LfoWaveform::Noise => noise,
        };
        self.amp = (amp >> self.amp_shift) & 0xFF;

        let pitch = match self.pitch_wave {
            LfoWaveform::Sawtooth => p,
            LfoWaveform::Square => {
                if p & 0x80 != 0 {
                    0x80
                } else {
                    0x7F
                }
            }
            LfoWaveform::Triangle => (triangle.wrapping_sub(0x80)) & 0xFF,
            LfoWaveform::Noise => noise,
        };
        self.pitch = (pitch >> self.pitch_shift) & 0xFF;
    }
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}
