//! Sample Formats and Decoders
//!
//! Source formats a voice can play, the Yamaha 4-bit ADPCM codec and the
//! noise generator used when a channel's source select points at noise.

use num_derive::FromPrimitive;

/// Sample source format
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum SampleFormat {
    /// Signed 16-bit little-endian PCM
    Pcm16 = 0,
    /// Signed 8-bit PCM
    Pcm8 = 1,
    /// 4-bit ADPCM, decoder reset on every loop
    Adpcm = 2,
    /// 4-bit ADPCM "long stream", decoder state carries across loops
    AdpcmStream = 3,
    /// Pseudo-random noise (source select)
    Noise = 4,
}

impl SampleFormat {
    /// Whether decoding happens on every cursor advance, not only the last
    pub fn is_adpcm(&self) -> bool {
        matches!(self, SampleFormat::Adpcm | SampleFormat::AdpcmStream)
    }
}

/// Minimum ADPCM quantization step
pub const ADPCM_QUANT_MIN: i32 = 0x7F;
/// Maximum ADPCM quantization step
pub const ADPCM_QUANT_MAX: i32 = 0x6000;

/// Quantization step multipliers (8.8 fixed point), indexed by magnitude
const ADPCM_QUANT_SCALE: [i32; 8] = [0xE6, 0xE6, 0xE6, 0xE6, 0x133, 0x199, 0x200, 0x266];
/// Delta multipliers, indexed by magnitude
const ADPCM_DELTA_SCALE: [i32; 8] = [1, 3, 5, 7, 9, 11, 13, 15];

/// Decode one ADPCM nibble against the previous sample
///
/// `quant` is the running quantization step and is updated in place.
#[inline]
pub fn decode_adpcm(nibble: u8, prev: i32, quant: &mut i32) -> i32 {
    let sign = 1 - 2 * ((nibble >> 3) & 1) as i32;
    let magnitude = (nibble & 7) as usize;
    let delta = (*quant * ADPCM_DELTA_SCALE[magnitude]) >> 3;
    let sample = prev + sign * delta;

    *quant = ((*quant * ADPCM_QUANT_SCALE[magnitude]) >> 8).clamp(ADPCM_QUANT_MIN, ADPCM_QUANT_MAX);

    sample.clamp(i16::MIN as i32, i16::MAX as i32)
}

/// Running ADPCM decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdpcmState {
    /// Current quantization step
    pub quant: i32,
}

impl AdpcmState {
    /// Fresh decoder state
    pub fn new() -> Self {
        AdpcmState {
            quant: ADPCM_QUANT_MIN,
        }
    }

    /// Back to the initial step
    pub fn reset(&mut self) {
        self.quant = ADPCM_QUANT_MIN;
    }
}

impl Default for AdpcmState {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode 16-bit samples as packed ADPCM, low nibble first
///
/// Each nibble is chosen to minimize the error of the decoder's
/// reconstruction, so decoding the output tracks the input as closely as
/// the step size allows.
pub fn encode_adpcm(samples: &[i16]) -> Vec<u8> {
    let mut out = vec![0u8; samples.len().div_ceil(2)];
    let mut prev = 0i32;
    let mut quant = ADPCM_QUANT_MIN;

    for (i, &target) in samples.iter().enumerate() {
        let target = target as i32;
        let mut best = (0u8, i64::MAX, prev, quant);
        for nibble in 0..16u8 {
            let mut q = quant;
            let decoded = decode_adpcm(nibble, prev, &mut q);
            let err = (decoded - target).unsigned_abs() as i64;
            if err < best.1 {
                best = (nibble, err, decoded, q);
            }
        }
        let (nibble, _, decoded, q) = best;
        out[i >> 1] |= nibble << ((i & 1) * 4);
        prev = decoded;
        quant = q;
    }

    out
}

/// Decode packed ADPCM produced by [`encode_adpcm`] or the hardware
pub fn decode_adpcm_block(data: &[u8], count: usize) -> Vec<i16> {
    let mut prev = 0i32;
    let mut quant = ADPCM_QUANT_MIN;
    (0..count)
        .map(|i| {
            let nibble = (data[i >> 1] >> ((i & 1) * 4)) & 0xF;
            prev = decode_adpcm(nibble, prev, &mut quant);
            prev as i16
        })
        .collect()
}

/// Linear-congruential noise source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoiseGenerator {
    state: u32,
}

impl NoiseGenerator {
    const MUL: u32 = 16807;
    const ADD: u32 = 0xBEEF;

    /// Advance once and return `(current, next)` samples
    ///
    /// The look-ahead sample is computed without advancing the state.
    pub fn next_pair(&mut self) -> (i32, i32) {
        self.state = self.state.wrapping_mul(Self::MUL).wrapping_add(Self::ADD);
        let current = (self.state as i32) >> 16;
        let ahead = self.state.wrapping_mul(Self::MUL).wrapping_add(Self::ADD);
        (current, (ahead as i32) >> 16)
    }
}
