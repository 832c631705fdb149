//! Lookup Tables
//!
//! Logarithmic volume/attenuation curves and envelope step rates, built once
//! and shared by every AICA instance.
//!
//! - `volume`: 16-step master/effect volume curve, 3 dB per step, 0 mutes
//! - `attenuation`: 0.375 dB steps over 256 entries, anything past mutes
//! - `attack_steps`/`decay_steps`: envelope steps per sample for the 64
//!   effective rates, measured against a 44.1 kHz reference

use std::sync::OnceLock;

/// Fractional bits of the envelope accumulator
pub const ENVELOPE_STEP_BITS: u32 = 16;
/// Envelope maximum attenuation (silent)
pub const ENVELOPE_MAX: u32 = 0x3FF;

/// Attenuation added by each send level code; code 0 mutes
pub const SEND_LEVEL: [u32; 16] = [
    255,
    14 << 3,
    13 << 3,
    12 << 3,
    11 << 3,
    10 << 3,
    9 << 3,
    8 << 3,
    7 << 3,
    6 << 3,
    5 << 3,
    4 << 3,
    3 << 3,
    2 << 3,
    1 << 3,
    0,
];

/// Attack duration in milliseconds for each effective rate (negative = never)
pub const ATTACK_TIME_MS: [f64; 64] = [
    -1.0, -1.0, 8100.0, 6900.0, 6000.0, 4800.0, 4000.0, 3400.0, 3000.0, 2400.0, 2000.0, 1700.0,
    1500.0, 1200.0, 1000.0, 860.0, 760.0, 600.0, 500.0, 430.0, 380.0, 300.0, 250.0, 220.0, 190.0,
    150.0, 130.0, 110.0, 95.0, 76.0, 63.0, 55.0, 47.0, 38.0, 31.0, 27.0, 24.0, 19.0, 15.0, 13.0,
    12.0, 9.4, 7.9, 6.8, 6.0, 4.7, 3.8, 3.4, 3.0, 2.4, 2.0, 1.8, 1.6, 1.3, 1.1, 0.93, 0.85, 0.65,
    0.53, 0.44, 0.40, 0.35, 0.0, 0.0,
];

/// Decay/sustain/release duration in milliseconds for each effective rate
pub const DECAY_TIME_MS: [f64; 64] = [
    -1.0, -1.0, 118200.0, 101300.0, 88600.0, 70900.0, 59100.0, 50700.0, 44300.0, 35500.0,
    29600.0, 25300.0, 22200.0, 17700.0, 14800.0, 12700.0, 11100.0, 8900.0, 7400.0, 6300.0,
    5500.0, 4400.0, 3700.0, 3200.0, 2800.0, 2200.0, 1800.0, 1600.0, 1400.0, 1100.0, 920.0, 790.0,
    690.0, 550.0, 460.0, 390.0, 340.0, 270.0, 230.0, 200.0, 170.0, 140.0, 110.0, 98.0, 85.0, 68.0,
    57.0, 49.0, 43.0, 34.0, 28.0, 25.0, 22.0, 18.0, 14.0, 12.0, 11.0, 8.5, 7.1, 6.1, 5.4, 4.3,
    3.6, 3.1,
];

/// Precomputed tables
#[derive(Debug, Clone)]
pub struct Tables {
    /// Master/effect volume in 1.15 fixed point
    pub volume: [i32; 16],
    /// Attenuation gain in 1.15 fixed point
    pub attenuation: [i32; 256],
    /// Attack steps per sample
    pub attack_steps: [u32; 64],
    /// Decay/release steps per sample
    pub decay_steps: [u32; 64],
}

impl Tables {
    /// Compute every table
    pub fn new() -> Self {
        let mut volume = [0i32; 16];
        for (i, v) in volume.iter_mut().enumerate().skip(1) {
            *v = (32768.0 / 2f64.powf((15 - i) as f64 / 2.0)) as i32;
        }

        let mut attenuation = [0i32; 256];
        for (i, v) in attenuation.iter_mut().enumerate() {
            *v = (32768.0 / 2f64.powf(i as f64 / 16.0)) as i32;
        }

        let mut attack_steps = [0u32; 64];
        let mut decay_steps = [0u32; 64];
        for i in 0..64 {
            attack_steps[i] = envelope_steps(ATTACK_TIME_MS[i]);
            decay_steps[i] = envelope_steps(DECAY_TIME_MS[i]);
        }

        Tables {
            volume,
            attenuation,
            attack_steps,
            decay_steps,
        }
    }

    /// Attenuation gain for `index`; indices past the table mute
    #[inline]
    pub fn gain(&self, index: u32) -> i32 {
        self.attenuation.get(index as usize).copied().unwrap_or(0)
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared tables, computed on first use
pub fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(Tables::new)
}

/// Envelope steps per sample for a full-range sweep lasting `ms` milliseconds
pub fn envelope_steps(ms: f64) -> u32 {
    let all_steps = ((ENVELOPE_MAX + 1) << ENVELOPE_STEP_BITS) as f64 - 1.0;
    if ms < 0.0 {
        return 0;
    }
    if ms == 0.0 {
        return all_steps as u32;
    }
    let samples = 44.1 * ms;
    (all_steps / samples + 0.5) as u32
}

/// `(a * b) >> bits` in 64-bit, truncated back to 32 bits
#[inline]
pub fn fp_mul(a: i32, b: i32, bits: u32) -> i32 {
    ((a as i64 * b as i64) >> bits) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_volume_curve() {
        let t = tables();
        assert_eq!(t.volume[0], 0);
        assert_eq!(t.volume[1], 256);
        assert_eq!(t.volume[2], 362);
        assert_eq!(t.volume[13], 16384);
        assert_eq!(t.volume[15], 32768);
        for pair in t.volume.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_attenuation_curve() {
        let t = tables();
        assert_eq!(t.attenuation[0], 32768);
        assert_eq!(t.attenuation[16], 16384);
        assert_eq!(t.attenuation[255], 0);
        assert_eq!(t.gain(256), 0);
        assert_eq!(t.gain(1000), 0);
        // 6 dB per 16 steps
        let ratio = t.attenuation[32] as f64 / t.attenuation[48] as f64;
        assert_relative_eq!(ratio, 2.0, epsilon = 0.01);
    }

    #[test]
    fn test_envelope_steps() {
        assert_eq!(envelope_steps(-1.0), 0);
        assert_eq!(envelope_steps(0.0), 1024 * 65536 - 1);
        assert_eq!(envelope_steps(8100.0), 188);
        assert_eq!(envelope_steps(0.35), 4347837);
        let t = tables();
        assert_eq!(t.attack_steps[0], 0);
        assert_eq!(t.attack_steps[2], 188);
        assert_eq!(t.attack_steps[63], 1024 * 65536 - 1);
        assert_eq!(t.decay_steps[1], 0);
    }

    #[test]
    fn test_fp_mul() {
        assert_eq!(fp_mul(1000, 32768, 15), 1000);
        assert_eq!(fp_mul(-1000, 16384, 15), -500);
        assert_eq!(fp_mul(-1, 1, 15), -1);
    }
}
