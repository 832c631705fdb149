//! Per-channel register fields
//!
//! Offsets are relative to the start of a channel's 128-byte block.

use super::Field;

/// Start address bits 22..16
pub const SA_HI: Field = Field::new(0x00, 0, 7);
/// Sample format (0 = PCM16, 1 = PCM8, 2 = ADPCM, 3 = ADPCM stream)
pub const PCMS: Field = Field::new(0x00, 7, 2);
/// Loop enable
pub const LPCTL: Field = Field::new(0x00, 9, 1);
/// Source select: 1 = noise generator
pub const SSCTL: Field = Field::new(0x00, 10, 1);
/// Key on bit, applied by KYONEX
pub const KYONB: Field = Field::new(0x00, 14, 1);
/// Key on execute, applies KYONB of every channel
pub const KYONEX: Field = Field::new(0x00, 15, 1);
/// Start address bits 15..0
pub const SA_LOW: Field = Field::new(0x04, 0, 16);
/// Loop start, in samples
pub const LSA: Field = Field::new(0x08, 0, 16);
/// Loop end, in samples
pub const LEA: Field = Field::new(0x0C, 0, 16);

/// Attack rate
pub const AR: Field = Field::new(0x10, 0, 5);
/// Decay 1 rate
pub const D1R: Field = Field::new(0x10, 6, 5);
/// Decay 2 rate
pub const D2R: Field = Field::new(0x10, 11, 5);
/// Release rate
pub const RR: Field = Field::new(0x14, 0, 5);
/// Decay level (sustain threshold)
pub const DL: Field = Field::new(0x14, 5, 5);
/// Key rate scaling
pub const KRS: Field = Field::new(0x14, 10, 4);
/// Loop start link: hold attack until the loop start is reached
pub const LPSLNK: Field = Field::new(0x14, 14, 1);

/// Fine pitch
pub const FNS: Field = Field::new(0x18, 0, 10);
/// Octave, signed 4-bit
pub const OCT: Field = Field::new(0x18, 11, 4);

/// Amplitude LFO depth
pub const ALFOS: Field = Field::new(0x1C, 0, 3);
/// Amplitude LFO waveform
pub const ALFOWS: Field = Field::new(0x1C, 3, 2);
/// Pitch LFO depth
pub const PLFOS: Field = Field::new(0x1C, 5, 3);
/// Pitch LFO waveform
pub const PLFOWS: Field = Field::new(0x1C, 8, 2);
/// LFO frequency code
pub const LFOF: Field = Field::new(0x1C, 10, 5);
/// LFO reset, self-clearing
pub const LFORE: Field = Field::new(0x1C, 15, 1);

/// Effect bus select
pub const ISEL: Field = Field::new(0x20, 0, 4);
/// Effect send level
pub const IMXL: Field = Field::new(0x20, 4, 4);
/// Direct pan
pub const DIPAN: Field = Field::new(0x24, 0, 5);
/// Direct send level
pub const DISDL: Field = Field::new(0x24, 8, 4);
/// Filter resonance
pub const Q: Field = Field::new(0x28, 0, 5);
/// Total level
pub const TL: Field = Field::new(0x28, 8, 8);

/// Filter envelope levels FLV0..FLV4
pub const FLV: [Field; 5] = [
    Field::new(0x2C, 0, 13),
    Field::new(0x30, 0, 13),
    Field::new(0x34, 0, 13),
    Field::new(0x38, 0, 13),
    Field::new(0x3C, 0, 13),
];
/// Filter envelope decay 1 rate
pub const FD1R: Field = Field::new(0x40, 0, 5);
/// Filter envelope attack rate
pub const FAR: Field = Field::new(0x40, 8, 5);
/// Filter envelope release rate
pub const FRR: Field = Field::new(0x44, 0, 5);
/// Filter envelope decay 2 rate
pub const FD2R: Field = Field::new(0x44, 8, 5);
