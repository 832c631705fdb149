//! Chip-wide register addresses and fields
//!
//! Field offsets are absolute within the register window, except
//! [`EFSDL`]/[`EFPAN`] which are relative to an effect output entry.

use super::Field;

/// Effect output send level (relative to its entry)
pub const EFSDL: Field = Field::new(0x00, 8, 4);
/// Effect output pan (relative to its entry)
pub const EFPAN: Field = Field::new(0x00, 0, 5);

/// Base of the common block
pub const COMMON_BASE: usize = 0x2800;

/// Master volume
pub const MVOL: Field = Field::new(0x2800, 0, 4);
/// 18-bit DAC output mode
pub const DAC18B: Field = Field::new(0x2800, 8, 1);
/// Fold stereo output to mono
pub const MONO: Field = Field::new(0x2800, 15, 1);

/// Effects ring buffer base, in 2 KiB units
pub const RBP: Field = Field::new(0x2804, 0, 12);
/// Effects ring buffer length code
pub const RBL: Field = Field::new(0x2804, 13, 2);

/// MIDI input buffer empty
pub const MIEMP: Field = Field::new(0x2808, 8, 1);
/// MIDI output buffer empty
pub const MOEMP: Field = Field::new(0x2808, 11, 1);

/// Monitor slot select
pub const MSLC: Field = Field::new(0x280C, 8, 6);
/// Monitor select: 0 = amplitude envelope
pub const AFSET: Field = Field::new(0x280C, 14, 1);

/// Envelope level of the monitored channel
pub const EG: Field = Field::new(0x2810, 0, 13);
/// Envelope state of the monitored channel
pub const SGC: Field = Field::new(0x2810, 13, 2);
/// Loop-passed flag of the monitored channel
pub const LP: Field = Field::new(0x2810, 15, 1);
/// Current sample address of the monitored channel
pub const CA: Field = Field::new(0x2814, 0, 16);

/// Timer A/B/C register addresses
pub const TIMER_ADDRS: [usize; 3] = [0x2890, 0x2894, 0x2898];
/// Timer count, relative to a timer register
pub const TIMER_COUNT: Field = Field::new(0, 0, 8);
/// Timer period shift, relative to a timer register
pub const TIMER_MD: Field = Field::new(0, 8, 3);

/// Secondary-CPU interrupt enable
pub const SCIEB: usize = 0x289C;
/// Secondary-CPU interrupt pending
pub const SCIPD: usize = 0x28A0;
/// Secondary-CPU interrupt reset
pub const SCIRE: usize = 0x28A4;
/// Secondary-CPU interrupt level bit-planes
pub const SCILV: [usize; 3] = [0x28A8, 0x28AC, 0x28B0];
/// Primary-CPU interrupt enable
pub const MCIEB: usize = 0x28B4;
/// Primary-CPU interrupt pending
pub const MCIPD: usize = 0x28B8;
/// Primary-CPU interrupt reset
pub const MCIRE: usize = 0x28BC;

/// Secondary-CPU reset byte
pub const ARMRST: usize = 0x2C00;
/// Video output mode byte, shares a word with [`ARMRST`]
pub const VREG: usize = 0x2C01;
/// Latched secondary-CPU interrupt level
pub const L_REG: usize = 0x2D00;
