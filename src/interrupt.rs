//! Interrupt Controller
//!
//! Two views share the same eleven interrupt sources:
//! - the secondary (sound) CPU view, which delivers the pending state and a
//!   3-bit priority level built from three level bit-planes
//! - the primary (main) CPU view, a single shared line asserted and
//!   deasserted only on edges
//!
//! Enable and pending bits live in the register file; this module
//! recomputes line state from them.

use crate::host::InterruptLines;
use crate::registers::common::{L_REG, MCIEB, MCIPD, SCIEB, SCIPD, SCILV};
use crate::registers::RegisterFile;
use bitflags::bitflags;

bitflags! {
    /// Interrupt sources, same bit layout in both views
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptFlags: u16 {
        /// External input
        const EXTERNAL = 1 << 0;
        /// MIDI input
        const MIDI_IN = 1 << 3;
        /// DMA transfer end
        const DMA_END = 1 << 4;
        /// CPU-to-CPU request
        const CPU = 1 << 5;
        /// Timer A overflow
        const TIMER_A = 1 << 6;
        /// Timer B overflow
        const TIMER_B = 1 << 7;
        /// Timer C overflow
        const TIMER_C = 1 << 8;
        /// MIDI output
        const MIDI_OUT = 1 << 9;
        /// One sample elapsed
        const SAMPLE = 1 << 10;
    }
}

/// Highest bit index considered by the priority scan
const SCAN_BITS: u32 = 11;
/// Bits above this index share its priority level
const LEVEL_CLAMP: u32 = 7;

/// Interrupt line bookkeeping for both CPU views
#[derive(Debug, Clone, Default)]
pub struct InterruptController {
    primary_asserted: bool,
    secondary_level: u32,
}

impl InterruptController {
    /// Controller with both lines idle
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget line state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the primary line is currently asserted
    pub fn primary_asserted(&self) -> bool {
        self.primary_asserted
    }

    /// Last level delivered to the secondary CPU
    pub fn secondary_level(&self) -> u32 {
        self.secondary_level
    }

    /// Set pending bits in both views
    pub fn raise(&self, regs: &mut RegisterFile, flags: InterruptFlags) {
        for addr in [SCIPD, MCIPD] {
            regs.write16(addr, regs.read16(addr) | flags.bits());
        }
    }

    /// Pending-and-enabled sources of the secondary view
    pub fn secondary_active(regs: &RegisterFile) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(regs.read16(SCIEB) & regs.read16(SCIPD))
    }

    /// Pending-and-enabled sources of the primary view
    pub fn primary_active(regs: &RegisterFile) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(regs.read16(MCIEB) & regs.read16(MCIPD))
    }

    /// Priority level of interrupt bit `bit`
    pub fn level_of(regs: &RegisterFile, bit: u32) -> u32 {
        let bit = bit.min(LEVEL_CLAMP);
        SCILV
            .iter()
            .enumerate()
            .map(|(plane, &addr)| ((regs.read8(addr) as u32 >> bit) & 1) << plane)
            .sum()
    }

    /// Recompute and deliver the secondary CPU line
    ///
    /// The lowest pending-and-enabled bit selects the level (0 when nothing
    /// is active), which is also latched into the L register.
    pub fn update_secondary(&mut self, regs: &mut RegisterFile, lines: &mut dyn InterruptLines) {
        let active = Self::secondary_active(regs);
        let bits = active.bits() as u32;
        self.secondary_level = (0..SCAN_BITS)
            .find(|b| bits & (1 << b) != 0)
            .map_or(0, |bit| Self::level_of(regs, bit));
        regs.write8(L_REG, self.secondary_level as u8);
        lines.secondary_interrupt(!active.is_empty(), self.secondary_level);
    }

    /// Recompute the primary CPU line, signalling only edges
    pub fn update_primary(&mut self, regs: &RegisterFile, lines: &mut dyn InterruptLines) {
        let active = !Self::primary_active(regs).is_empty();
        if active && !self.primary_asserted {
            self.primary_asserted = true;
            lines.primary_raise();
        } else if !active && self.primary_asserted {
            self.primary_asserted = false;
            lines.primary_cancel();
        }
    }

    /// Recompute both views
    pub fn update(&mut self, regs: &mut RegisterFile, lines: &mut dyn InterruptLines) {
        self.update_secondary(regs, lines);
        self.update_primary(regs, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullInterruptLines;

    #[derive(Default)]
    struct Recorder {
        secondary: Vec<(bool, u32)>,
        raises: usize,
        cancels: usize,
    }

    impl InterruptLines for Recorder {
        fn secondary_interrupt(&mut self, pending: bool, level: u32) {
            self.secondary.push((pending, level));
        }
        fn primary_raise(&mut self) {
            self.raises += 1;
        }
        fn primary_cancel(&mut self) {
            self.cancels += 1;
        }
    }

    #[test]
    fn test_raise_sets_both_views() {
        let mut regs = RegisterFile::new();
        let ctl = InterruptController::new();
        ctl.raise(&mut regs, InterruptFlags::TIMER_B);
        assert_eq!(regs.read16(SCIPD), 1 << 7);
        assert_eq!(regs.read16(MCIPD), 1 << 7);
    }

    #[test]
    fn test_level_from_bit_planes() {
        let mut regs = RegisterFile::new();
        regs.write8(SCILV[0], 0b0100_0000);
        regs.write8(SCILV[2], 0b1100_0000);
        assert_eq!(InterruptController::level_of(&regs, 6), 0b101);
        assert_eq!(InterruptController::level_of(&regs, 7), 0b100);
        // bits past 7 share bit 7's level
        assert_eq!(InterruptController::level_of(&regs, 10), 0b100);
        assert_eq!(InterruptController::level_of(&regs, 0), 0);
    }

    #[test]
    fn test_secondary_uses_lowest_active_bit() {
        let mut regs = RegisterFile::new();
        let mut ctl = InterruptController::new();
        let mut rec = Recorder::default();
        regs.write8(SCILV[0], 0b0100_0000); // timer A -> level 1
        regs.write8(SCILV[1], 0b1000_0000); // timer B -> level 2
        regs.write16(SCIEB, (1 << 6) | (1 << 7));
        ctl.raise(&mut regs, InterruptFlags::TIMER_A | InterruptFlags::TIMER_B);

        ctl.update_secondary(&mut regs, &mut rec);
        assert_eq!(rec.secondary.last(), Some(&(true, 1)));
        assert_eq!(regs.read8(L_REG), 1);

        regs.write16(SCIPD, 1 << 7);
        ctl.update_secondary(&mut regs, &mut rec);
        assert_eq!(rec.secondary.last(), Some(&(true, 2)));
        assert_eq!(regs.read8(L_REG), 2);
    }

    #[test]
    fn test_secondary_delivers_every_update() {
        let mut regs = RegisterFile::new();
        let mut ctl = InterruptController::new();
        let mut rec = Recorder::default();
        ctl.update_secondary(&mut regs, &mut rec);
        ctl.update_secondary(&mut regs, &mut rec);
        assert_eq!(rec.secondary, vec![(false, 0), (false, 0)]);
    }

    #[test]
    fn test_primary_is_edge_triggered() {
        let mut regs = RegisterFile::new();
        let mut ctl = InterruptController::new();
        let mut rec = Recorder::default();

        regs.write16(MCIEB, InterruptFlags::DMA_END.bits());
        ctl.update_primary(&regs, &mut rec);
        assert_eq!((rec.raises, rec.cancels), (0, 0));

        ctl.raise(&mut regs, InterruptFlags::DMA_END);
        ctl.update_primary(&regs, &mut rec);
        ctl.update_primary(&regs, &mut rec);
        assert_eq!((rec.raises, rec.cancels), (1, 0));
        assert!(ctl.primary_asserted());

        regs.write16(MCIPD, 0);
        ctl.update_primary(&regs, &mut rec);
        ctl.update_primary(&regs, &mut rec);
        assert_eq!((rec.raises, rec.cancels), (1, 1));
    }

    #[test]
    fn test_disabled_sources_do_not_assert() {
        let mut regs = RegisterFile::new();
        let mut ctl = InterruptController::new();
        ctl.raise(&mut regs, InterruptFlags::SAMPLE);
        ctl.update(&mut regs, &mut NullInterruptLines);
        assert!(!ctl.primary_asserted());
        assert!(InterruptController::secondary_active(&regs).is_empty());
    }
}
