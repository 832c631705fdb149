//! Sample-Clocked Timers
//!
//! Three 8-bit up-counters (A, B, C). Each advances once every `1 << md`
//! samples and raises its interrupt when the count wraps from 0xFF to 0x00.

use crate::interrupt::InterruptFlags;
use crate::registers::common::{TIMER_ADDRS, TIMER_COUNT, TIMER_MD};
use crate::registers::RegisterFile;

/// Timer identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerId {
    /// Timer A
    A = 0,
    /// Timer B
    B = 1,
    /// Timer C
    C = 2,
}

impl TimerId {
    /// All timers in register order
    pub const ALL: [TimerId; 3] = [TimerId::A, TimerId::B, TimerId::C];

    /// Register address of this timer
    pub fn address(&self) -> usize {
        TIMER_ADDRS[*self as usize]
    }

    /// Interrupt bit raised on overflow
    pub fn interrupt(&self) -> InterruptFlags {
        match self {
            TimerId::A => InterruptFlags::TIMER_A,
            TimerId::B => InterruptFlags::TIMER_B,
            TimerId::C => InterruptFlags::TIMER_C,
        }
    }
}

/// One AICA timer
///
/// The count lives in the register file; the timer keeps the period and
/// the countdown to the next increment.
#[derive(Debug, Clone)]
pub struct Timer {
    id: TimerId,
    period: u32,
    countdown: u32,
}

impl Timer {
    /// Create a timer with a one-sample period
    pub fn new(id: TimerId) -> Self {
        Timer {
            id,
            period: 1,
            countdown: 1,
        }
    }

    /// Load period and countdown from the register file
    pub fn init(&mut self, regs: &RegisterFile) {
        self.period = 1 << regs.get(TIMER_MD.at(self.id.address()));
        self.countdown = self.period;
    }

    /// Identity
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Samples per count
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Re-read the period after a register write
    ///
    /// The countdown restarts only when the period actually changed.
    pub fn register_written(&mut self, regs: &RegisterFile) {
        let period = 1 << regs.get(TIMER_MD.at(self.id.address()));
        if period != self.period {
            self.period = period;
            self.countdown = period;
        }
    }

    /// Advance one sample; returns true when the count wrapped to zero
    pub fn step(&mut self, regs: &mut RegisterFile) -> bool {
        self.countdown -= 1;
        if self.countdown > 0 {
            return false;
        }
        self.countdown = self.period;

        let field = TIMER_COUNT.at(self.id.address());
        let count = (regs.get(field) + 1) & 0xFF;
        regs.set(field, count);
        count == 0
    }
}
