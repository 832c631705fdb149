//! Register read/write dispatch
//!
//! Every access is reduced to byte operations so a word access always ends
//! in the same state as two byte accesses. The one exception is the
//! selected-channel status read, which only clears the loop flag on word
//! reads or byte reads of the upper half.

use super::Aica;
use crate::interrupt::InterruptFlags;
use crate::registers::common::{
    AFSET, ARMRST, CA, COMMON_BASE, EG, LP, MCIEB, MCIPD, MCIRE, MIEMP, MOEMP, MSLC, RBL, RBP,
    SCIEB, SCIPD, SCIRE, SGC, TIMER_ADDRS,
};
use crate::registers::{CHANNEL_AREA_END, DSP_BASE, REG_MASK};

/// End of the common block with access side effects
const COMMON_SIDE_EFFECT_END: usize = COMMON_BASE + 0x18;

/// Width of a register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSize {
    /// 8-bit access
    Byte,
    /// 16-bit little-endian access
    Word,
}

impl Aica {
    /// Read a register
    ///
    /// Word reads return the 16-bit value at `addr`; the upper bits of the
    /// result are zero.
    pub fn read(&mut self, addr: u32, size: AccessSize) -> u32 {
        let addr = (addr & REG_MASK) as usize;
        let byte = size == AccessSize::Byte;

        if (COMMON_BASE..COMMON_SIDE_EFFECT_END).contains(&addr) {
            self.read_common(addr, byte);
        }

        match size {
            AccessSize::Byte => self.regs.read8(addr) as u32,
            AccessSize::Word => self.regs.read16(addr) as u32,
        }
    }

    fn read_common(&mut self, addr: usize, byte: bool) {
        match addr {
            0x2808 | 0x2809 => {
                self.regs.set(MIEMP, 1);
                self.regs.set(MOEMP, 1);
            }
            0x2810 | 0x2811 => {
                let index = self.regs.get(MSLC) as usize;
                debug_assert_eq!(self.regs.get(AFSET), 0, "filter envelope monitor selected");

                let channel = self.voices.channel_mut(index);
                self.regs.set(LP, channel.looped() as u32);
                self.regs.set(EG, channel.envelope().level());
                self.regs.set(SGC, channel.envelope().state() as u32);
                if !(byte && addr == 0x2810) {
                    channel.clear_looped();
                }
            }
            0x2814 | 0x2815 => {
                let index = self.regs.get(MSLC) as usize;
                let cursor = self.voices.channel(index).cursor();
                self.regs.set(CA, cursor & 0xFFFF);
            }
            _ => {}
        }
    }

    /// Write a register
    pub fn write(&mut self, addr: u32, value: u32, size: AccessSize) {
        let addr = (addr & REG_MASK) as usize;
        match size {
            AccessSize::Byte => self.write_byte(addr, value as u8),
            AccessSize::Word => {
                self.write_byte(addr, value as u8);
                self.write_byte((addr + 1) & REG_MASK as usize, (value >> 8) as u8);
            }
        }
    }

    fn write_byte(&mut self, addr: usize, data: u8) {
        if addr < CHANNEL_AREA_END {
            self.regs.write8(addr, data);
            self.voices.register_written(&mut self.regs, &self.ram, addr);
            return;
        }

        if addr >= DSP_BASE {
            self.regs.write8(addr, data);
            self.host
                .effects
                .register_written(addr - DSP_BASE, self.regs.dsp());
            return;
        }

        if (COMMON_BASE..COMMON_SIDE_EFFECT_END).contains(&addr) {
            self.regs.write8(addr, data);
            if addr == 0x2804 || addr == 0x2805 {
                self.ring_buffer_changed();
            }
            return;
        }

        match addr {
            SCIPD | MCIPD => {
                if data & InterruptFlags::CPU.bits() as u8 != 0 {
                    let pending = self.regs.read16(addr) | InterruptFlags::CPU.bits();
                    self.regs.write16(addr, pending);
                }
                self.update_interrupts();
            }
            a if a == SCIPD + 1 || a == MCIPD + 1 => {}
            SCIRE | MCIRE => {
                self.acknowledge(addr - 4, data as u16);
            }
            a if a == SCIRE + 1 || a == MCIRE + 1 => {
                self.acknowledge(addr - 5, (data as u16) << 8);
            }
            a if a & !1 == SCIEB || a & !1 == MCIEB => {
                self.regs.write8(addr, data);
                self.update_interrupts();
            }
            a if TIMER_ADDRS.contains(&(a & !1)) => {
                self.regs.write8(addr, data);
                let index = TIMER_ADDRS.iter().position(|&t| t == addr & !1).unwrap_or(0);
                self.timers[index].register_written(&self.regs);
            }
            ARMRST => {
                let reset = data & 1;
                self.regs.write8(ARMRST, reset);
                log::debug!("secondary CPU {}", if reset == 0 { "running" } else { "held in reset" });
                self.host.lines.set_secondary_running(reset == 0);
            }
            _ => self.regs.write8(addr, data),
        }
    }

    fn acknowledge(&mut self, pending_addr: usize, bits: u16) {
        let pending = self.regs.read16(pending_addr) & !bits;
        self.regs.write16(pending_addr, pending);
        self.update_interrupts();
    }

    fn update_interrupts(&mut self) {
        self.interrupts.update(&mut self.regs, self.host.lines.as_mut());
    }

    fn ring_buffer_changed(&mut self) {
        let base = (self.regs.get(RBP) * 2048) & self.ram.mask() as u32;
        let mask = (8192u32 << self.regs.get(RBL)) - 1;
        self.host.effects.ring_buffer_changed(base, mask);
    }

    /// Whether the secondary CPU is out of reset
    pub fn secondary_running(&self) -> bool {
        self.regs.read8(ARMRST) == 0
    }

    /// Read a DMA trigger register
    pub fn read_dma(&self, offset: u32) -> u32 {
        self.dma.read(offset as usize)
    }

    /// Write a DMA trigger register
    ///
    /// A start write copies the block immediately; completion is signalled
    /// later through [`periodical`](Aica::periodical).
    pub fn write_dma(&mut self, offset: u32, value: u32) {
        let hold = self.config.dma_busy_until_complete;
        self.dma.write(
            offset as usize,
            value,
            &mut self.ram,
            self.host.memory.as_mut(),
            hold,
        );
    }

    /// Read a real-time clock register
    pub fn read_rtc(&self, offset: u32) -> u32 {
        self.rtc.read(offset)
    }

    /// Write a real-time clock register
    pub fn write_rtc(&mut self, offset: u32, value: u32) {
        self.rtc.write(offset, value);
    }
}

#[cfg(test)]
mod tests {
    use crate::aica::{AccessSize, Aica};
    use crate::config::AicaConfig;
    use crate::host::Host;
    use crate::registers::common::{ARMRST, MCIPD, SCIPD, VREG};

    fn aica() -> Aica {
        Aica::new(AicaConfig::default(), Host::new())
    }

    #[test]
    fn test_word_write_matches_byte_writes_at_cpu_control() {
        let mut word = aica();
        word.write(0x2C00, 0x5A03, AccessSize::Word);

        let mut bytes = aica();
        bytes.write(0x2C00, 0x03, AccessSize::Byte);
        bytes.write(0x2C01, 0x5A, AccessSize::Byte);

        for a in [&mut word, &mut bytes] {
            assert_eq!(a.read(ARMRST as u32, AccessSize::Byte), 1);
            assert_eq!(a.read(VREG as u32, AccessSize::Byte), 0x5A);
            assert_eq!(a.read(0x2C00, AccessSize::Word), 0x5A01);
            assert!(!a.secondary_running());
        }
    }

    #[test]
    fn test_pending_write_only_sets_cpu_bit() {
        let mut a = aica();
        a.write(SCIPD as u32, 0xFFFF, AccessSize::Word);
        assert_eq!(a.registers().read16(SCIPD), 1 << 5);
        assert_eq!(a.registers().read16(MCIPD), 0);
    }

    #[test]
    fn test_reset_register_clears_pending_and_is_not_stored() {
        let mut a = aica();
        a.time_step();
        a.write(SCIPD as u32, 0x20, AccessSize::Byte);
        assert_eq!(a.registers().read16(SCIPD), 0x0420);

        a.write(0x28A4, 0x0400, AccessSize::Word);
        assert_eq!(a.registers().read16(SCIPD), 0x0020);
        assert_eq!(a.registers().read16(0x28A4), 0);
    }

    #[test]
    fn test_midi_status_read_reports_empty() {
        let mut a = aica();
        let v = a.read(0x2808, AccessSize::Word);
        assert_eq!(v & (1 << 8), 1 << 8);
        assert_eq!(v & (1 << 11), 1 << 11);
    }

    #[test]
    fn test_address_masked_to_window() {
        let mut a = aica();
        a.write(0x0080_2800, 0x0F, AccessSize::Byte);
        assert_eq!(a.read(0x2800, AccessSize::Byte), 0x0F);
    }
}
