//! G2 Bus DMA Trigger
//!
//! The system-side DMA channel between main memory and sound RAM. Only the
//! register protocol is modeled: a start write copies the whole block at once,
//! in fixed-size chunks, and the completion interrupt follows after a
//! length-proportional delay.

use crate::host::{InterruptLines, SystemMemory};
use crate::ram::SoundRam;

/// Sound-RAM side start address (ADSTAG)
pub const ADSTAG: usize = 0x00;
/// System memory start address (ADSTAR)
pub const ADSTAR: usize = 0x04;
/// Length; bit 31 re-enables after the transfer (ADLEN)
pub const ADLEN: usize = 0x08;
/// Direction: 0 = system memory to sound RAM (ADDIR)
pub const ADDIR: usize = 0x0C;
/// Enable (ADEN)
pub const ADEN: usize = 0x14;
/// Start / busy (ADST)
pub const ADST: usize = 0x18;

/// Bytes moved per block copy
pub const DMA_CHUNK: usize = 4096;

const REPEAT_BIT: u32 = 0x8000_0000;
/// Bus cycles charged per transferred byte, in 1/65536 units
const CYCLES_PER_BYTE_Q16: u64 = 200_000_000;

/// DMA channel registers and the completion countdown
#[derive(Debug, Clone, Default)]
pub struct G2Dma {
    regs: [u32; 8],
    pending: i64,
}

impl G2Dma {
    /// Idle channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the register at `offset`
    pub fn read(&self, offset: usize) -> u32 {
        self.regs[(offset >> 2) & 7]
    }

    /// Cycles left until the completion interrupt
    pub fn pending_cycles(&self) -> i64 {
        self.pending
    }

    /// Whether a completion interrupt is outstanding
    pub fn in_flight(&self) -> bool {
        self.pending > 0
    }

    /// Write the register at `offset`; a start write runs the transfer
    ///
    /// `hold_busy` keeps ADST set until [`periodical`](Self::periodical)
    /// delivers the completion.
    pub fn write(
        &mut self,
        offset: usize,
        value: u32,
        ram: &mut SoundRam,
        memory: &mut dyn SystemMemory,
        hold_busy: bool,
    ) {
        if offset & !3 == ADST {
            self.start(value, ram, memory, hold_busy);
        } else {
            self.regs[(offset >> 2) & 7] = value;
        }
    }

    fn start(&mut self, value: u32, ram: &mut SoundRam, memory: &mut dyn SystemMemory, hold_busy: bool) {
        if value & 1 == 0 || self.read(ADEN) & 1 == 0 {
            return;
        }

        let aica_addr = self.read(ADSTAG);
        let sys_addr = self.read(ADSTAR);
        let len = self.read(ADLEN) & !REPEAT_BIT;
        let to_system = self.read(ADDIR) & 1 == 1;

        if to_system {
            log::warn!(
                "reverse DMA: sound RAM {:#010x} -> system {:#010x}, {} bytes",
                aica_addr,
                sys_addr,
                len
            );
        } else {
            log::debug!(
                "DMA: system {:#010x} -> sound RAM {:#010x}, {} bytes",
                sys_addr,
                aica_addr,
                len
            );
        }

        let mut chunk = [0u8; DMA_CHUNK];
        let mut done = 0u32;
        while done < len {
            let block = &mut chunk[..(len - done).min(DMA_CHUNK as u32) as usize];
            let ram_addr = aica_addr.wrapping_add(done) as usize;
            let result = if to_system {
                ram.read_into(ram_addr, block);
                memory.write_block(sys_addr.wrapping_add(done), block)
            } else {
                let read = memory.read_block(sys_addr.wrapping_add(done), block);
                if read.is_ok() {
                    ram.load(ram_addr, block);
                }
                read
            };
            if let Err(e) = result {
                log::warn!("DMA aborted at offset {:#x} of {:#x} bytes: {}", done, len, e);
                break;
            }
            done += block.len() as u32;
        }

        self.regs[ADEN >> 2] = u32::from(self.read(ADLEN) & REPEAT_BIT != 0);
        self.regs[ADSTAR >> 2] = sys_addr.wrapping_add(len);
        self.regs[ADSTAG >> 2] = aica_addr.wrapping_add(len);
        self.regs[ADLEN >> 2] = 0;
        self.regs[ADST >> 2] = u32::from(hold_busy);

        self.pending = ((len as u64 * CYCLES_PER_BYTE_Q16) / 65536) as i64 + 1;
    }

    /// Advance the completion countdown by `cycles`
    ///
    /// Returns true when the completion interrupt was delivered.
    pub fn periodical(&mut self, cycles: u32, lines: &mut dyn InterruptLines, hold_busy: bool) -> bool {
        if self.pending <= 0 {
            return false;
        }
        debug_assert!(!hold_busy || self.read(ADST) == 1, "DMA in flight without busy flag");

        self.pending -= cycles as i64;
        if self.pending > 0 {
            return false;
        }
        self.pending = 0;
        self.regs[ADST >> 2] = 0;
        lines.dma_complete();
        true
    }

    /// Back to idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
