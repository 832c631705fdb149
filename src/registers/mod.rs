//! AICA Register File
//!
//! The 32 KiB register window seen by both CPUs, stored as raw little-endian
//! bytes. Typed access goes through [`Field`] descriptors rather than native
//! bit-field layouts, so every field is addressable at byte granularity.
//!
//! Layout:
//! - `0x0000..0x2000`: 64 channel blocks of [`CHANNEL_STRIDE`] bytes
//! - `0x2000..0x2048`: effect output levels (16 DSP returns, 2 CD-audio)
//! - `0x2800..0x2D08`: common block, timers, interrupt and CPU control
//! - `0x3000..0x8000`: effects-engine register image

pub mod channel;
pub mod common;

/// Size of the register window in bytes
pub const REG_WINDOW: usize = 0x8000;
/// Address mask applied to every register access
pub const REG_MASK: u32 = (REG_WINDOW as u32) - 1;
/// Number of voices
pub const CHANNEL_COUNT: usize = 64;
/// Bytes per channel register block
pub const CHANNEL_STRIDE: usize = 0x80;
/// End of the channel register area
pub const CHANNEL_AREA_END: usize = CHANNEL_COUNT * CHANNEL_STRIDE;
/// Base of the effect output level entries
pub const EFFECT_OUT_BASE: usize = 0x2000;
/// Number of effect output level entries (16 DSP returns + 2 CD-audio)
pub const EFFECT_OUT_COUNT: usize = 18;
/// Base of the effects-engine register image
pub const DSP_BASE: usize = 0x3000;
/// Effects-engine output registers (EFREG), 16 entries spaced 4 bytes
pub const DSP_EFREG_BASE: usize = DSP_BASE + 0x1580;

/// A bit-field inside a 16-bit little-endian register
///
/// `offset` is the byte offset of the containing register relative to the
/// block the field is read from; `shift`/`width` locate the bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Byte offset of the containing 16-bit register
    pub offset: usize,
    /// Bit position of the least significant bit
    pub shift: u32,
    /// Number of bits
    pub width: u32,
}

impl Field {
    /// Describe a field
    pub const fn new(offset: usize, shift: u32, width: u32) -> Self {
        Field {
            offset,
            shift,
            width,
        }
    }

    /// Unshifted mask of the field
    #[inline]
    pub const fn mask(&self) -> u32 {
        (1u32 << self.width) - 1
    }

    /// Same field, relocated by `base` bytes
    pub const fn at(&self, base: usize) -> Field {
        Field::new(self.offset + base, self.shift, self.width)
    }

    /// Read the field from a block of register bytes
    #[inline]
    pub fn read(&self, block: &[u8]) -> u32 {
        let raw = u16::from_le_bytes([block[self.offset], block[self.offset + 1]]) as u32;
        (raw >> self.shift) & self.mask()
    }

    /// Write the field into a block of register bytes, leaving other bits intact
    #[inline]
    pub fn write(&self, block: &mut [u8], value: u32) {
        let raw = u16::from_le_bytes([block[self.offset], block[self.offset + 1]]) as u32;
        let mask = self.mask() << self.shift;
        let raw = (raw & !mask) | ((value << self.shift) & mask);
        block[self.offset..self.offset + 2].copy_from_slice(&(raw as u16).to_le_bytes());
    }

    /// Read the field as a flag
    #[inline]
    pub fn is_set(&self, block: &[u8]) -> bool {
        self.read(block) != 0
    }
}

/// Raw register image
#[derive(Clone)]
pub struct RegisterFile {
    bytes: Box<[u8]>,
}

impl RegisterFile {
    /// Create a zeroed register file
    pub fn new() -> Self {
        RegisterFile {
            bytes: vec![0u8; REG_WINDOW].into_boxed_slice(),
        }
    }

    /// Zero every register
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Read one byte
    #[inline]
    pub fn read8(&self, addr: usize) -> u8 {
        self.bytes[addr & REG_MASK as usize]
    }

    /// Write one byte without side effects
    #[inline]
    pub fn write8(&mut self, addr: usize, value: u8) {
        self.bytes[addr & REG_MASK as usize] = value;
    }

    /// Read a little-endian 16-bit word
    #[inline]
    pub fn read16(&self, addr: usize) -> u16 {
        u16::from_le_bytes([self.read8(addr), self.read8(addr + 1)])
    }

    /// Write a little-endian 16-bit word without side effects
    #[inline]
    pub fn write16(&mut self, addr: usize, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr + 1, hi);
    }

    /// Read a field addressed relative to the window base
    #[inline]
    pub fn get(&self, field: Field) -> u32 {
        field.read(&self.bytes)
    }

    /// Write a field addressed relative to the window base
    #[inline]
    pub fn set(&mut self, field: Field, value: u32) {
        field.write(&mut self.bytes, value)
    }

    /// Register block of channel `index`
    pub fn channel(&self, index: usize) -> &[u8] {
        let base = index * CHANNEL_STRIDE;
        &self.bytes[base..base + CHANNEL_STRIDE]
    }

    /// Mutable register block of channel `index`
    pub fn channel_mut(&mut self, index: usize) -> &mut [u8] {
        let base = index * CHANNEL_STRIDE;
        &mut self.bytes[base..base + CHANNEL_STRIDE]
    }

    /// Output level entry `index` as `(level, pan)`
    ///
    /// Entries 0..16 scale the effects returns, 16 and 17 the CD-audio input.
    pub fn effect_out(&self, index: usize) -> (u32, u32) {
        let base = EFFECT_OUT_BASE + index * 4;
        (
            self.get(common::EFSDL.at(base)),
            self.get(common::EFPAN.at(base)),
        )
    }

    /// Effects-engine return register `index` (EFREG)
    pub fn efreg(&self, index: usize) -> i16 {
        self.read16(DSP_EFREG_BASE + index * 4) as i16
    }

    /// The whole effects-engine register image
    pub fn dsp(&self) -> &[u8] {
        &self.bytes[DSP_BASE..]
    }

    /// Mutable effects-engine register image
    pub fn dsp_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[DSP_BASE..]
    }

    /// All register bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterFile")
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_read_write_preserves_neighbours() {
        let mut block = [0u8; 4];
        let low = Field::new(0, 0, 5);
        let high = Field::new(0, 8, 8);
        low.write(&mut block, 0x1F);
        high.write(&mut block, 0xA5);
        assert_eq!(low.read(&block), 0x1F);
        assert_eq!(high.read(&block), 0xA5);
        assert_eq!(block[0], 0x1F);
        assert_eq!(block[1], 0xA5);

        low.write(&mut block, 0x2A); // truncated to 5 bits
        assert_eq!(low.read(&block), 0x0A);
        assert_eq!(high.read(&block), 0xA5);
    }

    #[test]
    fn test_field_spanning_bytes() {
        let mut block = [0u8; 2];
        let f = Field::new(0, 5, 5);
        f.write(&mut block, 0x15);
        assert_eq!(u16::from_le_bytes(block), 0x15 << 5);
        assert_eq!(f.read(&block), 0x15);
    }

    #[test]
    fn test_register_file_masks_addresses() {
        let mut regs = RegisterFile::new();
        regs.write8(0x8000 + 0x10, 0x42);
        assert_eq!(regs.read8(0x10), 0x42);
        regs.write16(0x2800, 0xBEEF);
        assert_eq!(regs.read8(0x2800), 0xEF);
        assert_eq!(regs.read8(0x2801), 0xBE);
        assert_eq!(regs.read16(0x2800), 0xBEEF);
    }

    #[test]
    fn test_channel_blocks_are_disjoint() {
        let mut regs = RegisterFile::new();
        regs.channel_mut(1)[0] = 7;
        assert_eq!(regs.read8(CHANNEL_STRIDE), 7);
        assert_eq!(regs.channel(0)[0], 0);
    }

    #[test]
    fn test_effect_out_and_efreg() {
        let mut regs = RegisterFile::new();
        regs.write16(EFFECT_OUT_BASE + 16 * 4, 0x0B13);
        assert_eq!(regs.effect_out(16), (0xB, 0x13));
        regs.write16(DSP_EFREG_BASE + 4, (-1234i16) as u16);
        assert_eq!(regs.efreg(1), -1234);
    }
}
