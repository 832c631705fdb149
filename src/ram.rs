//! Sound RAM
//!
//! Flat byte array shared by the voices, the effects engine and DMA.
//! Addresses wrap with a power-of-two mask.

/// Default sound RAM size (2 MiB)
pub const SOUND_RAM_SIZE: usize = 2 * 1024 * 1024;

/// Sound RAM
#[derive(Clone)]
pub struct SoundRam {
    data: Box<[u8]>,
    mask: usize,
}

impl SoundRam {
    /// Create zeroed RAM of the default size
    pub fn new() -> Self {
        Self::with_size(SOUND_RAM_SIZE)
    }

    /// Create zeroed RAM of `size` bytes, rounded up to a power of two
    pub fn with_size(size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        SoundRam {
            data: vec![0u8; size].into_boxed_slice(),
            mask: size - 1,
        }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false; RAM has at least one byte
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Address mask
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Zero the whole RAM
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Read a byte
    #[inline]
    pub fn read8(&self, addr: usize) -> u8 {
        self.data[addr & self.mask]
    }

    /// Read a little-endian signed 16-bit sample
    #[inline]
    pub fn read_i16(&self, addr: usize) -> i16 {
        i16::from_le_bytes([self.read8(addr), self.read8(addr + 1)])
    }

    /// Read a little-endian 32-bit word
    pub fn read32(&self, addr: usize) -> u32 {
        u32::from_le_bytes([
            self.read8(addr),
            self.read8(addr + 1),
            self.read8(addr + 2),
            self.read8(addr + 3),
        ])
    }

    /// Write a byte
    #[inline]
    pub fn write8(&mut self, addr: usize, value: u8) {
        self.data[addr & self.mask] = value;
    }

    /// Write a little-endian 32-bit word
    pub fn write32(&mut self, addr: usize, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.write8(addr + i, b);
        }
    }

    /// Copy `bytes` into RAM starting at `addr`, wrapping at the end
    pub fn load(&mut self, addr: usize, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.write8(addr + i, b);
        }
    }

    /// Copy RAM starting at `addr` into `out`, wrapping at the end
    pub fn read_into(&self, addr: usize, out: &mut [u8]) {
        for (i, b) in out.iter_mut().enumerate() {
            *b = self.read8(addr + i);
        }
    }

    /// Load little-endian 16-bit samples starting at `addr`
    pub fn load_pcm16(&mut self, addr: usize, samples: &[i16]) {
        for (i, s) in samples.iter().enumerate() {
            let [lo, hi] = s.to_le_bytes();
            self.write8(addr + i * 2, lo);
            self.write8(addr + i * 2 + 1, hi);
        }
    }

    /// Raw contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw contents
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for SoundRam {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SoundRam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundRam").field("len", &self.data.len()).finish()
    }
}
