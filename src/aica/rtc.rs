//! Real-time clock: a 32-bit seconds counter split over two 16-bit registers

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds between 1950-01-01 and 1970-01-01, the clock's epoch offset
pub const EPOCH_OFFSET: u32 = 631_152_000;

/// The clock register block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rtc {
    value: u32,
    write_enable: bool,
}

impl Rtc {
    /// Clock seeded from the host's wall time
    pub fn new() -> Self {
        let unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        Self::with_value(unix.wrapping_add(EPOCH_OFFSET))
    }

    /// Clock holding `value`
    pub fn with_value(value: u32) -> Self {
        Rtc {
            value,
            write_enable: false,
        }
    }

    /// Current counter
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Whether the next high-half write is accepted
    pub fn write_enabled(&self) -> bool {
        self.write_enable
    }

    /// Read a clock register
    pub fn read(&self, offset: u32) -> u32 {
        match offset & 0xFF {
            0 => self.value >> 16,
            4 => self.value & 0xFFFF,
            8 => 0,
            other => {
                log::warn!("RTC read from invalid offset {:#x}", other);
                0
            }
        }
    }

    /// Write a clock register
    ///
    /// Both halves need write enable; writing the high half closes it again.
    pub fn write(&mut self, offset: u32, data: u32) {
        match offset & 0xFF {
            0 if self.write_enable => {
                self.value = (self.value & 0xFFFF) | ((data & 0xFFFF) << 16);
                self.write_enable = false;
            }
            4 if self.write_enable => {
                self.value = (self.value & 0xFFFF_0000) | (data & 0xFFFF);
            }
            8 => self.write_enable = data & 1 != 0,
            _ => {}
        }
    }
}

impl Default for Rtc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_halves() {
        let rtc = Rtc::with_value(0x1234_5678);
        assert_eq!(rtc.read(0), 0x1234);
        assert_eq!(rtc.read(4), 0x5678);
        assert_eq!(rtc.read(8), 0);
        assert_eq!(rtc.read(0xC), 0);
    }

    #[test]
    fn test_writes_need_enable() {
        let mut rtc = Rtc::with_value(0x1234_5678);
        rtc.write(0, 0xAAAA);
        rtc.write(4, 0xBBBB);
        assert_eq!(rtc.value(), 0x1234_5678);

        rtc.write(8, 1);
        rtc.write(4, 0xBBBB);
        assert_eq!(rtc.value(), 0x1234_BBBB);
        rtc.write(0, 0xAAAA);
        assert_eq!(rtc.value(), 0xAAAA_BBBB);
        assert!(!rtc.write_enabled());

        rtc.write(4, 0xCCCC);
        assert_eq!(rtc.value(), 0xAAAA_BBBB);
    }

    #[test]
    fn test_seeded_after_epoch_offset() {
        assert!(Rtc::new().value() > EPOCH_OFFSET);
    }
}
