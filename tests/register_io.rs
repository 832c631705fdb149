//! Register-level behavior seen by the host: interrupts, timers, CPU
//! control, DMA, the real-time clock and the external collaborators.

use aica::aica::{ADDIR, ADEN, ADLEN, ADST, ADSTAG, ADSTAR, EPOCH_OFFSET};
use aica::host::{CDDA_SECTOR_SAMPLES, EFFECT_BUSES};
use aica::{
    AccessSize, Aica, AicaConfig, CddaSource, EffectsProcessor, Host, InterruptLines, SoundRam,
    SystemMemory,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct LineLog {
    secondary: Vec<(bool, u32)>,
    raises: usize,
    cancels: usize,
    dma_completions: usize,
    running: Vec<bool>,
}

#[derive(Clone, Default)]
struct Lines(Arc<Mutex<LineLog>>);

impl InterruptLines for Lines {
    fn secondary_interrupt(&mut self, pending: bool, level: u32) {
        self.0.lock().secondary.push((pending, level));
    }
    fn primary_raise(&mut self) {
        self.0.lock().raises += 1;
    }
    fn primary_cancel(&mut self) {
        self.0.lock().cancels += 1;
    }
    fn dma_complete(&mut self) {
        self.0.lock().dma_completions += 1;
    }
    fn set_secondary_running(&mut self, running: bool) {
        self.0.lock().running.push(running);
    }
}

fn with_lines() -> (Aica, Lines) {
    let lines = Lines::default();
    let aica = Aica::new(AicaConfig::default(), Host::new().with_lines(lines.clone()));
    (aica, lines)
}

fn word(aica: &mut Aica, addr: u32, value: u32) {
    aica.write(addr, value, AccessSize::Word);
}

#[test]
fn test_timer_overflow_drives_primary_line_on_edges() {
    let (mut aica, lines) = with_lines();
    word(&mut aica, 0x28B4, 1 << 6);
    word(&mut aica, 0x2890, 0x00FE);

    aica.time_step();
    assert_eq!(lines.0.lock().raises, 0);
    aica.time_step();
    aica.time_step();
    {
        let log = lines.0.lock();
        assert_eq!(log.raises, 1);
        assert_eq!(log.cancels, 0);
    }
    assert!(aica.interrupts().primary_asserted());

    word(&mut aica, 0x28BC, 1 << 6);
    assert_eq!(lines.0.lock().cancels, 1);
    assert!(!aica.interrupts().primary_asserted());
    assert_eq!(aica.registers().read16(0x28B8) & (1 << 6), 0);
}

#[test]
fn test_secondary_level_from_bit_planes() {
    let (mut aica, lines) = with_lines();
    word(&mut aica, 0x289C, 1 << 6);
    // timer A at level 0b101
    word(&mut aica, 0x28A8, 1 << 6);
    word(&mut aica, 0x28B0, 1 << 6);
    word(&mut aica, 0x2890, 0x00FF);

    aica.time_step();
    assert_eq!(lines.0.lock().secondary.last(), Some(&(true, 5)));
    assert_eq!(aica.read(0x2D00, AccessSize::Byte), 5);

    word(&mut aica, 0x28A4, 1 << 6);
    assert_eq!(lines.0.lock().secondary.last(), Some(&(false, 0)));
    assert_eq!(aica.read(0x2D00, AccessSize::Byte), 0);
}

#[test]
fn test_sample_interrupt_only_in_secondary_view() {
    let (mut aica, _lines) = with_lines();
    aica.time_step();
    assert_eq!(aica.registers().read16(0x28A0) & (1 << 10), 1 << 10);
    assert_eq!(aica.registers().read16(0x28B8) & (1 << 10), 0);
}

#[test]
fn test_timer_period_follows_mode_bits() {
    let (mut aica, _lines) = with_lines();
    word(&mut aica, 0x2894, (2 << 8) | 0xFF);

    for _ in 0..3 {
        aica.time_step();
    }
    assert_eq!(aica.registers().read16(0x28B8) & (1 << 7), 0);
    assert_eq!(aica.read(0x2894, AccessSize::Byte), 0xFF);

    aica.time_step();
    assert_eq!(aica.registers().read16(0x28B8) & (1 << 7), 1 << 7);
    assert_eq!(aica.registers().read16(0x28A0) & (1 << 7), 1 << 7);
    assert_eq!(aica.read(0x2894, AccessSize::Byte), 0);
}

#[test]
fn test_cpu_control_word_acts_like_two_bytes() {
    let (mut aica, lines) = with_lines();

    word(&mut aica, 0x2C00, 0x5A01);
    assert_eq!(lines.0.lock().running, vec![false]);
    assert_eq!(aica.read(0x2C01, AccessSize::Byte), 0x5A);
    assert!(!aica.secondary_running());

    aica.write(0x2C00, 0xFE, AccessSize::Byte);
    assert_eq!(lines.0.lock().running, vec![false, true]);
    assert_eq!(aica.read(0x2C00, AccessSize::Word), 0x5A00);
    assert!(aica.secondary_running());

    aica.write(0x2C01, 0x00, AccessSize::Byte);
    assert_eq!(lines.0.lock().running.len(), 2);
}

#[derive(Clone)]
struct SharedMemory(Arc<Mutex<Vec<u8>>>);

impl SystemMemory for SharedMemory {
    fn read_block(&mut self, addr: u32, out: &mut [u8]) -> aica::Result<()> {
        let data = self.0.lock();
        out.copy_from_slice(&data[addr as usize..addr as usize + out.len()]);
        Ok(())
    }

    fn write_block(&mut self, addr: u32, data: &[u8]) -> aica::Result<()> {
        self.0.lock()[addr as usize..addr as usize + data.len()].copy_from_slice(data);
        Ok(())
    }
}

fn with_memory(config: AicaConfig) -> (Aica, Lines, SharedMemory) {
    let lines = Lines::default();
    let memory = SharedMemory(Arc::new(Mutex::new((0..=255u8).cycle().take(4096).collect())));
    let host = Host::new()
        .with_lines(lines.clone())
        .with_memory(memory.clone());
    (Aica::new(config, host), lines, memory)
}

#[test]
fn test_dma_copies_and_completes_after_delay() {
    let (mut aica, lines, _memory) = with_memory(AicaConfig::default());
    aica.write_dma(ADSTAG as u32, 0x2000);
    aica.write_dma(ADSTAR as u32, 0x100);
    aica.write_dma(ADLEN as u32, 0x8000_0040);
    aica.write_dma(ADDIR as u32, 0);
    aica.write_dma(ADEN as u32, 1);
    aica.write_dma(ADST as u32, 1);

    for i in 0..64 {
        assert_eq!(aica.ram().read8(0x2000 + i), i as u8);
    }
    assert_eq!(aica.read_dma(ADST as u32), 1);
    assert_eq!(aica.read_dma(ADEN as u32), 1);
    assert_eq!(aica.read_dma(ADLEN as u32), 0);
    assert_eq!(aica.read_dma(ADSTAG as u32), 0x2040);
    assert_eq!(aica.read_dma(ADSTAR as u32), 0x140);
    assert_eq!(aica.dma().pending_cycles(), 195_313);

    aica.periodical(100_000);
    assert_eq!(lines.0.lock().dma_completions, 0);
    assert_eq!(aica.read_dma(ADST as u32), 1);

    aica.periodical(95_313);
    assert_eq!(lines.0.lock().dma_completions, 1);
    assert_eq!(aica.read_dma(ADST as u32), 0);

    aica.periodical(1_000_000);
    assert_eq!(lines.0.lock().dma_completions, 1);
}

#[test]
fn test_dma_needs_enable_and_can_run_in_reverse() {
    let config = AicaConfig {
        dma_busy_until_complete: false,
        ..Default::default()
    };
    let (mut aica, _lines, memory) = with_memory(config);
    aica.ram_mut().load(0x400, &[0xAA; 16]);

    aica.write_dma(ADSTAG as u32, 0x400);
    aica.write_dma(ADSTAR as u32, 0x800);
    aica.write_dma(ADLEN as u32, 16);
    aica.write_dma(ADDIR as u32, 1);
    aica.write_dma(ADST as u32, 1);
    assert!(!aica.dma().in_flight());
    assert_eq!(memory.0.lock()[0x800], 0);

    aica.write_dma(ADEN as u32, 1);
    aica.write_dma(ADST as u32, 1);
    assert!(aica.dma().in_flight());
    assert_eq!(aica.read_dma(ADST as u32), 0);
    assert_eq!(aica.read_dma(ADEN as u32), 0);
    assert!(memory.0.lock()[0x800..0x810].iter().all(|&b| b == 0xAA));
}

#[test]
fn test_rtc_write_protocol() {
    let (mut aica, _lines) = with_lines();
    let now = (aica.read_rtc(0) << 16) | aica.read_rtc(4);
    assert!(now > EPOCH_OFFSET);

    aica.write_rtc(4, 0x1234);
    assert_eq!(aica.read_rtc(4), now & 0xFFFF);

    aica.write_rtc(8, 1);
    aica.write_rtc(4, 0x1234);
    aica.write_rtc(0, 0x0042);
    assert_eq!(aica.rtc().value(), 0x0042_1234);

    aica.write_rtc(0, 0x0099);
    assert_eq!(aica.read_rtc(0), 0x0042);
    assert_eq!(aica.read_rtc(8), 0);
}

#[derive(Debug, Default)]
struct EffectsLog {
    written: Vec<usize>,
    ring: Vec<(u32, u32)>,
    inputs: Vec<i32>,
}

#[derive(Clone, Default)]
struct Effects(Arc<Mutex<EffectsLog>>);

impl EffectsProcessor for Effects {
    fn register_written(&mut self, offset: usize, _dsp_regs: &[u8]) {
        self.0.lock().written.push(offset);
    }

    fn ring_buffer_changed(&mut self, base: u32, length_mask: u32) {
        self.0.lock().ring.push((base, length_mask));
    }

    fn step(&mut self, inputs: &[i32; EFFECT_BUSES], dsp_regs: &mut [u8], _ram: &mut SoundRam) {
        self.0.lock().inputs.push(inputs[2]);
        dsp_regs[0x1580..0x1582].copy_from_slice(&500i16.to_le_bytes());
    }
}

#[test]
fn test_effects_hooks_and_returns() {
    let effects = Effects::default();
    let config = AicaConfig {
        effects_enabled: true,
        ..Default::default()
    };
    let mut aica = Aica::new(config, Host::new().with_effects(effects.clone()));
    aica.ram_mut().load_pcm16(0x1000, &[0, 1000, 2000, 3000]);

    word(&mut aica, 0x2804, (2 << 13) | 3);
    assert_eq!(effects.0.lock().ring.last(), Some(&(3 * 2048, 32 * 1024 - 1)));

    word(&mut aica, 0x3010, 0xBEEF);
    assert_eq!(effects.0.lock().written, vec![0x10, 0x11]);

    word(&mut aica, 0x2800, 0x000F);
    // effect return 0 at full level, centered
    word(&mut aica, 0x2000, 0x0F00);
    // voice on bus 2, full dry and full send
    word(&mut aica, 0x04, 0x1000);
    word(&mut aica, 0x0C, 100);
    word(&mut aica, 0x10, 0x001F);
    word(&mut aica, 0x20, 0x00F2);
    word(&mut aica, 0x24, 0x0F00);
    word(&mut aica, 0x00, 0xC000);

    aica.time_step();
    assert_eq!(aica.last_frame(), [500, 500]);
    aica.time_step();
    assert_eq!(aica.last_frame(), [1500, 1500]);
    aica.time_step();
    assert_eq!(aica.last_frame(), [2500, 2500]);

    assert_eq!(effects.0.lock().inputs, vec![0, 1000, 2000]);
}

#[derive(Clone, Copy)]
struct Constant(i16, i16);

impl CddaSource for Constant {
    fn read_sector(&mut self, sector: &mut [i16; CDDA_SECTOR_SAMPLES]) {
        for pair in sector.chunks_mut(2) {
            pair[0] = self.0;
            pair[1] = self.1;
        }
    }
}

#[test]
fn test_cdda_panned_through_its_effect_outputs() {
    let host = Host::new().with_cdda(Constant(1000, -1000));
    let mut aica = Aica::new(AicaConfig::default(), host);
    word(&mut aica, 0x2800, 0x000F);
    aica.time_step();
    assert_eq!(aica.last_frame(), [0, 0]);

    word(&mut aica, 0x2040, 0x0F1F);
    word(&mut aica, 0x2044, 0x0F0F);
    aica.time_step();
    assert_eq!(aica.last_frame(), [1000, -1000]);

    aica.set_config(AicaConfig {
        cdda_mute: true,
        ..Default::default()
    });
    aica.time_step();
    assert_eq!(aica.last_frame(), [0, 0]);
}

#[cfg(feature = "streaming")]
#[test]
fn test_frame_queue_as_audio_sink() {
    let queue = aica::FrameQueue::with_frames(2048).unwrap();
    let mut aica = Aica::new(AicaConfig::default(), Host::new().with_audio(queue.clone()));

    for _ in 0..1000 {
        aica.time_step();
    }
    assert_eq!(queue.available_read(), 512 * 2);

    aica.flush_output();
    assert_eq!(queue.available_read(), 1000 * 2);
    let mut out = vec![1i16; 2000];
    assert_eq!(queue.pop(&mut out), 2000);
    assert!(out.iter().all(|&s| s == 0));
}
