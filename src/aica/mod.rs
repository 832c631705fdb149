//! AICA Sound Unit
//!
//! The context object for one emulated sound unit. It owns the register
//! window, sound RAM, the 64 voices, timers, interrupt state, the output
//! stage and the host collaborators, and exposes the operations a host
//! scheduler drives:
//!
//! - [`Aica::time_step`] once per output sample (timers, interrupts and,
//!   in per-sample mode, the full mix)
//! - [`Aica::update`] for batched 32-sample mixing
//! - [`Aica::periodical`] with elapsed bus cycles for deferred DMA completion
//! - [`Aica::read`]/[`Aica::write`] for byte and word register access
//!
//! # Example
//! ```
//! use aica::{AccessSize, Aica, AicaConfig, Host};
//!
//! let mut aica = Aica::new(AicaConfig::default(), Host::new());
//! aica.write(0x2800, 0x000F, AccessSize::Word); // MVOL = 15
//! for _ in 0..44_100 {
//!     aica.time_step();
//! }
//! assert_eq!(aica.last_frame(), [0, 0]);
//! ```

mod dma;
mod io;
mod rtc;

pub use dma::{G2Dma, ADDIR, ADEN, ADLEN, ADST, ADSTAG, ADSTAR, DMA_CHUNK};
pub use io::AccessSize;
pub use rtc::{Rtc, EPOCH_OFFSET};

use crate::config::{AicaConfig, MixingMode};
use crate::host::{Host, EFFECT_BUSES};
use crate::interrupt::{InterruptController, InterruptFlags};
use crate::mixer::{CddaInput, MasterSettings, OutputRing, StereoMix};
use crate::ram::SoundRam;
use crate::registers::common::SCIPD;
use crate::registers::{RegisterFile, CHANNEL_COUNT};
use crate::timer::{Timer, TimerId};
use crate::voice::{Channel, VoiceEngine};

/// Samples per channel in one batched update
pub const BATCH_SAMPLES: usize = 32;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 44_100;

/// One emulated sound unit
pub struct Aica {
    config: AicaConfig,
    regs: RegisterFile,
    ram: SoundRam,
    voices: VoiceEngine,
    timers: [Timer; 3],
    interrupts: InterruptController,
    dma: G2Dma,
    rtc: Rtc,
    cdda: CddaInput,
    output: OutputRing,
    effect_inputs: [i32; EFFECT_BUSES],
    host: Host,
}

impl Aica {
    /// Create a unit with 2 MiB of sound RAM
    pub fn new(config: AicaConfig, host: Host) -> Self {
        Self::with_ram(config, host, SoundRam::new())
    }

    /// Create a unit around an existing sound RAM
    pub fn with_ram(config: AicaConfig, host: Host, ram: SoundRam) -> Self {
        let mut aica = Aica {
            config,
            regs: RegisterFile::new(),
            ram,
            voices: VoiceEngine::new(),
            timers: TimerId::ALL.map(Timer::new),
            interrupts: InterruptController::new(),
            dma: G2Dma::new(),
            rtc: Rtc::new(),
            cdda: CddaInput::new(),
            output: OutputRing::default(),
            effect_inputs: [0; EFFECT_BUSES],
            host,
        };
        aica.init();
        aica
    }

    fn init(&mut self) {
        self.regs.clear();
        self.voices.init(&mut self.regs);
        for timer in &mut self.timers {
            timer.init(&self.regs);
        }
        self.interrupts.reset();
        self.dma.reset();
        self.cdda.reset();
        self.output.clear();
        self.effect_inputs = [0; EFFECT_BUSES];
    }

    /// Return to power-on register state
    ///
    /// Sound RAM survives a manual reset and is zeroed otherwise. Queued
    /// output frames are dropped.
    pub fn reset(&mut self, manual: bool) {
        log::debug!("AICA reset (manual: {})", manual);
        self.init();
        if !manual {
            self.ram.clear();
        }
    }

    /// Advance one output sample
    pub fn time_step(&mut self) {
        for i in 0..self.timers.len() {
            if self.timers[i].step(&mut self.regs) {
                let flag = self.timers[i].id().interrupt();
                self.interrupts.raise(&mut self.regs, flag);
            }
        }

        let pending = self.regs.read16(SCIPD) | InterruptFlags::SAMPLE.bits();
        self.regs.write16(SCIPD, pending);

        if self.config.mixing == MixingMode::PerSample {
            self.mix_sample();
        }

        self.interrupts.update(&mut self.regs, self.host.lines.as_mut());
    }

    fn mix_sample(&mut self) {
        let mut mix = StereoMix::default();
        self.effect_inputs = [0; EFFECT_BUSES];

        for ch in 0..CHANNEL_COUNT {
            let restart = self.config.zero_sustain_restarts_attack;
            if let Some(out) = self.voices.step_channel(ch, &mut self.regs, &self.ram, restart) {
                self.effect_inputs[out.bus] += out.effect;
                mix.add_voice(&out);
            }
        }

        self.mix_cdda(&mut mix);

        if self.config.effects_enabled {
            self.host
                .effects
                .step(&self.effect_inputs, self.regs.dsp_mut(), &mut self.ram);
            for i in 0..EFFECT_BUSES {
                let (level, pan) = self.regs.effect_out(i);
                mix.add_panned(self.regs.efreg(i) as i32, level, pan);
            }
        }

        if self.config.mute_output {
            return;
        }
        self.emit(mix);
    }

    fn mix_cdda(&mut self, mix: &mut StereoMix) {
        let (left, right) = self.cdda.next_frame(self.host.cdda.as_mut());
        if self.config.cdda_mute {
            return;
        }
        let (level, pan) = self.regs.effect_out(16);
        mix.add_panned(left, level, pan);
        let (level, pan) = self.regs.effect_out(17);
        mix.add_panned(right, level, pan);
    }

    fn emit(&mut self, mix: StereoMix) {
        let frame = MasterSettings::from_registers(&self.regs).apply(mix);
        self.output.push(frame, self.host.audio.as_mut());
    }

    /// Render [`BATCH_SAMPLES`] frames in batched mode
    ///
    /// Each channel produces its 32 samples in one pass. Effects returns are
    /// not mixed on this path. Does nothing in per-sample mode.
    pub fn update(&mut self) {
        if self.config.mixing != MixingMode::Batched {
            return;
        }

        let mut mixes = [StereoMix::default(); BATCH_SAMPLES];
        let restart = self.config.zero_sustain_restarts_attack;
        for ch in 0..CHANNEL_COUNT {
            for mix in mixes.iter_mut() {
                match self.voices.step_channel(ch, &mut self.regs, &self.ram, restart) {
                    Some(out) => mix.add_voice(&out),
                    None => break,
                }
            }
        }

        for mut mix in mixes {
            self.mix_cdda(&mut mix);
            self.emit(mix);
        }
    }

    /// Account for `cycles` elapsed bus cycles
    ///
    /// Delivers the DMA completion interrupt once its delay has run out.
    pub fn periodical(&mut self, cycles: u32) {
        let hold = self.config.dma_busy_until_complete;
        if self.dma.periodical(cycles, self.host.lines.as_mut(), hold) {
            log::debug!("DMA complete");
        }
    }

    /// Hand queued frames to the audio sink now
    pub fn flush_output(&mut self) {
        self.output.flush(self.host.audio.as_mut());
    }

    /// Last clipped stereo frame, `[left, right]`
    pub fn last_frame(&self) -> [i16; 2] {
        self.output.last_frame()
    }

    /// Frames waiting for the next sink batch
    pub fn pending_frames(&self) -> usize {
        self.output.pending()
    }

    /// Active configuration
    pub fn config(&self) -> &AicaConfig {
        &self.config
    }

    /// Change the configuration
    pub fn set_config(&mut self, config: AicaConfig) {
        self.config = config;
    }

    /// Raw register window
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Sound RAM
    pub fn ram(&self) -> &SoundRam {
        &self.ram
    }

    /// Mutable sound RAM, for loading sample data directly
    pub fn ram_mut(&mut self) -> &mut SoundRam {
        &mut self.ram
    }

    /// The voice engine
    pub fn voices(&self) -> &VoiceEngine {
        &self.voices
    }

    /// Channel `index`
    pub fn channel(&self, index: usize) -> &Channel {
        self.voices.channel(index)
    }

    /// Timer `id`
    pub fn timer(&self, id: TimerId) -> &Timer {
        &self.timers[id as usize]
    }

    /// Interrupt line bookkeeping
    pub fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// The DMA trigger registers
    pub fn dma(&self) -> &G2Dma {
        &self.dma
    }

    /// The real-time clock
    pub fn rtc(&self) -> &Rtc {
        &self.rtc
    }

    /// Host collaborators
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Mutable host collaborators
    pub fn host_mut(&mut self) -> &mut Host {
        &mut self.host
    }

    /// Flush pending output and give back the host collaborators
    pub fn into_host(mut self) -> Host {
        self.flush_output();
        self.host
    }
}

impl std::fmt::Debug for Aica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aica")
            .field("config", &self.config)
            .field("active_channels", &self.voices.active_count())
            .field("dma", &self.dma)
            .field("rtc", &self.rtc)
            .finish_non_exhaustive()
    }
}
