//! Envelope Generators
//!
//! The amplitude envelope is a four-state machine over a 10-bit attenuation
//! (0 = loudest, 0x3FF = silent) accumulated with 16 fractional bits. The
//! filter envelope keeps the same state shape and its register parameters,
//! but does not yet shape the output.

use crate::tables::{ENVELOPE_MAX, ENVELOPE_STEP_BITS};
use num_derive::FromPrimitive;

/// Envelope state, numbered as reported in the SGC status field
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum EnvelopeState {
    /// Ramping toward full volume
    Attack = 0,
    /// Falling toward the decay level
    Decay1 = 1,
    /// Sustain slope toward silence
    Decay2 = 2,
    /// Key released, falling toward silence
    Release = 3,
}

/// Effective rates for each state, already converted to steps per sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeRates {
    /// Attack steps per sample
    pub attack: u32,
    /// Decay 1 steps per sample
    pub decay1: u32,
    /// Level at which decay 1 hands over to decay 2
    pub decay_level: u32,
    /// Decay 2 steps per sample
    pub decay2: u32,
    /// Release steps per sample
    pub release: u32,
}

/// What an envelope step asks of its channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeEvent {
    /// Nothing beyond the level change
    None,
    /// State changed
    Enter(EnvelopeState),
    /// Release reached silence; the channel must stop
    Finished,
}

/// Amplitude envelope generator
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeEnvelope {
    value: i32,
    state: EnvelopeState,
    /// Current rates
    pub rates: EnvelopeRates,
}

impl AmplitudeEnvelope {
    /// Silent envelope in release
    pub fn new() -> Self {
        AmplitudeEnvelope {
            value: (ENVELOPE_MAX << ENVELOPE_STEP_BITS) as i32,
            state: EnvelopeState::Release,
            rates: EnvelopeRates::default(),
        }
    }

    /// Current 10-bit attenuation
    #[inline]
    pub fn level(&self) -> u32 {
        (self.value >> ENVELOPE_STEP_BITS) as u32
    }

    /// Set the 10-bit attenuation
    pub fn set_level(&mut self, level: u32) {
        self.value = (level.min(ENVELOPE_MAX) << ENVELOPE_STEP_BITS) as i32;
    }

    /// Current state
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Force a state
    pub fn set_state(&mut self, state: EnvelopeState) {
        self.state = state;
    }

    /// Advance one sample
    ///
    /// `hold_attack` keeps the envelope in attack at full volume (loop start
    /// link); `zero_level_restarts` selects the compatibility branch where a
    /// zero decay level sends decay 1 back to attack.
    pub fn step(&mut self, hold_attack: bool, zero_level_restarts: bool) -> EnvelopeEvent {
        let max = (ENVELOPE_MAX << ENVELOPE_STEP_BITS) as i32;
        match self.state {
            EnvelopeState::Attack => {
                self.value -= self.rates.attack as i32;
                if self.value >> ENVELOPE_STEP_BITS <= 0 {
                    self.value = 0;
                    if !hold_attack {
                        self.state = EnvelopeState::Decay1;
                        return EnvelopeEvent::Enter(EnvelopeState::Decay1);
                    }
                }
                EnvelopeEvent::None
            }
            EnvelopeState::Decay1 => {
                self.value = (self.value + self.rates.decay1 as i32).min(max);
                if self.level() >= self.rates.decay_level {
                    let next = if zero_level_restarts && self.rates.decay_level == 0 {
                        EnvelopeState::Attack
                    } else {
                        EnvelopeState::Decay2
                    };
                    self.state = next;
                    return EnvelopeEvent::Enter(next);
                }
                EnvelopeEvent::None
            }
            EnvelopeState::Decay2 => {
                self.value += self.rates.decay2 as i32;
                if self.value >= max {
                    self.value = max;
                    self.state = EnvelopeState::Release;
                    return EnvelopeEvent::Enter(EnvelopeState::Release);
                }
                EnvelopeEvent::None
            }
            EnvelopeState::Release => {
                self.value += self.rates.release as i32;
                if self.value >= max {
                    self.value = max;
                    return EnvelopeEvent::Finished;
                }
                EnvelopeEvent::None
            }
        }
    }
}

impl Default for AmplitudeEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

/// Filter envelope parameters, as last written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Resonance
    pub q: u32,
    /// Cutoff levels FLV0..FLV4
    pub levels: [u32; 5],
    /// Attack rate
    pub attack: u32,
    /// Decay 1 rate
    pub decay1: u32,
    /// Decay 2 rate
    pub decay2: u32,
    /// Release rate
    pub release: u32,
}

/// Filter envelope generator
///
/// Tracks state transitions driven by key events; stepping leaves the
/// cutoff untouched.
#[derive(Debug, Clone, Copy)]
pub struct FilterEnvelope {
    state: EnvelopeState,
    /// Register parameters
    pub params: FilterParams,
}

impl FilterEnvelope {
    /// Released filter envelope
    pub fn new() -> Self {
        FilterEnvelope {
            state: EnvelopeState::Release,
            params: FilterParams::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Force a state
    pub fn set_state(&mut self, state: EnvelopeState) {
        self.state = state;
    }

    /// Current cutoff level (FLV of the active stage)
    pub fn level(&self) -> u32 {
        match self.state {
            EnvelopeState::Attack => self.params.levels[0],
            EnvelopeState::Decay1 => self.params.levels[1],
            EnvelopeState::Decay2 => self.params.levels[2],
            EnvelopeState::Release => self.params.levels[4],
        }
    }

    /// Advance one sample
    #[inline]
    pub fn step(&mut self) {}
}

impl Default for FilterEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
