//! Pulse engine: the compare-interrupt state machine.
//!
//! One call to [`PulseEngine::step`] per compare interrupt. The engine
//! never touches hardware; it returns a [`Step`] naming the edges to drive
//! and the compare value for the interval that has just begun, so the
//! whole timing sequence can be replayed off-target.
//!
//! ```text
//!            budget not reached: wait min(remaining, max_compare)
//!               ┌──────┐
//!               ▼      │
//!   ┌───────────────────┐  budget reached, active   ┌────────────────────┐
//!   │      Idling       │ ────────────────────────▶ │ Driving{channel:0} │
//!   │                   │   rise, compare = pulse   │                    │
//!   └───────────────────┘ ◀──────────────────────── └────────────────────┘
//!             ▲             fall, compare = idle
//!             │
//!             └── budget reached, inactive: compare = idle
//! ```
//!
//! The cycle accumulator counts every tick scheduled since the start of the
//! current refresh period, so pulse plus idle intervals always add up to
//! exactly one budget.

use crate::channel::{ChannelState, PinId};
use crate::ticks::idle_chunk;

/// Channels serviced per refresh period.
pub const CHANNELS: u8 = 1;

/// Where the engine is within the refresh period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting out the rest of the period.
    Idling,
    /// A pulse on `channel` is in progress.
    Driving { channel: u8 },
}

/// Output of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Pin to drive low (end of a pulse).
    pub fall: Option<PinId>,
    /// Pin to drive high (start of a pulse).
    pub rise: Option<PinId>,
    /// Length of the interval that starts now.
    pub compare: u16,
}

impl Step {
    const fn wait(compare: u16) -> Self {
        Self {
            fall: None,
            rise: None,
            compare,
        }
    }
}

/// Interrupt-owned engine state.
#[derive(Debug, Clone)]
pub struct PulseEngine {
    phase: Phase,
    /// Ticks scheduled so far in the current period.
    cycle_ticks: u32,
    /// Ticks per refresh period.
    budget: u32,
    max_compare: u16,
}

impl PulseEngine {
    pub const fn new(budget: u32, max_compare: u16) -> Self {
        Self {
            phase: Phase::Idling,
            cycle_ticks: 0,
            budget,
            max_compare,
        }
    }

    /// Back to the start of an idle period.
    pub fn reset(&mut self) {
        self.phase = Phase::Idling;
        self.cycle_ticks = 0;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycle_ticks(&self) -> u32 {
        self.cycle_ticks
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Advance by one compare interrupt.
    ///
    /// `pulse_ticks` is read once per call; a change lands on the next pulse
    /// start, never mid-pulse.
    pub fn step(&mut self, channel: &ChannelState, pulse_ticks: u16) -> Step {
        let mut fall = None;

        let next = match self.phase {
            Phase::Idling => {
                if self.cycle_ticks < self.budget {
                    return Step::wait(self.schedule_idle());
                }
                self.cycle_ticks = 0;
                0
            }
            Phase::Driving { channel: index } => {
                if channel.active {
                    fall = Some(channel.pin);
                }
                index + 1
            }
        };

        if next < CHANNELS && channel.active {
            self.phase = Phase::Driving { channel: next };
            self.cycle_ticks += u32::from(pulse_ticks);
            return Step {
                fall,
                rise: Some(channel.pin),
                compare: pulse_ticks,
            };
        }

        self.phase = Phase::Idling;
        Step {
            fall,
            rise: None,
            compare: self.schedule_idle(),
        }
    }

    fn schedule_idle(&mut self) -> u16 {
        let chunk = idle_chunk(self.budget.saturating_sub(self.cycle_ticks), self.max_compare);
        self.cycle_ticks += u32::from(chunk);
        chunk
    }
}
