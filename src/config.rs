//! Clock and timing configuration
//!
//! Resolved once at initialisation and handed to the driver, so the same
//! engine runs (and is tested) under both clock regimes without rebuilding.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ticks;

/// CPU frequency above which the timer runs on CPU/2.
pub const DIVIDED_REGIME_ABOVE_HZ: u32 = 10_000_000;

/// ISR latency trim with the timer on CPU/2 (ticks).
pub const TRIM_TICKS_DIVIDED: u16 = 51;
/// ISR latency trim with the timer on CPU/1 (ticks).
pub const TRIM_TICKS_DIRECT: u16 = 102;

/// Timer clock source relative to the CPU clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockRegime {
    /// Timer clocked at CPU/2; one tick is two CPU cycles.
    Divided,
    /// Timer clocked at CPU/1.
    Direct,
}

/// CPU clock profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// CPU frequency in Hz.
    pub cpu_hz: u32,
    /// Timer clock divider selected for this frequency.
    pub regime: ClockRegime,
    /// Whole CPU cycles per microsecond.
    pub cycles_per_us: u32,
    /// Ticks subtracted from every pulse to absorb interrupt latency.
    pub trim_ticks: u16,
}

impl ClockConfig {
    /// Derive the regime, cycle ratio and trim for a CPU frequency.
    pub const fn from_cpu_hz(cpu_hz: u32) -> Result<Self> {
        let cycles_per_us = cpu_hz / 1_000_000;
        if cycles_per_us == 0 {
            return Err(Error::InvalidClock(cpu_hz));
        }

        let (regime, trim_ticks) = if cpu_hz > DIVIDED_REGIME_ABOVE_HZ {
            (ClockRegime::Divided, TRIM_TICKS_DIVIDED)
        } else {
            (ClockRegime::Direct, TRIM_TICKS_DIRECT)
        };

        Ok(Self {
            cpu_hz,
            regime,
            cycles_per_us,
            trim_ticks,
        })
    }

    /// Replace the latency trim with a value measured on the target board.
    pub const fn with_trim(mut self, trim_ticks: u16) -> Self {
        self.trim_ticks = trim_ticks;
        self
    }

    /// Frequency the timer actually counts at.
    pub const fn timer_hz(&self) -> u32 {
        match self.regime {
            ClockRegime::Divided => self.cpu_hz / 2,
            ClockRegime::Direct => self.cpu_hz,
        }
    }
}

/// Servo signal timing, all in microseconds except `max_compare`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServoTiming {
    /// Refresh period: one pulse per channel per period.
    pub refresh_us: u32,
    /// Pulse emitted after attach until the first write.
    pub default_pulse_us: u16,
    /// Nominal pulse for 0 degrees; attach bounds are offsets from this.
    pub min_pulse_us: u16,
    /// Nominal pulse for 180 degrees.
    pub max_pulse_us: u16,
    /// Largest interval one compare register write can schedule.
    pub max_compare: u16,
}

impl ServoTiming {
    /// Standard hobby servo on a 16-bit timer.
    pub const STANDARD: Self = Self {
        refresh_us: 20_000,
        default_pulse_us: 1_500,
        min_pulse_us: 544,
        max_pulse_us: 2_400,
        max_compare: u16::MAX,
    };

    /// Check that every pulse in `min_us..=max_us` can be emitted as a
    /// single compare interval inside one refresh period.
    pub fn check_bounds(&self, clock: &ClockConfig, min_us: u16, max_us: u16) -> Result<()> {
        let bad = Error::InvalidPulseRange { min_us, max_us };
        if min_us >= max_us {
            return Err(bad);
        }

        let lo = ticks::ticks_from_micros(clock, u32::from(min_us));
        let hi = ticks::ticks_from_micros(clock, u32::from(max_us));

        if lo <= u32::from(clock.trim_ticks) || hi > u32::from(self.max_compare) {
            return Err(bad);
        }
        if hi >= ticks::refresh_budget(clock, self) {
            return Err(bad);
        }
        Ok(())
    }

    /// Validate the profile against a clock.
    pub fn validate(&self, clock: &ClockConfig) -> Result<()> {
        if self.max_compare == 0 {
            return Err(Error::InvalidTiming("max_compare must be non-zero"));
        }
        if self.default_pulse_us < self.min_pulse_us || self.default_pulse_us > self.max_pulse_us {
            return Err(Error::InvalidTiming("default pulse outside nominal range"));
        }
        self.check_bounds(clock, self.min_pulse_us, self.max_pulse_us)
            .map_err(|_| Error::InvalidTiming("nominal pulse range not representable"))
    }
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self::STANDARD
    }
}
