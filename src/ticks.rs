//! Microsecond ↔ timer tick conversion.
//!
//! Pure integer arithmetic so the value that sizes the refresh budget and
//! the value used per pulse can never disagree.

use crate::config::{ClockConfig, ClockRegime, ServoTiming};

/// Timer ticks spanning `us` microseconds.
///
/// In the divided regime the microsecond count is halved first, matching the
/// CPU/2 timer clock; odd microseconds round down.
pub const fn ticks_from_micros(clock: &ClockConfig, us: u32) -> u32 {
    match clock.regime {
        ClockRegime::Divided => (us / 2).saturating_mul(clock.cycles_per_us),
        ClockRegime::Direct => us.saturating_mul(clock.cycles_per_us),
    }
}

/// Microseconds spanned by `ticks`, rounded down to the converter's grain.
pub const fn micros_from_ticks(clock: &ClockConfig, ticks: u32) -> u32 {
    match clock.regime {
        ClockRegime::Divided => (ticks / clock.cycles_per_us).saturating_mul(2),
        ClockRegime::Direct => ticks / clock.cycles_per_us,
    }
}

/// Ticks in one refresh period.
pub const fn refresh_budget(clock: &ClockConfig, timing: &ServoTiming) -> u32 {
    ticks_from_micros(clock, timing.refresh_us)
}

/// Compare value for a pulse of `us`, latency trim applied.
///
/// Callers range-check `us` first; the result saturates rather than wraps.
pub const fn pulse_ticks(clock: &ClockConfig, us: u16) -> u16 {
    saturate(ticks_from_micros(clock, us as u32).saturating_sub(clock.trim_ticks as u32))
}

/// Compare value loaded before the first write: the default pulse, untrimmed.
pub const fn default_ticks(clock: &ClockConfig, timing: &ServoTiming) -> u16 {
    saturate(ticks_from_micros(clock, timing.default_pulse_us as u32))
}

const fn saturate(ticks: u32) -> u16 {
    if ticks > u16::MAX as u32 {
        u16::MAX
    } else {
        ticks as u16
    }
}

/// Next idle interval: what is left of the period, capped to one compare.
pub const fn idle_chunk(remaining: u32, max_compare: u16) -> u16 {
    if remaining > max_compare as u32 {
        max_compare
    } else {
        remaining as u16
    }
}
