//! Port traits: the boundary between the pulse engine and the hardware.
//!
//! ```text
//!   Board adapter ──▶ Port trait ──▶ ServoDriver (engine + façade)
//! ```
//!
//! Register-level adapters (a tinyAVR TCB, an ESP-IDF GPTimer, the host
//! simulation) implement these traits. The driver consumes them via
//! generics, so the engine never touches a register directly.
//!
//! Every method is an unconditional register write: nothing here can fail,
//! and nothing here may block. `GpioPort` and `CompareTimer` methods are
//! called from interrupt context.

use crate::channel::PinId;
use crate::config::ClockRegime;

// ───────────────────────────────────────────────────────────────
// Pin resolution
// ───────────────────────────────────────────────────────────────

/// Board pin numbering → port/bitmask lookup.
pub trait PinMap {
    /// Port index for `pin`, or `None` if it is not a GPIO.
    fn port_of(&self, pin: u8) -> Option<u8>;

    /// Bit within the port for `pin`, or `None` if it is not a GPIO.
    fn bitmask_of(&self, pin: u8) -> Option<u8>;

    /// Both halves, or `None` if either lookup fails.
    fn resolve(&self, pin: u8) -> Option<PinId> {
        let bitmask = self.bitmask_of(pin)?;
        let port = self.port_of(pin)?;
        Some(PinId { port, bitmask })
    }
}

// ───────────────────────────────────────────────────────────────
// GPIO
// ───────────────────────────────────────────────────────────────

/// Output-side GPIO register access (DIRSET / OUTSET / OUTCLR).
pub trait GpioPort {
    /// Make the pin an output.
    fn set_output(&mut self, pin: PinId);

    /// Drive the pin high.
    fn set_high(&mut self, pin: PinId);

    /// Drive the pin low.
    fn set_low(&mut self, pin: PinId);
}

// ───────────────────────────────────────────────────────────────
// Compare timer
// ───────────────────────────────────────────────────────────────

/// A timer in periodic-interrupt mode: counts to the compare value, raises
/// the compare interrupt, restarts from zero.
///
/// A compare value written from inside the interrupt handler sets the
/// length of the interval that has just begun.
pub trait CompareTimer {
    /// Select the clock divider for `regime`.
    fn select_clock(&mut self, regime: ClockRegime);

    /// Put the counter in periodic-interrupt mode.
    fn set_periodic_mode(&mut self);

    /// Program the compare register.
    fn set_compare(&mut self, ticks: u16);

    /// Unmask the compare-match interrupt.
    fn enable_interrupt(&mut self);

    /// Mask the compare-match interrupt.
    fn disable_interrupt(&mut self);

    /// Acknowledge a pending compare-match interrupt.
    fn clear_interrupt(&mut self);

    /// Start counting.
    fn enable(&mut self);
}
