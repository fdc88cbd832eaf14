//! Compare-timer bring-up and teardown.
//!
//! Plain register sequencing over [`CompareTimer`]; nothing here can fail.

use crate::config::ClockRegime;
use crate::ports::CompareTimer;

/// Compare value loaded at start. Arbitrary: the first interrupt
/// reprograms it.
pub const INITIAL_COMPARE: u16 = 0x8000;

/// Start the timer in periodic-interrupt mode.
///
/// Clock select goes first since it rewrites the control register (and
/// with it the enable bit); the timer is enabled last, once the compare
/// value and interrupt are in place.
pub fn start<T: CompareTimer>(timer: &mut T, regime: ClockRegime) {
    timer.select_clock(regime);
    timer.set_periodic_mode();
    timer.set_compare(INITIAL_COMPARE);
    timer.enable_interrupt();
    timer.enable();
}

/// Mask the compare interrupt. The counter may keep running; with the
/// interrupt masked nothing drives the pin. Safe on a never-started timer.
pub fn stop<T: CompareTimer>(timer: &mut T) {
    timer.disable_interrupt();
}
