//! Servo façade: attach / detach / write.
//!
//! Translates angles into pulse ticks and publishes them to the driver.
//! Bounds are stored the compact way hobby-servo libraries do: as signed
//! offsets from the nominal 544/2400 us limits in 4 us units, so a
//! requested bound is quantised to the nearest 4 us step toward nominal.

use log::{debug, warn};

use crate::driver::ServoDriver;
use crate::error::{Error, Result};
use crate::ports::{CompareTimer, GpioPort, PinMap};
use crate::ticks;

/// Largest angle `write` accepts; anything above is clamped.
pub const MAX_ANGLE: u8 = 180;

/// Granularity of stored pulse bounds (microseconds).
const BOUND_STEP_US: i32 = 4;

/// Integer linear map of `x` from `[in_min, in_max]` onto
/// `[out_min, out_max]`, truncating toward zero.
pub fn map_range(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Clamp `x` to `[lo, hi]`.
pub fn constrain(x: i32, lo: i32, hi: i32) -> i32 {
    x.max(lo).min(hi)
}

pub struct Servo<'d, T, G, M>
where
    T: CompareTimer,
    G: GpioPort,
    M: PinMap,
{
    driver: &'d ServoDriver<T, G, M>,
    pin: u8,
    /// (nominal_min - min) / 4
    min_offset: i8,
    /// (nominal_max - max) / 4
    max_offset: i8,
    /// Last commanded pulse, trim applied.
    ticks: u16,
    active: bool,
}

impl<'d, T, G, M> Servo<'d, T, G, M>
where
    T: CompareTimer,
    G: GpioPort,
    M: PinMap,
{
    /// A detached servo commanding the default mid-range pulse.
    pub fn new(driver: &'d ServoDriver<T, G, M>) -> Self {
        Self {
            driver,
            pin: 0,
            min_offset: 0,
            max_offset: 0,
            ticks: ticks::default_ticks(driver.clock(), driver.timing()),
            active: false,
        }
    }

    /// Attach with the nominal 544..=2400 us range.
    pub fn attach(&mut self, pin: u8) -> Result<()> {
        let timing = self.driver.timing();
        self.attach_with_bounds(pin, timing.min_pulse_us, timing.max_pulse_us)
    }

    /// Attach `pin`, mapping 0..=180 degrees onto `min_us..=max_us`.
    ///
    /// Fails without touching the hardware if the pin is not a GPIO, the
    /// bounds cannot be represented, or another servo owns the channel.
    /// Re-attaching an attached servo reconfigures it in place.
    pub fn attach_with_bounds(&mut self, pin: u8, min_us: u16, max_us: u16) -> Result<()> {
        let Some(id) = self.driver.resolve(pin) else {
            warn!("servo: pin {} is not a GPIO", pin);
            return Err(Error::InvalidPin(pin));
        };

        let timing = *self.driver.timing();
        let bad = Error::InvalidPulseRange { min_us, max_us };
        let min_offset = bound_offset(timing.min_pulse_us, min_us).ok_or(bad)?;
        let max_offset = bound_offset(timing.max_pulse_us, max_us).ok_or(bad)?;
        let lo = bound_us(timing.min_pulse_us, min_offset);
        let hi = bound_us(timing.max_pulse_us, max_offset);
        let clock = self.driver.clock();
        timing.check_bounds(clock, lo, hi).map_err(|_| bad)?;

        // The last command may lie outside the new bounds.
        let ticks = self
            .ticks
            .clamp(ticks::pulse_ticks(clock, lo), ticks::pulse_ticks(clock, hi));
        self.driver.connect(id, ticks, self.active)?;

        self.ticks = ticks;
        self.pin = pin;
        self.min_offset = min_offset;
        self.max_offset = max_offset;
        self.active = true;
        debug!("servo: pin {} attached, {}..={}us", pin, lo, hi);
        Ok(())
    }

    /// Stop pulsing and release the channel. No-op when not attached.
    pub fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.driver.disconnect();
        debug!("servo: pin {} detached", self.pin);
    }

    /// Command an angle in degrees; above 180 is clamped. No-op when not
    /// attached. Takes effect at the start of the next refresh period.
    pub fn write(&mut self, angle: u8) {
        if !self.active {
            return;
        }
        let angle = angle.min(MAX_ANGLE);
        let (lo, hi) = (i32::from(self.min_us()), i32::from(self.max_us()));
        let us = constrain(map_range(i32::from(angle), 0, i32::from(MAX_ANGLE), lo, hi), lo, hi);
        self.publish(us as u16);
    }

    /// Command a pulse width directly, clamped to the attach bounds.
    /// No-op when not attached.
    pub fn write_micros(&mut self, us: u16) {
        if !self.active {
            return;
        }
        self.publish(us.clamp(self.min_us(), self.max_us()));
    }

    /// Last commanded pulse width in microseconds (trim added back).
    pub fn read_micros(&self) -> u16 {
        let clock = self.driver.clock();
        let raw = u32::from(self.ticks) + u32::from(clock.trim_ticks);
        ticks::micros_from_ticks(clock, raw) as u16
    }

    /// Last commanded angle, recovered from the pulse width.
    pub fn read(&self) -> u8 {
        let (lo, hi) = (i32::from(self.min_us()), i32::from(self.max_us()));
        // +1 us undoes the truncation of the forward map.
        let angle = map_range(i32::from(self.read_micros()) + 1, lo, hi, 0, i32::from(MAX_ANGLE));
        constrain(angle, 0, i32::from(MAX_ANGLE)) as u8
    }

    pub fn attached(&self) -> bool {
        self.active
    }

    /// Pin passed to the last successful attach.
    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Effective lower bound (us).
    pub fn min_us(&self) -> u16 {
        bound_us(self.driver.timing().min_pulse_us, self.min_offset)
    }

    /// Effective upper bound (us).
    pub fn max_us(&self) -> u16 {
        bound_us(self.driver.timing().max_pulse_us, self.max_offset)
    }

    fn publish(&mut self, us: u16) {
        self.ticks = ticks::pulse_ticks(self.driver.clock(), us);
        self.driver.set_pulse_ticks(self.ticks);
    }
}

impl<T, G, M> Drop for Servo<'_, T, G, M>
where
    T: CompareTimer,
    G: GpioPort,
    M: PinMap,
{
    fn drop(&mut self) {
        self.detach();
    }
}

fn bound_offset(nominal_us: u16, requested_us: u16) -> Option<i8> {
    let offset = (i32::from(nominal_us) - i32::from(requested_us)) / BOUND_STEP_US;
    i8::try_from(offset).ok()
}

fn bound_us(nominal_us: u16, offset: i8) -> u16 {
    (i32::from(nominal_us) - i32::from(offset) * BOUND_STEP_US) as u16
}
