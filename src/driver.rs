//! Servo driver: owns the timer, the GPIO port and the engine.
//!
//! ## Concurrency
//!
//! Everything the interrupt handler touches sits behind a
//! `critical_section::Mutex`. Channel state is only rewritten inside a
//! critical section with the compare interrupt masked, so the engine never
//! sees a half-configured channel. The pulse width has its own cell: it is
//! the only value written while the interrupt is live, and a critical
//! section makes that 16-bit store untearable on 8-bit cores too.
//!
//! ## Ownership
//!
//! There is one hardware channel. The first [`Servo`](crate::Servo) to
//! attach claims it; any other instance gets [`Error::ChannelInUse`] until
//! the owner detaches.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use log::{debug, info};

use crate::channel::{ChannelState, PinId};
use crate::config::{ClockConfig, ServoTiming};
use crate::drivers::timer;
use crate::engine::{Phase, PulseEngine};
use crate::error::{Error, Result};
use crate::ports::{CompareTimer, GpioPort, PinMap};
use crate::ticks;

struct Inner<T, G> {
    timer: T,
    gpio: G,
    channel: ChannelState,
    engine: PulseEngine,
    claimed: bool,
}

pub struct ServoDriver<T, G, M> {
    inner: Mutex<RefCell<Inner<T, G>>>,
    pulse_ticks: Mutex<Cell<u16>>,
    pins: M,
    clock: ClockConfig,
    timing: ServoTiming,
}

impl<T, G, M> ServoDriver<T, G, M>
where
    T: CompareTimer,
    G: GpioPort,
    M: PinMap,
{
    /// Build a driver after checking the timing profile against the clock.
    ///
    /// Nothing is written to the hardware until the first attach.
    pub fn new(timer: T, gpio: G, pins: M, clock: ClockConfig, timing: ServoTiming) -> Result<Self> {
        timing.validate(&clock)?;

        let engine = PulseEngine::new(ticks::refresh_budget(&clock, &timing), timing.max_compare);
        let default_ticks = ticks::default_ticks(&clock, &timing);

        Ok(Self {
            inner: Mutex::new(RefCell::new(Inner {
                timer,
                gpio,
                channel: ChannelState::IDLE,
                engine,
                claimed: false,
            })),
            pulse_ticks: Mutex::new(Cell::new(default_ticks)),
            pins,
            clock,
            timing,
        })
    }

    pub fn clock(&self) -> &ClockConfig {
        &self.clock
    }

    pub fn timing(&self) -> &ServoTiming {
        &self.timing
    }

    /// Compare-match interrupt handler.
    ///
    /// Runs one engine step, applies its edges, programs the next interval
    /// and acknowledges the interrupt. No allocation, no logging, no
    /// blocking.
    pub fn on_interrupt(&self) {
        critical_section::with(|cs| {
            let pulse_ticks = self.pulse_ticks.borrow(cs).get();
            let mut inner = self.inner.borrow_ref_mut(cs);
            let Inner {
                timer,
                gpio,
                channel,
                engine,
                ..
            } = &mut *inner;

            let step = engine.step(channel, pulse_ticks);
            if let Some(pin) = step.fall {
                gpio.set_low(pin);
            }
            if let Some(pin) = step.rise {
                gpio.set_high(pin);
            }
            timer.set_compare(step.compare);
            timer.clear_interrupt();
        });
    }

    /// Pin number → port/bitmask via the board table.
    pub fn resolve(&self, pin: u8) -> Option<PinId> {
        self.pins.resolve(pin)
    }

    /// Claim the channel and start pulsing `pin` at `pulse_ticks`.
    ///
    /// `owner` is true when the caller already holds the claim and is only
    /// reconfiguring.
    pub(crate) fn connect(&self, pin: PinId, pulse_ticks: u16, owner: bool) -> Result<()> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.claimed && !owner {
                return Err(Error::ChannelInUse);
            }

            inner.timer.disable_interrupt();
            if inner.channel.active && matches!(inner.engine.phase(), Phase::Driving { .. }) {
                let old = inner.channel.pin;
                inner.gpio.set_low(old);
            }
            inner.gpio.set_output(pin);
            inner.channel = ChannelState { pin, active: true };
            inner.claimed = true;
            inner.engine.reset();
            self.pulse_ticks.borrow(cs).set(pulse_ticks);

            timer::start(&mut inner.timer, self.clock.regime);
            Ok(())
        })?;

        info!(
            "servo: channel on port {} mask 0b{:08b}, {} ticks",
            pin.port, pin.bitmask, pulse_ticks
        );
        Ok(())
    }

    /// Stop pulsing and release the claim.
    ///
    /// A pulse in flight is ended here: the interrupt that would have
    /// ended it is masked from now on.
    pub(crate) fn disconnect(&self) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let Inner {
                timer,
                gpio,
                channel,
                engine,
                claimed,
            } = &mut *inner;

            timer::stop(timer);
            if channel.active && matches!(engine.phase(), Phase::Driving { .. }) {
                gpio.set_low(channel.pin);
            }
            channel.active = false;
            *claimed = false;
        });
        debug!("servo: channel released");
    }

    /// Publish a new pulse width; taken up at the next period start.
    pub(crate) fn set_pulse_ticks(&self, ticks: u16) {
        critical_section::with(|cs| self.pulse_ticks.borrow(cs).set(ticks));
    }

    /// Pulse width the engine will use for the next pulse.
    pub fn pulse_ticks(&self) -> u16 {
        critical_section::with(|cs| self.pulse_ticks.borrow(cs).get())
    }

    /// Whether the channel is currently driving a pin.
    pub fn is_active(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).channel.active)
    }

    /// Current engine phase.
    pub fn phase(&self) -> Phase {
        critical_section::with(|cs| self.inner.borrow_ref(cs).engine.phase())
    }

    /// Run `f` against the timer and GPIO adapters inside a critical
    /// section. Used by board glue and the simulation bench.
    pub fn with_hardware<R>(&self, f: impl FnOnce(&mut T, &mut G) -> R) -> R {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let Inner { timer, gpio, .. } = &mut *inner;
            f(timer, gpio)
        })
    }
}
