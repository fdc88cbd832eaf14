//! `GpioPort` over a single embedded-hal output pin.
//!
//! Lets any HAL that hands out typed `OutputPin`s (esp-idf-hal, avr-hal,
//! rp-hal, ...) drive the servo without a register-level port adapter.
//! Pair it with [`SinglePin`](crate::pins::SinglePin).

use embedded_hal::digital::OutputPin;

use crate::channel::PinId;
use crate::pins::SinglePin;
use crate::ports::GpioPort;

pub struct HalPin<P> {
    pin: P,
}

impl<P: OutputPin> HalPin<P> {
    /// Wrap a pin the HAL has already configured as an output.
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> GpioPort for HalPin<P> {
    fn set_output(&mut self, _pin: PinId) {
        // Direction is fixed by the pin's type.
    }

    // Pin errors are dropped: edges are register writes with no fault path.
    fn set_high(&mut self, pin: PinId) {
        if pin == SinglePin::ID {
            let _ = self.pin.set_high();
        }
    }

    fn set_low(&mut self, pin: PinId) {
        if pin == SinglePin::ID {
            let _ = self.pin.set_low();
        }
    }
}
