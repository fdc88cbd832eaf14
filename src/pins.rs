//! Board pin tables.
//!
//! Maps the board's pin numbering onto port register blocks and bit masks.
//! Anything not listed is not a GPIO and makes `attach` fail.

use crate::channel::PinId;
use crate::ports::PinMap;

// ---------------------------------------------------------------------------
// 8-pin tinyAVR (ATtiny212/412)
// ---------------------------------------------------------------------------

/// PORTA index.
pub const PORT_A: u8 = 0;

/// Port bit for each board pin number 0..=5.
/// PA0 is UPDI; usable as GPIO once the fuse allows it.
const ATTINY412_BITS: [u8; 6] = [6, 7, 1, 2, 3, 0];

/// Arduino-style numbering of the 8-pin tinyAVR parts: every pin on PORTA.
#[derive(Debug, Clone, Copy, Default)]
pub struct Attiny412Pins;

impl PinMap for Attiny412Pins {
    fn port_of(&self, pin: u8) -> Option<u8> {
        ATTINY412_BITS.get(usize::from(pin)).map(|_| PORT_A)
    }

    fn bitmask_of(&self, pin: u8) -> Option<u8> {
        ATTINY412_BITS.get(usize::from(pin)).map(|bit| 1 << bit)
    }
}

// ---------------------------------------------------------------------------
// Single HAL-owned pin
// ---------------------------------------------------------------------------

/// One-entry table for boards where the HAL hands out a single typed pin
/// (see [`HalPin`](crate::drivers::hal_pin::HalPin)). Only `number`
/// resolves; it maps to port 0, bit 0.
#[derive(Debug, Clone, Copy)]
pub struct SinglePin {
    pub number: u8,
}

impl SinglePin {
    /// Identity the pin resolves to.
    pub const ID: PinId = PinId::new(0, 1);

    pub const fn new(number: u8) -> Self {
        Self { number }
    }
}

impl PinMap for SinglePin {
    fn port_of(&self, pin: u8) -> Option<u8> {
        (pin == self.number).then_some(Self::ID.port)
    }

    fn bitmask_of(&self, pin: u8) -> Option<u8> {
        (pin == self.number).then_some(Self::ID.bitmask)
    }
}
