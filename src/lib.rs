//! Hobby-servo pulse generator on a single 16-bit compare timer.
//!
//! One timer in periodic-interrupt mode produces the 20 ms servo frame: the
//! compare interrupt raises the pin, lowers it `pulse` ticks later, then
//! waits out the rest of the period in chunks no longer than the compare
//! register can hold.
//!
//! ```text
//! ┌──────────────┐   write(angle)   ┌──────────────────────────────┐
//! │    Servo     │ ───────────────▶ │ ServoDriver                  │
//! │ (façade)     │ attach / detach  │  pulse_ticks cell            │
//! └──────────────┘                  │  PulseEngine · ChannelState  │
//!                                   └──────┬──────────────┬────────┘
//!                        compare interrupt │              │ edges
//!                                   ┌──────▼─────┐  ┌─────▼──────┐
//!                                   │CompareTimer│  │  GpioPort  │
//!                                   └────────────┘  └────────────┘
//! ```
//!
//! All hardware sits behind the [`ports`] traits. On the host, [`sim`]
//! provides register models and a timing bench.

#![cfg_attr(not(test), no_std)]
#![deny(unused_must_use)]

pub mod channel;
pub mod config;
pub mod driver;
pub mod drivers;
pub mod engine;
pub mod pins;
pub mod ports;
pub mod servo;
pub mod ticks;

#[cfg(not(target_os = "espidf"))]
pub mod sim;

mod error;

pub use channel::{ChannelState, PinId};
pub use config::{ClockConfig, ClockRegime, ServoTiming};
pub use driver::ServoDriver;
pub use engine::{Phase, PulseEngine, Step};
pub use error::{
    ATTACH_CHANNEL_IN_USE, ATTACH_INVALID_PIN, ATTACH_INVALID_RANGE, ATTACH_OK, Error, Result,
    status_code,
};
pub use pins::{Attiny412Pins, SinglePin};
pub use servo::Servo;
