//! Unified error type for the servo driver.
//!
//! A single `Copy` enum that every fallible path funnels into, plus the
//! numeric status codes of the procedural `attach` surface. Runtime paths
//! (the interrupt handler, `write`, `detach`) are infallible: register
//! writes are never verified, and use-before-attach is a silent no-op.

use core::fmt;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// `attach` succeeded.
pub const ATTACH_OK: u8 = 0;
/// `attach` was given a pin that does not map to a GPIO.
pub const ATTACH_INVALID_PIN: u8 = 255;
/// Another servo instance already owns the hardware channel.
pub const ATTACH_CHANNEL_IN_USE: u8 = 254;
/// The requested pulse bounds cannot be represented.
pub const ATTACH_INVALID_RANGE: u8 = 253;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pin number has no port/bitmask mapping on this board.
    InvalidPin(u8),
    /// The single hardware channel is already attached to another servo.
    ChannelInUse,
    /// Pulse bounds are inverted, too far from the nominal limits, or do not
    /// fit in a single compare interval.
    InvalidPulseRange { min_us: u16, max_us: u16 },
    /// CPU clock too slow to derive a whole number of cycles per microsecond.
    InvalidClock(u32),
    /// Timing profile is internally inconsistent.
    InvalidTiming(&'static str),
}

impl Error {
    /// Numeric code for the C-style `attach` surface.
    pub const fn status_code(self) -> u8 {
        match self {
            Self::InvalidPin(_) => ATTACH_INVALID_PIN,
            Self::ChannelInUse => ATTACH_CHANNEL_IN_USE,
            Self::InvalidPulseRange { .. } | Self::InvalidClock(_) | Self::InvalidTiming(_) => {
                ATTACH_INVALID_RANGE
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPin(pin) => write!(f, "pin {pin} is not a GPIO"),
            Self::ChannelInUse => write!(f, "servo channel already attached"),
            Self::InvalidPulseRange { min_us, max_us } => {
                write!(f, "pulse range {min_us}..={max_us}us not representable")
            }
            Self::InvalidClock(hz) => write!(f, "unsupported CPU clock {hz} Hz"),
            Self::InvalidTiming(msg) => write!(f, "timing: {msg}"),
        }
    }
}

/// Collapse an `attach` result into its status code.
pub fn status_code(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => ATTACH_OK,
        Err(e) => e.status_code(),
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
