//! Channel state shared between the façade and the pulse engine.

/// A pin resolved to its port register block and bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinId {
    /// Port index (0 = PORTA).
    pub port: u8,
    /// Single-bit mask within the port.
    pub bitmask: u8,
}

impl PinId {
    pub const fn new(port: u8, bitmask: u8) -> Self {
        Self { port, bitmask }
    }
}

/// The driven channel.
///
/// Written only from normal context while the compare interrupt is masked;
/// read by the engine on every interrupt. The pulse width lives in its own
/// cell on the driver, since it is the one value written while the
/// interrupt is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelState {
    pub pin: PinId,
    /// False after detach or before the first successful attach.
    pub active: bool,
}

impl ChannelState {
    pub const IDLE: Self = Self {
        pin: PinId::new(0, 0),
        active: false,
    };
}
