//! Recording hardware for integration tests.
//!
//! Timer and GPIO share one call log so tests can assert on the order of
//! register writes across both peripherals.

use std::cell::RefCell;
use std::rc::Rc;

use servo_tcb::config::ClockRegime;
use servo_tcb::ports::{CompareTimer, GpioPort};
use servo_tcb::{Attiny412Pins, ClockConfig, PinId, ServoDriver, ServoTiming};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    SelectClock(ClockRegime),
    PeriodicMode,
    Compare(u16),
    IrqOn,
    IrqOff,
    Ack,
    Enable,
    DirSet(PinId),
    High(PinId),
    Low(PinId),
}

pub type CallLog = Rc<RefCell<Vec<HwCall>>>;

// ── Mock peripherals ──────────────────────────────────────────

pub struct MockTimer {
    log: CallLog,
}

impl CompareTimer for MockTimer {
    fn select_clock(&mut self, regime: ClockRegime) {
        self.log.borrow_mut().push(HwCall::SelectClock(regime));
    }

    fn set_periodic_mode(&mut self) {
        self.log.borrow_mut().push(HwCall::PeriodicMode);
    }

    fn set_compare(&mut self, ticks: u16) {
        self.log.borrow_mut().push(HwCall::Compare(ticks));
    }

    fn enable_interrupt(&mut self) {
        self.log.borrow_mut().push(HwCall::IrqOn);
    }

    fn disable_interrupt(&mut self) {
        self.log.borrow_mut().push(HwCall::IrqOff);
    }

    fn clear_interrupt(&mut self) {
        self.log.borrow_mut().push(HwCall::Ack);
    }

    fn enable(&mut self) {
        self.log.borrow_mut().push(HwCall::Enable);
    }
}

pub struct MockGpio {
    log: CallLog,
}

impl GpioPort for MockGpio {
    fn set_output(&mut self, pin: PinId) {
        self.log.borrow_mut().push(HwCall::DirSet(pin));
    }

    fn set_high(&mut self, pin: PinId) {
        self.log.borrow_mut().push(HwCall::High(pin));
    }

    fn set_low(&mut self, pin: PinId) {
        self.log.borrow_mut().push(HwCall::Low(pin));
    }
}

// ── Board ─────────────────────────────────────────────────────

pub type MockDriver = ServoDriver<MockTimer, MockGpio, Attiny412Pins>;

/// A driver on recording peripherals plus a handle on their shared log.
pub fn mock_driver(cpu_hz: u32) -> (MockDriver, CallLog) {
    let log: CallLog = Rc::new(RefCell::new(Vec::new()));
    let driver = ServoDriver::new(
        MockTimer { log: log.clone() },
        MockGpio { log: log.clone() },
        Attiny412Pins,
        ClockConfig::from_cpu_hz(cpu_hz).unwrap(),
        ServoTiming::STANDARD,
    )
    .unwrap();
    (driver, log)
}

/// Take and clear the log.
pub fn drain(log: &CallLog) -> Vec<HwCall> {
    std::mem::take(&mut *log.borrow_mut())
}
