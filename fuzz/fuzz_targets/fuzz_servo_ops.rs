//! Fuzz target: attach / write / detach / interrupt interleavings
//!
//! Each input byte is one operation against a simulated driver. Checks that
//! nothing panics, that a detached servo leaves its port low, and that every
//! completed refresh period is exactly one budget long.
//!
//! cargo fuzz run fuzz_servo_ops

#![no_main]

use critical_section as _;
use libfuzzer_sys::fuzz_target;
use servo_tcb::sim::{Bench, SimGpio, SimTimer};
use servo_tcb::ticks::refresh_budget;
use servo_tcb::{Attiny412Pins, ClockConfig, Servo, ServoDriver, ServoTiming};

fuzz_target!(|data: &[u8]| {
    let Some((&clock_sel, ops)) = data.split_first() else {
        return;
    };
    let cpu_hz = if clock_sel & 1 == 0 { 20_000_000 } else { 8_000_000 };
    let Ok(clock) = ClockConfig::from_cpu_hz(cpu_hz) else {
        return;
    };
    let Ok(driver) = ServoDriver::new(
        SimTimer::new(),
        SimGpio::new(),
        Attiny412Pins,
        clock,
        ServoTiming::STANDARD,
    ) else {
        return;
    };
    let budget = u64::from(refresh_budget(driver.clock(), driver.timing()));

    let mut bench = Bench::new(&driver);
    let mut servo = Servo::new(&driver);

    for &op in ops {
        let arg = op & 0x3f;
        match op >> 6 {
            0 => {
                let _ = servo.attach(arg & 0x07);
            }
            1 => servo.detach(),
            2 => servo.write(arg.saturating_mul(4)),
            _ => {
                for _ in 0..=arg % 8 {
                    bench.fire();
                }
            }
        }

        if !servo.attached() {
            assert_eq!(driver.with_hardware(|_, g| g.output(0)), 0);
        }
    }

    // Periods only close between attaches; a detach or re-attach restarts
    // the frame, so any gap shorter than a budget is a defect.
    if let Some(pin) = driver.resolve(servo.pin()) {
        for period in bench.periods(pin) {
            assert!(period >= budget, "period {period} < budget {budget}");
        }
    }
});
