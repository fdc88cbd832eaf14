//! Register sequencing of attach / detach / write and the interrupt path.

use crate::mock_hw::{HwCall, drain, mock_driver};
use servo_tcb::drivers::timer::INITIAL_COMPARE;
use servo_tcb::{
    ATTACH_CHANNEL_IN_USE, ATTACH_INVALID_PIN, ATTACH_INVALID_RANGE, ATTACH_OK, ClockRegime,
    Error, PinId, Servo, status_code,
};

const PIN5: PinId = PinId::new(0, 1 << 0);

#[test]
fn attach_masks_interrupt_before_configuring() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    assert_eq!(status_code(&s.attach(5)), ATTACH_OK);

    assert_eq!(
        drain(&log),
        vec![
            HwCall::IrqOff,
            HwCall::DirSet(PIN5),
            HwCall::SelectClock(ClockRegime::Divided),
            HwCall::PeriodicMode,
            HwCall::Compare(INITIAL_COMPARE),
            HwCall::IrqOn,
            HwCall::Enable,
        ]
    );
}

#[test]
fn slow_clock_selects_undivided_timer() {
    let (d, log) = mock_driver(8_000_000);
    let mut s = Servo::new(&d);
    s.attach(5).unwrap();
    assert!(drain(&log).contains(&HwCall::SelectClock(ClockRegime::Direct)));
}

#[test]
fn invalid_pin_touches_nothing() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    let result = s.attach(6);
    assert_eq!(result, Err(Error::InvalidPin(6)));
    assert_eq!(status_code(&result), ATTACH_INVALID_PIN);
    assert!(drain(&log).is_empty());
    assert!(!d.is_active());
}

#[test]
fn unrepresentable_bounds_touch_nothing() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    let result = s.attach_with_bounds(0, 2_000, 1_000);
    assert_eq!(status_code(&result), ATTACH_INVALID_RANGE);
    assert!(drain(&log).is_empty());
}

#[test]
fn second_instance_reports_channel_in_use() {
    let (d, log) = mock_driver(20_000_000);
    let mut a = Servo::new(&d);
    let mut b = Servo::new(&d);
    a.attach(0).unwrap();
    drain(&log);

    assert_eq!(status_code(&b.attach(1)), ATTACH_CHANNEL_IN_USE);
    assert!(drain(&log).is_empty());
}

#[test]
fn write_touches_no_registers() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    s.attach(5).unwrap();
    drain(&log);

    s.write(90);
    s.write_micros(1_000);
    assert!(drain(&log).is_empty());
}

#[test]
fn interrupt_path_rise_then_fall() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    s.attach(5).unwrap();
    s.write(0);
    drain(&log);

    // First period is pure idle: 3 full compares and the remainder.
    for expected in [65_535, 65_535, 65_535, 3_395] {
        d.on_interrupt();
        assert_eq!(drain(&log), vec![HwCall::Compare(expected), HwCall::Ack]);
    }

    d.on_interrupt();
    assert_eq!(
        drain(&log),
        vec![HwCall::High(PIN5), HwCall::Compare(5_440 - 51), HwCall::Ack]
    );

    d.on_interrupt();
    assert_eq!(
        drain(&log),
        vec![HwCall::Low(PIN5), HwCall::Compare(65_535), HwCall::Ack]
    );
}

#[test]
fn every_interrupt_is_acknowledged_last() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);

    for round in 0..60 {
        match round {
            10 => s.attach(2).unwrap(),
            30 => s.detach(),
            45 => s.attach(3).unwrap(),
            _ => {}
        }
        drain(&log);
        d.on_interrupt();
        let calls = drain(&log);
        assert_eq!(calls.last(), Some(&HwCall::Ack), "round {round}");
        assert_eq!(calls.iter().filter(|c| **c == HwCall::Ack).count(), 1);
    }
}

#[test]
fn detach_while_idle_only_masks_interrupt() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    s.attach(5).unwrap();
    drain(&log);

    s.detach();
    assert_eq!(drain(&log), vec![HwCall::IrqOff]);

    s.detach();
    assert!(drain(&log).is_empty());
}

#[test]
fn detach_mid_pulse_ends_the_pulse() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    s.attach(5).unwrap();

    let mut rose = false;
    for _ in 0..8 {
        d.on_interrupt();
        if drain(&log).contains(&HwCall::High(PIN5)) {
            rose = true;
            break;
        }
    }
    assert!(rose);

    s.detach();
    assert_eq!(drain(&log), vec![HwCall::IrqOff, HwCall::Low(PIN5)]);
}

#[test]
fn stray_interrupt_after_detach_never_raises_pin() {
    let (d, log) = mock_driver(20_000_000);
    let mut s = Servo::new(&d);
    s.attach(5).unwrap();
    s.detach();
    drain(&log);

    for _ in 0..40 {
        d.on_interrupt();
    }
    assert!(!drain(&log).iter().any(|c| matches!(c, HwCall::High(_))));
}

#[test]
fn dropped_servo_masks_interrupt_and_frees_channel() {
    let (d, log) = mock_driver(20_000_000);
    {
        let mut a = Servo::new(&d);
        a.attach(5).unwrap();
        drain(&log);
    }
    assert_eq!(drain(&log), vec![HwCall::IrqOff]);

    let mut b = Servo::new(&d);
    assert_eq!(status_code(&b.attach(5)), ATTACH_OK);
}
