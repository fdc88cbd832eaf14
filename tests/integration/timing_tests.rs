//! Pulse widths and refresh periods measured on the simulated bench.

use servo_tcb::drivers::timer::INITIAL_COMPARE;
use servo_tcb::sim::{Bench, SimGpio, SimTimer};
use servo_tcb::ticks::micros_from_ticks;
use servo_tcb::{Attiny412Pins, ClockConfig, PinId, Servo, ServoDriver, ServoTiming};

type SimDriver = ServoDriver<SimTimer, SimGpio, Attiny412Pins>;

/// Arduino pin 0 is PA6.
const PA6: PinId = PinId::new(0, 1 << 6);

fn sim_driver(cpu_hz: u32, timing: ServoTiming) -> SimDriver {
    ServoDriver::new(
        SimTimer::new(),
        SimGpio::new(),
        Attiny412Pins,
        ClockConfig::from_cpu_hz(cpu_hz).unwrap(),
        timing,
    )
    .unwrap()
}

fn budget(d: &SimDriver) -> u64 {
    u64::from(servo_tcb::ticks::refresh_budget(d.clock(), d.timing()))
}

#[test]
fn angle_sweep_widths_at_20mhz() {
    let d = sim_driver(20_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();

    for (angle, expected) in [(0u8, 5_389u64), (180, 23_949), (90, 14_669)] {
        s.write(angle);
        bench.run_for(3 * budget(&d));
        let widths = bench.pulse_widths(PA6);
        assert_eq!(widths.last(), Some(&expected), "angle {angle}");
    }
}

#[test]
fn direct_clock_widths_land_on_whole_micros() {
    let d = sim_driver(8_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();

    for us in [544u16, 1_000, 1_500, 2_400] {
        s.write_micros(us);
        bench.run_for(2 * budget(&d));
        let width = *bench.pulse_widths(PA6).last().unwrap();
        let trimmed = u32::try_from(width).unwrap() + u32::from(d.clock().trim_ticks);
        assert_eq!(micros_from_ticks(d.clock(), trimmed), u32::from(us));
    }
}

#[test]
fn first_rise_follows_one_idle_period() {
    let d = sim_driver(20_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();

    bench.run_for(2 * budget(&d));
    let rises = bench.rises(PA6);
    assert_eq!(rises.first(), Some(&(u64::from(INITIAL_COMPARE) + budget(&d))));
}

#[test]
fn periods_hold_budget_without_drift() {
    let d = sim_driver(20_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();

    // Vary the pulse every period; the frame must not stretch.
    for angle in [0u8, 45, 180, 10, 90, 135, 60, 180] {
        s.write(angle);
        bench.run_for(budget(&d));
    }

    let periods = bench.periods(PA6);
    assert!(periods.len() >= 5);
    assert!(periods.iter().all(|&p| p == budget(&d)), "{periods:?}");
}

#[test]
fn write_mid_pulse_applies_next_period() {
    let d = sim_driver(20_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();
    s.write(0);

    while !d.with_hardware(|_, g| g.is_high(PA6)) {
        assert!(bench.fire());
    }
    s.write(180);
    bench.run_for(2 * budget(&d));

    let widths = bench.pulse_widths(PA6);
    assert_eq!(widths[0], 5_389);
    assert_eq!(widths[1], 23_949);
}

#[test]
fn detach_silences_and_reattach_resumes() {
    let d = sim_driver(20_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();
    bench.run_for(3 * budget(&d));
    let before = bench.rises(PA6).len();
    assert!(before > 0);

    s.detach();
    assert!(!d.with_hardware(|_, g| g.is_high(PA6)));
    assert!(!bench.fire());
    assert_eq!(bench.rises(PA6).len(), before);

    s.attach(0).unwrap();
    bench.run_for(3 * budget(&d));
    assert!(bench.rises(PA6).len() > before);
}

#[test]
fn default_pulse_before_first_write() {
    let d = sim_driver(20_000_000, ServoTiming::STANDARD);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();

    bench.run_for(2 * budget(&d));
    assert_eq!(bench.pulse_widths(PA6).first(), Some(&15_000));
}

#[test]
fn short_compare_register_still_closes_period() {
    let timing = ServoTiming {
        max_compare: 30_000,
        ..ServoTiming::STANDARD
    };
    let d = sim_driver(20_000_000, timing);
    let mut bench = Bench::new(&d);
    let mut s = Servo::new(&d);
    s.attach(0).unwrap();
    s.write(180);

    let mut largest = 0;
    for _ in 0..60 {
        assert!(bench.fire());
        largest = largest.max(d.with_hardware(|t, _| t.compare()));
    }
    assert!(largest <= 30_000);

    let periods = bench.periods(PA6);
    assert!(!periods.is_empty());
    assert!(periods.iter().all(|&p| p == budget(&d)));
}
