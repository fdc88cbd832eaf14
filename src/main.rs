//! Servo sweep: drives one hobby servo back and forth on ESP32-S3.
//!
//! ```text
//!   GPTimer alarm ISR ──▶ on_alarm() ──▶ ServoDriver::on_interrupt()
//!                                          │
//!   main loop ──▶ Servo::write(angle) ─────┘ (pulse_ticks cell)
//! ```

use std::sync::OnceLock;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{Gpio5, Output, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use servo_tcb::drivers::gptimer::GpTimer;
use servo_tcb::drivers::isr_link::IsrLink;
use servo_tcb::drivers::hal_pin::HalPin;
use servo_tcb::{ClockConfig, Servo, ServoDriver, ServoTiming, SinglePin};

const SERVO_GPIO: u8 = 5;
const SWEEP_STEP_DEG: usize = 2;
const SWEEP_DWELL_MS: u32 = 20;

/// GPTimer ticks at 10 MHz: the same tick a 20 MHz tinyAVR gets on CPU/2.
const TICK_SOURCE_HZ: u32 = 20_000_000;

type Driver = ServoDriver<GpTimer, HalPin<PinDriver<'static, Gpio5, Output>>, SinglePin>;

static DRIVER: OnceLock<Driver> = OnceLock::new();
static ALARM: IsrLink = IsrLink::new(on_alarm);

fn on_alarm() {
    if let Some(driver) = DRIVER.get() {
        driver.on_interrupt();
    }
}

fn main() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    info!("servo-sweep v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let pin = PinDriver::output(peripherals.pins.gpio5)?;

    let clock = ClockConfig::from_cpu_hz(TICK_SOURCE_HZ).map_err(anyhow::Error::msg)?;
    let timer = GpTimer::new(&clock, &ALARM)?;
    let driver = Driver::new(
        timer,
        HalPin::new(pin),
        SinglePin::new(SERVO_GPIO),
        clock,
        ServoTiming::STANDARD,
    )
    .map_err(anyhow::Error::msg)?;
    let driver = DRIVER.get_or_init(|| driver);

    let mut servo = Servo::new(driver);
    servo.attach(SERVO_GPIO).map_err(anyhow::Error::msg)?;
    info!("servo on GPIO{} ({}..={}us)", SERVO_GPIO, servo.min_us(), servo.max_us());

    loop {
        for angle in (0..=180u8).step_by(SWEEP_STEP_DEG) {
            servo.write(angle);
            FreeRtos::delay_ms(SWEEP_DWELL_MS);
        }
        for angle in (0..=180u8).rev().step_by(SWEEP_STEP_DEG) {
            servo.write(angle);
            FreeRtos::delay_ms(SWEEP_DWELL_MS);
        }
    }
}
