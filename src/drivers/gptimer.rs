//! `CompareTimer` over the ESP-IDF general-purpose timer.
//!
//! GPTimer with auto-reload on alarm behaves like a periodic-interrupt
//! compare timer: the counter restarts from zero at the alarm, and an alarm
//! value set from the callback sizes the interval that has just begun.
//!
//! The driver calls `CompareTimer` methods inside a critical section, where
//! the IDF timer lifecycle calls (`gptimer_enable`, `gptimer_stop`, ...) are
//! not allowed. So the timer is enabled and started once in [`GpTimer::new`]
//! and torn down in `Drop`; interrupt masking is a flag in the
//! [`IsrLink`](crate::drivers::isr_link::IsrLink)
//! that the alarm callback checks. Only `gptimer_set_alarm_action`, which
//! IDF permits from ISR context, runs under the lock.

use core::ffi::c_void;

use esp_idf_svc::sys::*;
use log::info;

use crate::config::{ClockConfig, ClockRegime};
use crate::drivers::isr_link::IsrLink;
use crate::ports::CompareTimer;

pub struct GpTimer {
    handle: gptimer_handle_t,
    link: &'static IsrLink,
}

// SAFETY: the handle is an opaque IDF object; IDF serialises access to it
// internally and permits use from any task or ISR.
unsafe impl Send for GpTimer {}

unsafe extern "C" fn alarm_cb(
    _timer: gptimer_handle_t,
    _edata: *const gptimer_alarm_event_data_t,
    user_ctx: *mut c_void,
) -> bool {
    // SAFETY: user_ctx is the `&'static IsrLink` registered in `GpTimer::new`.
    let link = unsafe { &*user_ctx.cast::<IsrLink>() };
    link.fire();
    false
}

impl GpTimer {
    /// Create a timer ticking at `clock.timer_hz()`, route its alarm to
    /// `link` and start counting. Alarms are ignored until the driver
    /// unmasks the link.
    pub fn new(clock: &ClockConfig, link: &'static IsrLink) -> Result<Self, EspError> {
        let cfg = gptimer_config_t {
            clk_src: soc_periph_gptimer_clk_src_t_GPTIMER_CLK_SRC_DEFAULT,
            direction: gptimer_count_direction_t_GPTIMER_COUNT_UP,
            resolution_hz: clock.timer_hz(),
            ..Default::default()
        };
        let mut handle: gptimer_handle_t = core::ptr::null_mut();
        // SAFETY: cfg and handle outlive the call; called once per timer.
        esp!(unsafe { gptimer_new_timer(&cfg, &mut handle) })?;

        // From here on, an early return tears the timer down via Drop.
        let mut timer = Self { handle, link };

        let callbacks = gptimer_event_callbacks_t {
            on_alarm: Some(alarm_cb),
        };
        let ctx = core::ptr::from_ref(link).cast_mut().cast::<c_void>();
        // SAFETY: callbacks are registered before gptimer_enable; `link` is
        // 'static and only read through a shared reference.
        esp!(unsafe { gptimer_register_event_callbacks(handle, &callbacks, ctx) })?;

        timer.set_compare(u16::MAX);
        // SAFETY: live handle with callbacks registered, called from task
        // context.
        esp!(unsafe { gptimer_enable(handle) })?;
        // SAFETY: live, enabled handle.
        esp!(unsafe { gptimer_start(handle) })?;

        info!("gptimer: {} Hz tick", clock.timer_hz());
        Ok(timer)
    }
}

impl CompareTimer for GpTimer {
    fn select_clock(&mut self, _regime: ClockRegime) {
        // Resolution is fixed at creation from the same ClockConfig.
    }

    fn set_periodic_mode(&mut self) {
        // Auto-reload is part of every alarm written in `set_compare`.
    }

    fn set_compare(&mut self, ticks: u16) {
        let mut flags = gptimer_alarm_config_t__bindgen_ty_1::default();
        flags.set_auto_reload_on_alarm(1);
        let alarm = gptimer_alarm_config_t {
            alarm_count: u64::from(ticks),
            reload_count: 0,
            flags,
        };
        // SAFETY: ISR-safe IDF call on a live handle.
        unsafe {
            gptimer_set_alarm_action(self.handle, &alarm);
        }
    }

    fn enable_interrupt(&mut self) {
        self.link.unmask();
    }

    fn disable_interrupt(&mut self) {
        self.link.mask();
    }

    fn clear_interrupt(&mut self) {
        // The IDF ISR acknowledges the alarm before invoking the callback.
    }

    fn enable(&mut self) {
        // Counting since `new`.
    }
}

impl Drop for GpTimer {
    fn drop(&mut self) {
        self.disable_interrupt();
        // SAFETY: the handle is not used after this. Stop and disable fail
        // harmlessly on a timer that never got that far.
        unsafe {
            gptimer_stop(self.handle);
            gptimer_disable(self.handle);
            gptimer_del_timer(self.handle);
        }
    }
}
