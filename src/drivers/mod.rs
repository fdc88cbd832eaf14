//! Timer control and board adapters.

pub mod hal_pin;
pub mod isr_link;
pub mod timer;

#[cfg(target_os = "espidf")]
pub mod gptimer;
