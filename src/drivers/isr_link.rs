//! Maskable hook between a vendor timer callback and the driver ISR.
//!
//! Timers whose interrupt cannot be enabled or disabled from inside a
//! critical section keep running and route every alarm through an
//! [`IsrLink`]; masking the compare interrupt becomes a flag store.

use core::sync::atomic::{AtomicBool, Ordering};

/// Called from the alarm ISR.
pub type IsrHook = fn();

/// Alarm callback target: the hook plus its mask flag.
///
/// Lives in a `static` so a C callback can reach it through a context
/// pointer.
pub struct IsrLink {
    hook: IsrHook,
    masked: AtomicBool,
}

impl IsrLink {
    /// A link that starts masked.
    pub const fn new(hook: IsrHook) -> Self {
        Self {
            hook,
            masked: AtomicBool::new(true),
        }
    }

    /// Run the hook unless masked. Call from the vendor alarm callback.
    pub fn fire(&self) {
        if !self.masked.load(Ordering::Acquire) {
            (self.hook)();
        }
    }

    pub fn mask(&self) {
        self.masked.store(true, Ordering::Release);
    }

    pub fn unmask(&self) {
        self.masked.store(false, Ordering::Release);
    }

    pub fn is_masked(&self) -> bool {
        self.masked.load(Ordering::Acquire)
    }
}
