//! Host-side simulation of the timer and GPIO registers.
//!
//! [`SimTimer`] and [`SimGpio`] hold register state in memory. [`Bench`]
//! plays the hardware: each [`Bench::fire`] advances simulated time by the
//! compare value currently programmed, runs the driver's interrupt handler,
//! and timestamps every GPIO edge it produced. Pulse widths and refresh
//! periods fall out of the edge log.

use heapless::{HistoryBuffer, Vec};

use crate::channel::PinId;
use crate::config::ClockRegime;
use crate::driver::ServoDriver;
use crate::ports::{CompareTimer, GpioPort};

/// Port register blocks modelled (PORTA..PORTC).
pub const PORTS: usize = 3;
/// Edges retained by the bench.
pub const EDGE_LOG: usize = 64;
/// Pulses/periods returned by one bench query.
pub const MAX_SAMPLES: usize = 32;

// ── Timer ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SimTimer {
    regime: Option<ClockRegime>,
    periodic: bool,
    compare: u16,
    interrupt_enabled: bool,
    running: bool,
    acknowledged: u32,
}

impl SimTimer {
    pub const fn new() -> Self {
        Self {
            regime: None,
            periodic: false,
            compare: 0,
            interrupt_enabled: false,
            running: false,
            acknowledged: 0,
        }
    }

    pub fn regime(&self) -> Option<ClockRegime> {
        self.regime
    }

    pub fn periodic(&self) -> bool {
        self.periodic
    }

    pub fn compare(&self) -> u16 {
        self.compare
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.interrupt_enabled
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// Interrupts acknowledged so far.
    pub fn acknowledged(&self) -> u32 {
        self.acknowledged
    }
}

impl CompareTimer for SimTimer {
    fn select_clock(&mut self, regime: ClockRegime) {
        // CTRLA is rewritten whole: the clock select clears ENABLE.
        self.regime = Some(regime);
        self.running = false;
    }

    fn set_periodic_mode(&mut self) {
        self.periodic = true;
    }

    fn set_compare(&mut self, ticks: u16) {
        self.compare = ticks;
    }

    fn enable_interrupt(&mut self) {
        self.interrupt_enabled = true;
    }

    fn disable_interrupt(&mut self) {
        self.interrupt_enabled = false;
    }

    fn clear_interrupt(&mut self) {
        self.acknowledged = self.acknowledged.wrapping_add(1);
    }

    fn enable(&mut self) {
        self.running = true;
    }
}

// ── GPIO ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEdge {
    pub pin: PinId,
    pub high: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SimGpio {
    dir: [u8; PORTS],
    out: [u8; PORTS],
    pending: Vec<PinEdge, 4>,
}

impl SimGpio {
    pub const fn new() -> Self {
        Self {
            dir: [0; PORTS],
            out: [0; PORTS],
            pending: Vec::new(),
        }
    }

    /// DIR register of `port`.
    pub fn direction(&self, port: u8) -> u8 {
        self.dir.get(usize::from(port)).copied().unwrap_or(0)
    }

    /// OUT register of `port`.
    pub fn output(&self, port: u8) -> u8 {
        self.out.get(usize::from(port)).copied().unwrap_or(0)
    }

    pub fn is_high(&self, pin: PinId) -> bool {
        self.output(pin.port) & pin.bitmask != 0
    }

    /// Edges since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<PinEdge, 4> {
        core::mem::take(&mut self.pending)
    }

    fn drive(&mut self, pin: PinId, high: bool) {
        let Some(out) = self.out.get_mut(usize::from(pin.port)) else {
            return;
        };
        let was_high = *out & pin.bitmask != 0;
        if high {
            *out |= pin.bitmask;
        } else {
            *out &= !pin.bitmask;
        }
        if was_high != high {
            // Full log only when nobody drains; the bench drains every fire.
            let _ = self.pending.push(PinEdge { pin, high });
        }
    }
}

impl GpioPort for SimGpio {
    fn set_output(&mut self, pin: PinId) {
        if let Some(dir) = self.dir.get_mut(usize::from(pin.port)) {
            *dir |= pin.bitmask;
        }
    }

    fn set_high(&mut self, pin: PinId) {
        self.drive(pin, true);
    }

    fn set_low(&mut self, pin: PinId) {
        self.drive(pin, false);
    }
}

// ── Bench ─────────────────────────────────────────────────────

/// An edge stamped with simulated time (ticks since the bench started).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeAt {
    pub at: u64,
    pub pin: PinId,
    pub high: bool,
}

pub struct Bench<'d, M> {
    driver: &'d ServoDriver<SimTimer, SimGpio, M>,
    now: u64,
    edges: HistoryBuffer<EdgeAt, EDGE_LOG>,
}

impl<'d, M: crate::ports::PinMap> Bench<'d, M> {
    pub fn new(driver: &'d ServoDriver<SimTimer, SimGpio, M>) -> Self {
        Self {
            driver,
            now: 0,
            edges: HistoryBuffer::new(),
        }
    }

    /// Simulated time in timer ticks.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Let the current compare interval elapse and take the interrupt.
    ///
    /// Returns `false` without advancing time when the timer is stopped or
    /// its interrupt is masked.
    pub fn fire(&mut self) -> bool {
        self.collect();

        let interval = self.driver.with_hardware(|t, _| {
            (t.running() && t.interrupt_enabled()).then_some(t.compare())
        });
        let Some(interval) = interval else {
            return false;
        };

        self.now += u64::from(interval);
        self.driver.on_interrupt();
        self.collect();
        true
    }

    /// Fire until at least `ticks` of simulated time have passed or the
    /// interrupt is masked. Returns the number of interrupts taken.
    pub fn run_for(&mut self, ticks: u64) -> usize {
        let until = self.now + ticks;
        let mut fired = 0;
        while self.now < until && self.fire() {
            fired += 1;
        }
        fired
    }

    /// Every retained edge, oldest first.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeAt> + '_ {
        self.edges.oldest_ordered()
    }

    /// Completed pulse widths on `pin`, in ticks, oldest first.
    pub fn pulse_widths(&self, pin: PinId) -> Vec<u64, MAX_SAMPLES> {
        let mut widths = Vec::new();
        let mut rose_at = None;
        for e in self.edges().filter(|e| e.pin == pin) {
            match (e.high, rose_at) {
                (true, _) => rose_at = Some(e.at),
                (false, Some(start)) => {
                    let _ = widths.push(e.at - start);
                    rose_at = None;
                }
                (false, None) => {}
            }
        }
        widths
    }

    /// Rising-edge times on `pin`.
    pub fn rises(&self, pin: PinId) -> Vec<u64, MAX_SAMPLES> {
        self.edges()
            .filter(|e| e.pin == pin && e.high)
            .map(|e| e.at)
            .take(MAX_SAMPLES)
            .collect()
    }

    /// Gaps between consecutive rising edges on `pin`.
    pub fn periods(&self, pin: PinId) -> Vec<u64, MAX_SAMPLES> {
        self.rises(pin).windows(2).map(|w| w[1] - w[0]).collect()
    }

    fn collect(&mut self) {
        let pending = self.driver.with_hardware(|_, g| g.drain());
        for edge in pending {
            self.edges.write(EdgeAt {
                at: self.now,
                pin: edge.pin,
                high: edge.high,
            });
        }
    }
}
