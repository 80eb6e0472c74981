//! Interrupt-fed counters shared between callbacks and the main loop.
//!
//! ```text
//! ┌──────────────────┐  increment   ┌─────────────┐  consume / take  ┌───────────┐
//! │ SQW falling edge │─────────────▶│  seconds    │─────────────────▶│           │
//! │ (GPIO ISR, 1 Hz) │              └─────────────┘                  │           │
//! │                  │              ┌─────────────┐                  │ Main loop │
//! │ esp_timer (1 ms) │─────────────▶│  frames     │─────────────────▶│           │
//! │                  │─────────────▶│  ticks      │──── peek ───────▶│           │
//! └──────────────────┘              └─────────────┘                  └───────────┘
//! ```
//!
//! Each counter has exactly one incrementing context.  The main loop only
//! reads, subtracts or clears, and every such read-modify-write is a single
//! atomic operation, so an increment landing between "read" and "clear"
//! is never lost.  Callbacks do nothing but an atomic add: no logging, no
//! allocation, no blocking.

use core::sync::atomic::{AtomicU32, Ordering};

/// A single-word event counter: one producer increments, one consumer drains.
#[derive(Debug, Default)]
pub struct PulseCounter(AtomicU32);

impl PulseCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Record one event.  ISR-safe.
    #[inline]
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value without consuming it.
    #[inline]
    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Read and clear in one atomic exchange.
    #[inline]
    pub fn take(&self) -> u32 {
        self.0.swap(0, Ordering::AcqRel)
    }

    /// Overwrite the counter (time set, boot alignment).
    #[inline]
    pub fn set(&self, value: u32) {
        self.0.store(value, Ordering::Release);
    }

    /// If at least `threshold` events are pending, remove exactly
    /// `threshold` of them and return `true`.  Events beyond the threshold
    /// stay in the counter.
    pub fn consume(&self, threshold: u32) -> bool {
        debug_assert!(threshold > 0, "consume threshold must be non-zero");
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| v.checked_sub(threshold))
            .is_ok()
    }

    /// If at least `threshold` events are pending, clear the counter and
    /// return how many there were.
    pub fn take_at_least(&self, threshold: u32) -> Option<u32> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                (v >= threshold).then_some(0)
            })
            .ok()
    }
}

/// The clock's time base: every counter written from interrupt or timer
/// context.
///
/// Built once at boot and shared by `&'static` reference with the SQW
/// interrupt, the periodic tick timer and the main loop.
#[derive(Debug, Default)]
pub struct Timebase {
    seconds: PulseCounter,
    frames: PulseCounter,
    ticks: PulseCounter,
}

impl Timebase {
    pub const fn new() -> Self {
        Self {
            seconds: PulseCounter::new(),
            frames: PulseCounter::new(),
            ticks: PulseCounter::new(),
        }
    }

    /// RTC square-wave falling edge (1 Hz).
    #[inline]
    pub fn on_square_wave_edge(&self) {
        self.seconds.increment();
    }

    /// Periodic software tick.
    #[inline]
    pub fn on_timer_tick(&self) {
        self.frames.increment();
        self.ticks.increment();
    }

    /// Seconds since the last minute-boundary action.
    pub fn seconds(&self) -> &PulseCounter {
        &self.seconds
    }

    /// Ticks since the last animation frame.
    pub fn frames(&self) -> &PulseCounter {
        &self.frames
    }

    /// Monotonic tick count since the timer started (wraps at `u32::MAX`).
    pub fn uptime_ticks(&self) -> u32 {
        self.ticks.peek()
    }
}
