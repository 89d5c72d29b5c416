//! Audio clock abstraction.
//!
//! The scheduler stamps events against an [`AudioClock`] rather than the
//! coarse timer it polls on. The synth output exposes its sample counter
//! through this trait; [`SystemClock`] and [`ManualClock`] cover headless
//! hosts and tests.

use atomic_float::AtomicF64;
use std::sync::atomic::Ordering;
use std::time::Instant;

/// A monotonic timeline measured in seconds.
pub trait AudioClock: Send + Sync {
    /// Current time in seconds.
    fn now(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    time: AtomicF64,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            time: AtomicF64::new(start),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.time.store(seconds, Ordering::Release);
    }

    pub fn advance(&self, seconds: f64) {
        self.time.fetch_add(seconds, Ordering::AcqRel);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        self.time.load(Ordering::Acquire)
    }
}
