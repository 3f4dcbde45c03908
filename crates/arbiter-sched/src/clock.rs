//! Monotonic Time Sources
//!
//! Everything in the scheduler measures time through a [`Clock`] so tests
//! can substitute a hand-advanced one. Only monotonicity and
//! sub-millisecond resolution are required.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic current time in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock for deterministic tests. Clones share the same
/// underlying time cell, so a test can hold one copy while the scheduler
/// holds another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let copy = clock.clone();
        clock.advance(1.5);
        assert!((copy.now() - 1.5).abs() < 1e-12);
        copy.set(10.0);
        assert!((clock.now() - 10.0).abs() < 1e-12);
    }
}
