//! Monotonic time sources for the transport
//!
//! Positions are derived from wall time rather than sample counters, so the
//! transport only ever asks "what time is it" in seconds.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Monotonic clock reporting seconds since an arbitrary origin
pub trait Clock: Send + Sync {
    /// Current time in seconds
    fn now(&self) -> f64;
}

/// Clock backed by [`Instant`]
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

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock for deterministic tests and simulations
///
/// Clones share the same time, so a test can keep a handle while the
/// transport owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `secs`
    pub fn advance(&self, secs: f64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += secs;
    }

    /// Jump to an absolute time
    pub fn set(&self, secs: f64) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.advance(1.5);
        assert_eq!(clock.now(), 1.5);

        clock.set(10.0);
        assert_eq!(handle.now(), 10.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
