//! Simulated time sources.

use std::time::Instant;

/// Monotonic source of simulated time in seconds.
pub trait Clock {
    /// Seconds since the clock started. Never decreases between calls.
    fn elapsed_time(&mut self) -> f32;
}

/// Wall-clock backed clock, started at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
    last: f32,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: 0.0,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_time(&mut self) -> f32 {
        // Instant is monotonic; the max guards against f32 rounding only.
        self.last = self.last.max(self.start.elapsed().as_secs_f32());
        self.last
    }
}

/// Clock advanced explicitly by the caller. Used for headless runs and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManualClock {
    elapsed: f32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(seconds: f32) -> Self {
        let mut clock = Self::new();
        clock.advance(seconds);
        clock
    }

    /// Advance by `dt` seconds. Negative and non-finite steps are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        } else if dt != 0.0 {
            tracing::warn!(dt, "ignoring invalid clock step");
        }
    }
}

impl Clock for ManualClock {
    fn elapsed_time(&mut self) -> f32 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero() {
        let mut c = ManualClock::new();
        assert_eq!(c.elapsed_time(), 0.0);
    }

    #[test]
    fn manual_clock_accumulates() {
        let mut c = ManualClock::new();
        c.advance(0.5);
        c.advance(0.25);
        assert_eq!(c.elapsed_time(), 0.75);
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let mut c = ManualClock::starting_at(1.0);
        c.advance(-0.5);
        c.advance(f32::NAN);
        c.advance(f32::INFINITY);
        assert_eq!(c.elapsed_time(), 1.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut c = SystemClock::new();
        let mut prev = c.elapsed_time();
        assert!(prev >= 0.0);
        for _ in 0..1000 {
            let now = c.elapsed_time();
            assert!(now >= prev);
            prev = now;
        }
    }
}
