//! Fixed-window rate limiter.
//!
//! At most `burst` events pass per `interval`. The window starts with the
//! first event checked and restarts on the first check after it expires.
//! Time is always supplied by the caller.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    burst: u32,
    begin: Option<Instant>,
    passed: u32,
    suppressed: u32,
}

impl RateLimiter {
    pub fn new(interval: Duration, burst: u32) -> Self {
        Self {
            interval,
            burst,
            begin: None,
            passed: 0,
            suppressed: 0,
        }
    }

    /// Whether an event at `now` may pass. Consumes budget when it does.
    pub fn allow(&mut self, now: Instant) -> bool {
        self.roll(now);
        if self.passed < self.burst {
            self.passed += 1;
            true
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            false
        }
    }

    fn roll(&mut self, now: Instant) {
        let expired = match self.begin {
            None => true,
            Some(b) => now.saturating_duration_since(b) >= self.interval,
        };
        if expired {
            if self.suppressed > 0 {
                tracing::debug!(suppressed = self.suppressed, "rate limiter window closed");
            }
            self.begin = Some(now);
            self.passed = 0;
            self.suppressed = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_then_refuse_within_interval() {
        let t0 = Instant::now();
        let mut rl = RateLimiter::new(Duration::from_secs(3), 5);
        let passed = (0..20)
            .filter(|i| rl.allow(t0 + Duration::from_millis(100 * i)))
            .count();
        assert_eq!(passed, 5);
        assert_eq!(rl.suppressed, 15);
        assert!(!rl.allow(t0 + Duration::from_millis(2999)));
    }

    #[test]
    fn budget_refills_after_interval() {
        let t0 = Instant::now();
        let mut rl = RateLimiter::new(Duration::from_secs(3), 2);
        assert!(rl.allow(t0));
        assert!(rl.allow(t0));
        assert!(!rl.allow(t0 + Duration::from_millis(2999)));
        assert!(rl.allow(t0 + Duration::from_secs(3)));
        assert_eq!(rl.suppressed, 0);
        assert!(rl.allow(t0 + Duration::from_secs(3)));
        assert!(!rl.allow(t0 + Duration::from_secs(3)));
    }
}
