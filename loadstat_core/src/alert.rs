//! Sustained high-load alerting.
//!
//! Two independent gates: the load must stay above the warn threshold for
//! `policy.streak` consecutive samples, and the rate limiter must still
//! have budget. The streak only resets when an alert actually fires or the
//! load drops back to the threshold or below.

use std::time::Instant;

use crate::config::AlertPolicy;
use crate::ratelimit::RateLimiter;

/// An alert that passed both gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub load: u32,
    pub threshold: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimitedAlerter {
    policy: AlertPolicy,
    streak: u32,
    limiter: RateLimiter,
}

impl RateLimitedAlerter {
    pub fn new(policy: AlertPolicy) -> Self {
        Self {
            policy,
            streak: 0,
            limiter: RateLimiter::new(policy.interval, policy.burst),
        }
    }

    /// Consecutive samples above the threshold not yet reported.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Feed one load sample. `threshold == 0` disables alerting and leaves
    /// the streak untouched.
    pub fn observe(&mut self, load: u32, threshold: u32, now: Instant) -> Option<Alert> {
        if threshold == 0 {
            return None;
        }
        if load <= threshold {
            self.streak = 0;
            return None;
        }
        self.streak = self.streak.saturating_add(1);
        if self.streak >= self.policy.streak && self.limiter.allow(now) {
            self.streak = 0;
            return Some(Alert { load, threshold });
        }
        None
    }
}
