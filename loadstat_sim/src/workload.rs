//! Deterministic single-server workload.
//!
//! Arrivals follow a seeded xorshift jitter around the configured rate and
//! are served one at a time in FIFO order. Every admission is reported as
//! a busy edge and every completion as a busy update, exactly the calls a
//! real host makes. Time is taken from the supplied clock, so a manual
//! clock replays a run instantly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use loadstat_core::{LoadStat, Monitor};
use loadstat_traits::Clock;

use crate::error::{Result, SimError};
use crate::queue::SimQueue;

/// Host-side hooks a workload drives.
pub trait BusyHooks {
    fn start_busy(&self);
    fn update_busy(&self);
}

impl BusyHooks for Monitor {
    fn start_busy(&self) {
        Monitor::start_busy(self);
    }
    fn update_busy(&self) {
        Monitor::update_busy(self);
    }
}

impl BusyHooks for LoadStat {
    fn start_busy(&self) {
        // Arming is the caller's job when driving the engine directly.
        let _ = LoadStat::start_busy(self);
    }
    fn update_busy(&self) {
        LoadStat::update_busy(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadCfg {
    pub duration: Duration,
    /// Mean arrivals per second; 0 disables arrivals.
    pub arrival_per_sec: u32,
    pub service: Duration,
    pub background: u32,
    pub congestion_threshold: u32,
    pub seed: u64,
}

impl From<&loadstat_config::SimCfg> for WorkloadCfg {
    fn from(c: &loadstat_config::SimCfg) -> Self {
        Self {
            duration: Duration::from_millis(c.duration_ms),
            arrival_per_sec: c.arrival_per_sec,
            service: Duration::from_millis(c.service_ms),
            background: c.background,
            congestion_threshold: c.congestion_threshold,
            seed: c.seed,
        }
    }
}

impl Default for WorkloadCfg {
    fn default() -> Self {
        Self::from(&loadstat_config::SimCfg::default())
    }
}

/// Totals for one workload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadSummary {
    pub arrivals: u64,
    pub completions: u64,
    pub max_waiting: u32,
    /// Total time the server was busy.
    pub busy: Duration,
    pub elapsed: Duration,
    /// Stopped early by the stop flag.
    pub interrupted: bool,
}

/// xorshift64; zero seeds are remapped since zero is a fixed point.
#[derive(Debug, Clone)]
struct XorShift64(u64);

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

#[derive(Debug, Clone)]
pub struct SimWorkload {
    cfg: WorkloadCfg,
    rng: XorShift64,
}

impl SimWorkload {
    pub fn new(cfg: WorkloadCfg) -> Result<Self> {
        if cfg.arrival_per_sec > 0 && cfg.service.is_zero() {
            return Err(SimError::InvalidWorkload(
                "service time must be non-zero when arrivals are enabled".into(),
            ));
        }
        Ok(Self {
            rng: XorShift64::new(cfg.seed),
            cfg,
        })
    }

    /// Next inter-arrival gap, uniform in `[mean/2, 3*mean/2)`.
    fn next_gap(&mut self) -> Option<Duration> {
        if self.cfg.arrival_per_sec == 0 {
            return None;
        }
        let mean_us = (1_000_000 / u64::from(self.cfg.arrival_per_sec)).max(1);
        let jitter = self.rng.next_u64() % mean_us;
        Some(Duration::from_micros(mean_us / 2 + jitter))
    }

    /// Arrival offsets from the start of a run, up to `limit` of them.
    pub fn arrival_schedule(mut self, limit: usize) -> Vec<Duration> {
        let mut at = Duration::ZERO;
        let mut out = Vec::new();
        while out.len() < limit {
            let Some(gap) = self.next_gap() else { break };
            at += gap;
            if at >= self.cfg.duration {
                break;
            }
            out.push(at);
        }
        out
    }

    /// Drive `hooks` against `queue` until the configured duration elapses
    /// or `stop` is raised, then serve whatever is still queued.
    pub fn run<H, C>(
        mut self,
        hooks: &H,
        queue: &SimQueue,
        clock: &C,
        stop: &AtomicBool,
    ) -> WorkloadSummary
    where
        H: BusyHooks + ?Sized,
        C: Clock + ?Sized,
    {
        queue.set_congestion_threshold(self.cfg.congestion_threshold);
        queue.set_background(self.cfg.background);

        let start = clock.now();
        let end = start + self.cfg.duration;
        let mut summary = WorkloadSummary::default();
        let mut next_arrival = self.next_gap().map(|g| start + g);
        let mut in_service: Option<Instant> = None;

        tracing::info!(
            duration = ?self.cfg.duration,
            arrival_per_sec = self.cfg.arrival_per_sec,
            service = ?self.cfg.service,
            "workload started"
        );

        loop {
            if !summary.interrupted && stop.load(Ordering::Relaxed) {
                tracing::info!("workload interrupted; draining queue");
                summary.interrupted = true;
                next_arrival = None;
            }
            let arrival = next_arrival.filter(|t| *t < end);
            let due = match (arrival, in_service) {
                (None, None) => break,
                (Some(a), None) => a,
                (None, Some(c)) => c,
                (Some(a), Some(c)) => a.min(c),
            };

            let now = clock.now();
            if due > now {
                clock.sleep(due - now);
            }

            if in_service.is_some_and(|c| c <= due) {
                queue.complete();
                hooks.update_busy();
                summary.completions += 1;
                summary.busy += self.cfg.service;
                in_service = (queue.waiting() > 0).then_some(due + self.cfg.service);
            } else if arrival.is_some() {
                let waiting = queue.admit();
                hooks.start_busy();
                summary.arrivals += 1;
                summary.max_waiting = summary.max_waiting.max(waiting);
                if in_service.is_none() {
                    in_service = Some(due + self.cfg.service);
                }
                next_arrival = self.next_gap().map(|g| due + g);
            }
        }

        summary.elapsed = clock.since(start);
        tracing::info!(
            arrivals = summary.arrivals,
            completions = summary.completions,
            max_waiting = summary.max_waiting,
            "workload finished"
        );
        summary
    }
}
