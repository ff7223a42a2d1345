//! The load sampling engine.
//!
//! `LoadStat` owns the tunables, the rolling window and the alerter for one
//! monitored resource. Hosts report busy edges through `start_busy` and
//! `update_busy`; the sampling loop calls `tick` once per window. The
//! engine never schedules anything itself: `start_busy` says whether the
//! loop must be armed and `tick` says when (or whether) to run again.
//!
//! Lock discipline: the window mutex only guards field updates and integer
//! math. Host callbacks, clock reads for the busy snapshot, tracing and the
//! alert check all happen outside it.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use loadstat_traits::{Clock, HostCounters, WorkSource};

use crate::alert::RateLimitedAlerter;
use crate::config::{AlertPolicy, IDLE_MAX, StatConfig, StatSettings};
use crate::signal::ScaleSignal;
use crate::util::load_percent;
use crate::window::StatWindow;

/// Why the sampling loop stopped rescheduling itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DormantReason {
    /// `IDLE_MAX` consecutive idle windows.
    Idle,
    /// The engine was disabled when the tick ran.
    Disabled,
}

/// What the sampling loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Run again after the given delay.
    Reschedule(Duration),
    /// Stop; the next busy edge re-arms the loop.
    Dormant(DormantReason),
}

/// Outcome of one sampling tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Load of the window just closed; `None` when no sample was taken
    /// (first window, zero-length window, or engine disabled).
    pub load: Option<u32>,
    /// Signal in effect after the tick.
    pub signal: ScaleSignal,
    /// Idle streak after this tick's decision.
    pub idle_streak: u32,
    /// Busy predicate as sampled at the start of the tick.
    pub busy: bool,
    pub counters: HostCounters,
    /// A high-load alert was emitted on this tick.
    pub alerted: bool,
    pub next: Continuation,
}

/// Scale decision for one sampled window, before the congestion override.
///
/// Returns the signal and whether the window counts as idle.
#[inline]
pub fn decide(load: u32, busy_now: bool, scale_up: u32, scale_down: u32) -> (ScaleSignal, bool) {
    if load == 0 && !busy_now {
        (ScaleSignal::ScaleDown, true)
    } else if load > scale_up {
        (ScaleSignal::ScaleUp, false)
    } else if load < scale_down {
        (ScaleSignal::ScaleDown, false)
    } else {
        (ScaleSignal::Normal, false)
    }
}

pub struct LoadStat {
    config: StatConfig,
    window: Mutex<StatWindow>,
    alerter: Mutex<RateLimitedAlerter>,
    source: Box<dyn WorkSource + Send + Sync>,
    clock: Box<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for LoadStat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoadStat")
            .field("config", &self.config.snapshot())
            .field("window", &*self.window())
            .finish_non_exhaustive()
    }
}

impl LoadStat {
    /// Fresh engine with a dormant window.
    pub fn new(
        source: Box<dyn WorkSource + Send + Sync>,
        clock: Box<dyn Clock + Send + Sync>,
        settings: StatSettings,
        policy: AlertPolicy,
    ) -> Self {
        Self {
            config: StatConfig::new(settings),
            window: Mutex::new(StatWindow::default()),
            alerter: Mutex::new(RateLimitedAlerter::new(policy)),
            source,
            clock,
        }
    }

    pub fn config(&self) -> &StatConfig {
        &self.config
    }

    /// Copy of the current window state.
    pub fn window_snapshot(&self) -> StatWindow {
        self.window().clone()
    }

    pub fn signal(&self) -> ScaleSignal {
        self.window().signal
    }

    pub fn load(&self) -> u32 {
        self.window().load
    }

    /// Host hook for newly admitted work.
    ///
    /// Returns `true` when this call opened a new window, i.e. the sampling
    /// loop was dormant and must be armed with zero delay.
    pub fn start_busy(&self) -> bool {
        if !self.config.enabled() {
            return false;
        }
        // The caller's view may already be stale.
        if !self.source.is_busy() {
            return false;
        }
        let now = self.clock.now();
        let mut w = self.window();
        let opened = if w.is_open() {
            false
        } else {
            w.open(now);
            true
        };
        w.open_busy(now);
        opened
    }

    /// Host hook for completed work; closes the busy interval once the
    /// resource has drained.
    pub fn update_busy(&self) {
        if !self.config.enabled() {
            return;
        }
        let busy = self.source.is_busy();
        let now = self.clock.now();
        let mut w = self.window();
        if !busy {
            w.close_busy(now);
        }
    }

    /// Close the current window, decide the scale signal and open the next
    /// window.
    pub fn tick(&self) -> TickReport {
        if !self.config.enabled() {
            return self.go_dormant();
        }

        let busy = self.source.is_busy();
        let counters = self.source.counters();
        let scale_up = self.config.scale_up();
        let scale_down = self.config.scale_down();
        let now = self.clock.now();

        let mut w = self.window();
        // Re-checked under the lock so a concurrent `force_down` always wins.
        if !self.config.enabled() {
            drop(w);
            return self.go_dormant();
        }
        let mut load = None;
        if let Some(start) = w.window_start {
            w.close_busy(now);
            let elapsed = now.saturating_duration_since(start);
            if let Some(pct) = load_percent(w.busy_total, elapsed) {
                let (mut signal, idle) = decide(pct, busy, scale_up, scale_down);
                // Only consecutive idle windows count toward quiescence.
                w.idle_streak = if idle { w.idle_streak + 1 } else { 0 };
                if counters.is_congested() {
                    signal = ScaleSignal::ScaleUp;
                }
                w.load = pct;
                w.signal = signal;
                load = Some(pct);
            }
        }
        w.rearm(now, busy);
        let signal = w.signal;
        let idle_streak = w.idle_streak;
        let quiesce = idle_streak >= IDLE_MAX;
        if quiesce {
            w.quiesce();
        }
        drop(w);

        if self.config.debug() {
            tracing::debug!(
                load = ?load,
                signal = %signal,
                waiting = counters.waiting,
                background = counters.background,
                congestion_threshold = counters.congestion_threshold,
                blocked = counters.blocked,
                pending = counters.pending,
                interrupts = counters.interrupts,
                forgets = counters.forgets,
                "load sample"
            );
        }

        let alerted = load.is_some_and(|pct| self.check_alert(pct, now, &counters));

        let next = if quiesce {
            if self.config.debug() {
                tracing::debug!(idle_streak, "sampling loop stopped");
            }
            Continuation::Dormant(DormantReason::Idle)
        } else {
            Continuation::Reschedule(self.config.delay())
        };

        TickReport {
            load,
            signal,
            idle_streak,
            busy,
            counters,
            alerted,
            next,
        }
    }

    /// Force `ScaleDown` and disable the engine. Ticks that still run see
    /// the engine disabled and go dormant.
    pub fn force_down(&self) {
        self.config.set_enabled(false);
        self.window().signal = ScaleSignal::ScaleDown;
    }

    fn go_dormant(&self) -> TickReport {
        let signal = {
            let mut w = self.window();
            w.quiesce();
            w.signal
        };
        tracing::debug!("sampling disabled; loop going dormant");
        TickReport {
            load: None,
            signal,
            idle_streak: 0,
            busy: false,
            counters: HostCounters::default(),
            alerted: false,
            next: Continuation::Dormant(DormantReason::Disabled),
        }
    }

    fn check_alert(&self, load: u32, now: Instant, c: &HostCounters) -> bool {
        let threshold = self.config.warn();
        let alert = self
            .alerter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(load, threshold, now);
        match alert {
            Some(a) => {
                tracing::warn!(
                    load = a.load,
                    threshold = a.threshold,
                    waiting = c.waiting,
                    background = c.background,
                    blocked = c.blocked,
                    pending = c.pending,
                    interrupts = c.interrupts,
                    forgets = c.forgets,
                    "load is high"
                );
                true
            }
            None => false,
        }
    }

    /// Alerter state; only the tick path mutates it.
    pub fn alert_streak(&self) -> u32 {
        self.alerter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .streak()
    }

    fn window(&self) -> MutexGuard<'_, StatWindow> {
        // Critical sections cannot panic halfway through an update, so a
        // poisoned lock still holds a consistent window.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
