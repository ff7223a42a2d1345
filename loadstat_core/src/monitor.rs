//! Type-state builder and the `Monitor` façade.
//!
//! A `Monitor` ties one `LoadStat` engine to its sampling thread. It is the
//! object a host keeps per monitored resource: admission and completion
//! paths call `start_busy`/`update_busy`, the control surface calls
//! `read`/`write`, and teardown calls `shutdown`.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use loadstat_traits::clock::{Clock, MonotonicClock};
use loadstat_traits::WorkSource;

use crate::config::{AlertPolicy, StatSettings};
use crate::engine::{LoadStat, TickReport};
use crate::error::Result;
use crate::param::Param;
use crate::sampler::{LoopState, SamplingLoop};
use crate::signal::ScaleSignal;

/// Default depth of the diagnostic report channel.
pub const REPORT_CAPACITY: usize = 64;

pub struct Monitor {
    engine: Arc<LoadStat>,
    sampler: SamplingLoop,
    reports: xch::Receiver<TickReport>,
    closed: AtomicBool,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("engine", &self.engine)
            .field("loop_state", &self.sampler.state())
            .finish()
    }
}

impl Monitor {
    /// Start building a Monitor.
    pub fn builder() -> MonitorBuilder<Missing> {
        MonitorBuilder::default()
    }

    /// Host hook: new work was admitted. Arms the sampling loop when it
    /// was dormant.
    pub fn start_busy(&self) {
        if self.engine.start_busy() {
            self.sampler.arm(Duration::ZERO);
        }
    }

    /// Host hook: work completed (or periodic poll).
    pub fn update_busy(&self) {
        self.engine.update_busy();
    }

    pub fn signal(&self) -> ScaleSignal {
        self.engine.signal()
    }

    pub fn load(&self) -> u32 {
        self.engine.load()
    }

    pub fn loop_state(&self) -> LoopState {
        self.sampler.state()
    }

    pub fn settings(&self) -> StatSettings {
        self.engine.config().snapshot()
    }

    pub fn engine(&self) -> &Arc<LoadStat> {
        &self.engine
    }

    /// Current value of a control-surface parameter.
    pub fn read(&self, param: Param) -> u32 {
        match param {
            Param::FreqRequest => u32::from(self.signal().as_u8()),
            Param::Load => self.load(),
            other => other.load_knob(self.engine.config()).unwrap_or_default(),
        }
    }

    /// Store a control-surface parameter; out-of-range and read-only
    /// writes are rejected and leave the stored value unchanged.
    pub fn write(&self, param: Param, value: u32) -> Result<()> {
        param.store(self.engine.config(), u64::from(value))
    }

    /// Parse control-file text and store it.
    pub fn write_str(&self, param: Param, input: &str) -> Result<()> {
        let value = param.parse_value(input)?;
        param.store(self.engine.config(), value)
    }

    /// Diagnostic records, one per tick, best effort.
    pub fn reports(&self) -> &xch::Receiver<TickReport> {
        &self.reports
    }

    /// Publish `ScaleDown`, disable sampling and wait for any in-flight
    /// tick. Nothing runs on behalf of this monitor once this returns.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.engine.force_down();
        self.sampler.cancel();
        tracing::info!("load sampling shut down");
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Monitor`. A work source is required before `build()`.
pub struct MonitorBuilder<S> {
    source: Option<Box<dyn WorkSource + Send + Sync>>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    settings: StatSettings,
    policy: AlertPolicy,
    report_capacity: usize,
    _s: PhantomData<S>,
}

impl Default for MonitorBuilder<Missing> {
    fn default() -> Self {
        Self {
            source: None,
            clock: None,
            settings: StatSettings::default(),
            policy: AlertPolicy::default(),
            report_capacity: REPORT_CAPACITY,
            _s: PhantomData,
        }
    }
}

impl MonitorBuilder<Missing> {
    pub fn with_source<W>(self, source: W) -> MonitorBuilder<Set>
    where
        W: WorkSource + Send + Sync + 'static,
    {
        MonitorBuilder {
            source: Some(Box::new(source)),
            clock: self.clock,
            settings: self.settings,
            policy: self.policy,
            report_capacity: self.report_capacity,
            _s: PhantomData,
        }
    }
}

impl<S> MonitorBuilder<S> {
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + Send + Sync + 'static,
    {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn with_settings(mut self, settings: StatSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_alert_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_report_capacity(mut self, n: usize) -> Self {
        self.report_capacity = n.max(1);
        self
    }

    /// Shorthand for toggling `settings.enabled`.
    pub fn enabled(mut self, on: bool) -> Self {
        self.settings.enabled = on;
        self
    }
}

impl MonitorBuilder<Set> {
    /// Engine without a sampling thread; the caller drives `tick()`.
    pub fn build_engine(self) -> LoadStat {
        let clock: Box<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Box::new(MonotonicClock::new()),
        };
        let source: Box<dyn WorkSource + Send + Sync> = match self.source {
            Some(s) => s,
            // Unreachable through the type-state API.
            None => Box::new(NeverBusy),
        };
        LoadStat::new(source, clock, self.settings, self.policy)
    }

    pub fn build(self) -> Result<Monitor> {
        let capacity = self.report_capacity;
        let settings = self.settings;
        let engine = Arc::new(self.build_engine());
        let (tx, rx) = xch::bounded(capacity);
        let sampler = SamplingLoop::spawn(engine.clone(), tx)?;
        tracing::info!(
            enabled = settings.enabled,
            delay_ms = settings.delay_ms,
            scale_up = settings.scale_up,
            scale_down = settings.scale_down,
            warn = settings.warn,
            "load sampling initialised"
        );
        Ok(Monitor {
            engine,
            sampler,
            reports: rx,
            closed: AtomicBool::new(false),
        })
    }
}

struct NeverBusy;

impl WorkSource for NeverBusy {
    fn is_busy(&self) -> bool {
        false
    }
}
