//! Command implementations: config mapping, monitor assembly, and output.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use eyre::WrapErr;
use loadstat_config::{Config, SimCfg};
use loadstat_core::{
    AlertPolicy, Continuation, DormantReason, IDLE_MAX, LoopState, Monitor, Param, StatSettings,
    TickReport,
};
use loadstat_sim::util::wait_until_with_timeout;
use loadstat_sim::{SimQueue, SimWorkload, WorkloadCfg, WorkloadSummary};
use loadstat_traits::MonotonicClock;
use serde_json::json;

/// Overrides for the `[sim]` section taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct SimOverrides {
    pub duration_ms: Option<u64>,
    pub arrival_per_sec: Option<u32>,
    pub service_ms: Option<u64>,
    pub background: Option<u32>,
    pub seed: Option<u64>,
}

impl SimOverrides {
    pub fn apply(&self, base: &SimCfg) -> SimCfg {
        let mut s = base.clone();
        if let Some(v) = self.duration_ms {
            s.duration_ms = v;
        }
        if let Some(v) = self.arrival_per_sec {
            s.arrival_per_sec = v;
        }
        if let Some(v) = self.service_ms {
            s.service_ms = v;
        }
        if let Some(v) = self.background {
            s.background = v;
        }
        if let Some(v) = self.seed {
            s.seed = v;
        }
        s
    }
}

/// Split `name=value` and write it through the control surface.
pub fn apply_set(monitor: &Monitor, assignment: &str) -> eyre::Result<Param> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| eyre::eyre!("--set expects NAME=VALUE, got {assignment:?}"))?;
    let param: Param = name.parse()?;
    monitor.write_str(param, value)?;
    tracing::info!(param = %param, value = monitor.read(param), "parameter set");
    Ok(param)
}

fn build_monitor(cfg: &Config, queue: &SimQueue, settings: StatSettings) -> eyre::Result<Monitor> {
    let monitor = Monitor::builder()
        .with_source(queue.clone())
        .with_settings(settings)
        .with_alert_policy(AlertPolicy::from(&cfg.alert))
        .build()?;
    Ok(monitor)
}

pub fn next_name(next: Continuation) -> &'static str {
    match next {
        Continuation::Reschedule(_) => "reschedule",
        Continuation::Dormant(DormantReason::Idle) => "dormant_idle",
        Continuation::Dormant(DormantReason::Disabled) => "dormant_disabled",
    }
}

fn report_json(r: &TickReport, t_ms: u64) -> serde_json::Value {
    json!({
        "t_ms": t_ms,
        "load": r.load,
        "signal": r.signal.name(),
        "freq_request": r.signal.as_u8(),
        "idle_streak": r.idle_streak,
        "busy": r.busy,
        "waiting": r.counters.waiting,
        "background": r.counters.background,
        "congested": r.counters.is_congested(),
        "alerted": r.alerted,
        "next": next_name(r.next),
    })
}

fn print_report(r: &TickReport, start: Instant, json_mode: bool) {
    let t_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    if json_mode {
        println!("{}", report_json(r, t_ms));
        return;
    }
    let load = r
        .load
        .map_or_else(|| "-".to_string(), |l| format!("{l:>3}%"));
    println!(
        "{t_ms:>6}ms load={load} signal={:<10} idle={} waiting={:<3} background={}{}{}",
        r.signal.name(),
        r.idle_streak,
        r.counters.waiting,
        r.counters.background,
        if r.alerted { " ALERT" } else { "" },
        match r.next {
            Continuation::Reschedule(_) => "",
            Continuation::Dormant(_) => " (loop stopped)",
        }
    );
}

fn print_summary(summary: &WorkloadSummary, monitor: &Monitor, ticks: u64, json_mode: bool) {
    let busy_ms = u64::try_from(summary.busy.as_millis()).unwrap_or(u64::MAX);
    let elapsed_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX);
    if json_mode {
        println!(
            "{}",
            json!({
                "summary": {
                    "arrivals": summary.arrivals,
                    "completions": summary.completions,
                    "max_waiting": summary.max_waiting,
                    "busy_ms": busy_ms,
                    "elapsed_ms": elapsed_ms,
                    "interrupted": summary.interrupted,
                    "ticks": ticks,
                    "final_signal": monitor.signal().name(),
                }
            })
        );
        return;
    }
    println!(
        "run complete: {} arrivals, {} completions, max waiting {}, busy {busy_ms}ms of {elapsed_ms}ms, {ticks} ticks, final signal {}{}",
        summary.arrivals,
        summary.completions,
        summary.max_waiting,
        monitor.signal(),
        if summary.interrupted {
            " (interrupted)"
        } else {
            ""
        }
    );
}

/// Run the simulated workload against a live monitor, streaming one line
/// per tick until the workload ends and the loop goes idle.
pub fn run_sim(
    cfg: &Config,
    overrides: &SimOverrides,
    sets: &[String],
    no_drain: bool,
    json_mode: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<WorkloadSummary> {
    let sim = overrides.apply(&cfg.sim);
    let workload = SimWorkload::new(WorkloadCfg::from(&sim))?;
    let queue = SimQueue::new(sim.congestion_threshold);

    // A simulator run is the opt-in; `--set is_enabled=0` still wins.
    let settings = StatSettings {
        enabled: true,
        ..StatSettings::from(&cfg.stat)
    };
    let monitor = build_monitor(cfg, &queue, settings)?;
    for s in sets {
        apply_set(&monitor, s)?;
    }

    let start = Instant::now();
    let clock = MonotonicClock::new();
    let mut ticks = 0u64;
    let summary = std::thread::scope(|scope| -> eyre::Result<WorkloadSummary> {
        let worker = std::thread::Builder::new()
            .name("loadstat-workload".into())
            .spawn_scoped(scope, || workload.run(&monitor, &queue, &clock, &shutdown))
            .wrap_err("spawn workload thread")?;
        while !worker.is_finished() {
            if let Ok(r) = monitor.reports().recv_timeout(Duration::from_millis(50)) {
                ticks += 1;
                print_report(&r, start, json_mode);
            }
        }
        worker
            .join()
            .map_err(|_| eyre::eyre!("workload thread panicked"))
    })?;

    if !no_drain {
        // Enough for the trailing idle windows plus one in flight.
        let delay = monitor.engine().config().delay();
        let budget = delay * (IDLE_MAX + 2) + Duration::from_secs(1);
        let drained = wait_until_with_timeout(
            || {
                for r in monitor.reports().try_iter() {
                    ticks += 1;
                    print_report(&r, start, json_mode);
                }
                monitor.loop_state() == LoopState::Dormant
                    && monitor.reports().is_empty()
            },
            budget,
            Duration::from_millis(5),
        );
        if let Err(e) = drained {
            if summary.interrupted {
                tracing::debug!(error = %e, "skipping drain after interrupt");
            } else {
                monitor.shutdown();
                return Err(e.into());
            }
        }
    }

    monitor.shutdown();
    for r in monitor.reports().try_iter() {
        ticks += 1;
        print_report(&r, start, json_mode);
    }
    print_summary(&summary, &monitor, ticks, json_mode);
    Ok(summary)
}

/// Print the control parameter table, after applying any `--set` writes.
pub fn show_params(cfg: &Config, sets: &[String], json_mode: bool) -> eyre::Result<()> {
    let queue = SimQueue::new(cfg.sim.congestion_threshold);
    let monitor = build_monitor(cfg, &queue, StatSettings::from(&cfg.stat))?;
    for s in sets {
        apply_set(&monitor, s)?;
    }
    for p in Param::ALL {
        let value = monitor.read(p);
        if json_mode {
            println!(
                "{}",
                json!({
                    "name": p.name(),
                    "value": value,
                    "writable": p.is_writable(),
                    "max": p.max(),
                })
            );
        } else {
            let access = if p.is_writable() { "rw" } else { "ro" };
            println!("{:<22} {value:>6}  {access}  [0, {}]", p.name(), p.max());
        }
    }
    monitor.shutdown();
    Ok(())
}

/// Report the effective configuration. Loading already validated it.
pub fn check(cfg: &Config, json_mode: bool) {
    let s = StatSettings::from(&cfg.stat);
    let a = AlertPolicy::from(&cfg.alert);
    if json_mode {
        println!(
            "{}",
            json!({
                "ok": true,
                "stat": {
                    "enabled": s.enabled,
                    "primary": s.primary,
                    "delay_ms": s.delay_ms,
                    "scale_up": s.scale_up,
                    "scale_down": s.scale_down,
                    "warn": s.warn,
                    "debug": s.debug,
                },
                "alert": {
                    "streak": a.streak,
                    "burst": a.burst,
                    "interval_ms": u64::try_from(a.interval.as_millis()).unwrap_or(u64::MAX),
                },
            })
        );
        return;
    }
    println!("config ok");
    println!(
        "stat: enabled={} primary={} delay_ms={} scale_up={} scale_down={} warn={} debug={}",
        s.enabled, s.primary, s.delay_ms, s.scale_up, s.scale_down, s.warn, s.debug
    );
    if s.scale_down > s.scale_up {
        println!("note: scale_down > scale_up; scale-up takes priority inside the overlap");
    }
    println!(
        "alert: streak={} burst={} interval={:?}",
        a.streak, a.burst, a.interval
    );
}
