#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config file schema for the load sampling engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty file yields the engine defaults.
use serde::Deserialize;
use std::path::Path;

/// Upper bound for `stat.delay_ms`, matching the control surface limit.
pub const MAX_DELAY_MS: u32 = 1000;
/// Upper bound for the percent thresholds.
pub const MAX_PERCENT: u32 = 100;

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct StatCfg {
    pub enabled: bool,
    pub primary: bool,
    /// Sampling interval in milliseconds, [0, 1000].
    pub delay_ms: u32,
    /// Load percent above which the engine requests a scale-up.
    pub scale_up: u32,
    /// Load percent below which the engine requests a scale-down.
    pub scale_down: u32,
    /// Load percent that counts towards the high-load alert; 0 disables alerts.
    pub warn: u32,
    pub debug: bool,
}

impl Default for StatCfg {
    fn default() -> Self {
        Self {
            enabled: false,
            primary: true,
            delay_ms: 100,
            scale_up: 60,
            scale_down: 30,
            warn: 90,
            debug: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct AlertCfg {
    /// Consecutive over-threshold windows before an alert fires.
    pub streak: u32,
    /// Alerts allowed per `interval_ms`.
    pub burst: u32,
    pub interval_ms: u64,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            streak: 5,
            burst: 5,
            interval_ms: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Synthetic workload used by the `loadstat run` command.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SimCfg {
    /// Total simulated run time.
    pub duration_ms: u64,
    /// Mean admissions per second; 0 keeps the queue idle.
    pub arrival_per_sec: u32,
    /// Service time per request.
    pub service_ms: u64,
    /// Outstanding background requests reported to the engine.
    pub background: u32,
    pub congestion_threshold: u32,
    /// Seed for the arrival jitter.
    pub seed: u64,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            arrival_per_sec: 50,
            service_ms: 10,
            background: 0,
            congestion_threshold: 12,
            seed: 0x5eed,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub stat: StatCfg,
    pub alert: AlertCfg,
    pub logging: Logging,
    pub sim: SimCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Stat
        if self.stat.delay_ms > MAX_DELAY_MS {
            eyre::bail!("stat.delay_ms must be in [0, {MAX_DELAY_MS}]");
        }
        if self.stat.scale_up > MAX_PERCENT {
            eyre::bail!("stat.scale_up must be in [0, {MAX_PERCENT}]");
        }
        if self.stat.scale_down > MAX_PERCENT {
            eyre::bail!("stat.scale_down must be in [0, {MAX_PERCENT}]");
        }
        if self.stat.warn > MAX_PERCENT {
            eyre::bail!("stat.warn must be in [0, {MAX_PERCENT}]");
        }
        // scale_down >= scale_up is legal: it only widens or inverts the normal band.

        // Alert
        if self.alert.streak == 0 {
            eyre::bail!("alert.streak must be >= 1");
        }
        if self.alert.burst == 0 {
            eyre::bail!("alert.burst must be >= 1");
        }
        if self.alert.interval_ms == 0 {
            eyre::bail!("alert.interval_ms must be >= 1");
        }
        if self.alert.interval_ms > 60 * 60 * 1000 {
            eyre::bail!("alert.interval_ms is unreasonably large (>1h)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        // Sim
        if self.sim.duration_ms == 0 {
            eyre::bail!("sim.duration_ms must be >= 1");
        }
        if self.sim.duration_ms > 24 * 60 * 60 * 1000 {
            eyre::bail!("sim.duration_ms is unreasonably large (>24h)");
        }
        if self.sim.arrival_per_sec > 100_000 {
            eyre::bail!("sim.arrival_per_sec must be <= 100000");
        }
        if self.sim.arrival_per_sec > 0 && self.sim.service_ms == 0 {
            eyre::bail!("sim.service_ms must be >= 1 when arrivals are enabled");
        }

        Ok(())
    }
}
