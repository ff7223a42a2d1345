//! `From` implementations bridging `loadstat_config` types to `loadstat_core` types.

use std::time::Duration;

use crate::config::{AlertPolicy, StatSettings};

// ── StatSettings ─────────────────────────────────────────────────────────────

impl From<&loadstat_config::StatCfg> for StatSettings {
    fn from(c: &loadstat_config::StatCfg) -> Self {
        Self {
            enabled: c.enabled,
            primary: c.primary,
            delay_ms: c.delay_ms,
            scale_up: c.scale_up,
            scale_down: c.scale_down,
            warn: c.warn,
            debug: c.debug,
        }
    }
}

// ── AlertPolicy ──────────────────────────────────────────────────────────────

impl From<&loadstat_config::AlertCfg> for AlertPolicy {
    fn from(c: &loadstat_config::AlertCfg) -> Self {
        Self {
            streak: c.streak,
            burst: c.burst,
            interval: Duration::from_millis(c.interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_defaults_match_engine_defaults() {
        let cfg = loadstat_config::Config::default();
        assert_eq!(StatSettings::from(&cfg.stat), StatSettings::default());
        assert_eq!(AlertPolicy::from(&cfg.alert), AlertPolicy::default());
    }
}
