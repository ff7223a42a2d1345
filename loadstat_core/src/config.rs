//! Configuration types for the sampling engine.
//!
//! `StatSettings` is the plain value used at construction time. `StatConfig`
//! is the live, lock-free copy the control surface and the sampling tick
//! share. These are separate from the TOML-deserialized config in
//! `loadstat_config`.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Default sampling interval.
pub const DEFAULT_DELAY_MS: u32 = 100;
/// Default alert threshold (percent).
pub const DEFAULT_WARN: u32 = 90;
/// Default scale-up threshold (percent).
pub const DEFAULT_SCALE_UP: u32 = 60;
/// Default scale-down threshold (percent).
pub const DEFAULT_SCALE_DOWN: u32 = 30;
/// Consecutive idle windows after which the sampling loop goes dormant.
pub const IDLE_MAX: u32 = 3;

/// Tunables as a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSettings {
    pub enabled: bool,
    pub primary: bool,
    /// Sampling interval in milliseconds, [0, 1000].
    pub delay_ms: u32,
    /// Load above this requests `ScaleUp`.
    pub scale_up: u32,
    /// Load below this requests `ScaleDown`.
    pub scale_down: u32,
    /// Load above this counts towards the high-load alert; 0 disables alerting.
    pub warn: u32,
    /// Emit a diagnostic event for every tick.
    pub debug: bool,
}

impl Default for StatSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            primary: true,
            delay_ms: DEFAULT_DELAY_MS,
            scale_up: DEFAULT_SCALE_UP,
            scale_down: DEFAULT_SCALE_DOWN,
            warn: DEFAULT_WARN,
            debug: false,
        }
    }
}

/// High-load alert policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    /// Consecutive over-threshold windows before an alert is considered.
    pub streak: u32,
    /// Alerts allowed per `interval`.
    pub burst: u32,
    pub interval: Duration,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            streak: 5,
            burst: 5,
            interval: Duration::from_secs(3),
        }
    }
}

/// Live tunables.
///
/// Individual fields are read and written without the window lock; a tick
/// may observe a mix of old and new values when several knobs change at once.
#[derive(Debug)]
pub struct StatConfig {
    enabled: AtomicBool,
    primary: AtomicBool,
    delay_ms: AtomicU32,
    scale_up: AtomicU32,
    scale_down: AtomicU32,
    warn: AtomicU32,
    debug: AtomicBool,
}

impl Default for StatConfig {
    fn default() -> Self {
        Self::new(StatSettings::default())
    }
}

impl StatConfig {
    pub fn new(s: StatSettings) -> Self {
        Self {
            enabled: AtomicBool::new(s.enabled),
            primary: AtomicBool::new(s.primary),
            delay_ms: AtomicU32::new(s.delay_ms),
            scale_up: AtomicU32::new(s.scale_up),
            scale_down: AtomicU32::new(s.scale_down),
            warn: AtomicU32::new(s.warn),
            debug: AtomicBool::new(s.debug),
        }
    }

    pub fn snapshot(&self) -> StatSettings {
        StatSettings {
            enabled: self.enabled(),
            primary: self.primary(),
            delay_ms: self.delay_ms(),
            scale_up: self.scale_up(),
            scale_down: self.scale_down(),
            warn: self.warn(),
            debug: self.debug(),
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
    #[inline]
    pub fn set_enabled(&self, v: bool) {
        self.enabled.store(v, Ordering::Release);
    }
    #[inline]
    pub fn primary(&self) -> bool {
        self.primary.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.delay_ms()))
    }
    #[inline]
    pub fn set_delay_ms(&self, v: u32) {
        self.delay_ms.store(v, Ordering::Relaxed);
    }
    #[inline]
    pub fn scale_up(&self) -> u32 {
        self.scale_up.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn set_scale_up(&self, v: u32) {
        self.scale_up.store(v, Ordering::Relaxed);
    }
    #[inline]
    pub fn scale_down(&self) -> u32 {
        self.scale_down.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn set_scale_down(&self, v: u32) {
        self.scale_down.store(v, Ordering::Relaxed);
    }
    #[inline]
    pub fn warn(&self) -> u32 {
        self.warn.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn set_warn(&self, v: u32) {
        self.warn.store(v, Ordering::Relaxed);
    }
    #[inline]
    pub fn debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }
    #[inline]
    pub fn set_debug(&self, v: bool) {
        self.debug.store(v, Ordering::Relaxed);
    }
}
