//! Test and helper mocks for loadstat_core

use loadstat_traits::{HostCounters, WorkSource};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// A work source whose busy flag and counters are set by hand.
/// Clones share state, so a test can keep one handle and give the other
/// to the engine.
#[derive(Debug, Clone, Default)]
pub struct FlagSource {
    busy: Arc<AtomicBool>,
    background: Arc<AtomicU32>,
    congestion_threshold: Arc<AtomicU32>,
}

impl FlagSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn busy() -> Self {
        let s = Self::default();
        s.set_busy(true);
        s
    }

    pub fn set_busy(&self, v: bool) {
        self.busy.store(v, Ordering::SeqCst);
    }

    pub fn set_background(&self, v: u32) {
        self.background.store(v, Ordering::SeqCst);
    }

    pub fn set_congestion_threshold(&self, v: u32) {
        self.congestion_threshold.store(v, Ordering::SeqCst);
    }
}

impl WorkSource for FlagSource {
    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn counters(&self) -> HostCounters {
        let busy = self.is_busy();
        HostCounters {
            waiting: u32::from(busy),
            background: self.background.load(Ordering::SeqCst),
            congestion_threshold: self.congestion_threshold.load(Ordering::SeqCst),
            pending: busy,
            ..HostCounters::default()
        }
    }
}
