//! Simulated admission queue.
//!
//! Stands in for a request-processing connection: requests are admitted,
//! wait, and complete. The queue is busy while anything is waiting.
//! Clones share state, so one handle can feed the engine while the
//! workload driver keeps another.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use loadstat_traits::{HostCounters, WorkSource};

#[derive(Debug, Default)]
struct Inner {
    waiting: AtomicU32,
    background: AtomicU32,
    congestion_threshold: AtomicU32,
}

#[derive(Debug, Clone, Default)]
pub struct SimQueue {
    inner: Arc<Inner>,
}

impl SimQueue {
    pub fn new(congestion_threshold: u32) -> Self {
        let q = Self::default();
        q.set_congestion_threshold(congestion_threshold);
        q
    }

    /// Admit one request. Returns the new waiting count.
    pub fn admit(&self) -> u32 {
        self.inner.waiting.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    /// Complete one request. Completing on an empty queue is a no-op.
    pub fn complete(&self) -> u32 {
        let prev = self
            .inner
            .waiting
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |w| w.checked_sub(1));
        match prev {
            Ok(w) => w - 1,
            Err(_) => {
                tracing::trace!("complete on empty queue ignored");
                0
            }
        }
    }

    pub fn waiting(&self) -> u32 {
        self.inner.waiting.load(Ordering::Acquire)
    }

    pub fn set_background(&self, n: u32) {
        self.inner.background.store(n, Ordering::Release);
    }

    pub fn set_congestion_threshold(&self, n: u32) {
        self.inner.congestion_threshold.store(n, Ordering::Release);
    }
}

impl WorkSource for SimQueue {
    fn is_busy(&self) -> bool {
        self.waiting() > 0
    }

    /// The simulated connection never blocks and has no interrupt or
    /// forget traffic, so those fields stay at their defaults.
    fn counters(&self) -> HostCounters {
        let i = &self.inner;
        let waiting = i.waiting.load(Ordering::Acquire);
        HostCounters {
            waiting,
            background: i.background.load(Ordering::Acquire),
            congestion_threshold: i.congestion_threshold.load(Ordering::Acquire),
            pending: waiting > 0,
            ..HostCounters::default()
        }
    }
}
