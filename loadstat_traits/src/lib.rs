pub mod clock;

pub use clock::{Clock, MonotonicClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;

/// Snapshot of the host's queue counters at sampling time.
///
/// Only `background` and `congestion_threshold` influence the scale
/// decision; the rest is carried into diagnostic records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCounters {
    /// Requests admitted but not yet answered.
    pub waiting: u32,
    /// Outstanding background requests.
    pub background: u32,
    /// Background count above which the host considers itself congested.
    pub congestion_threshold: u32,
    /// Host is refusing new requests.
    pub blocked: bool,
    /// Admission queue non-empty.
    pub pending: bool,
    /// Interrupt queue non-empty.
    pub interrupts: bool,
    /// Forget queue non-empty.
    pub forgets: bool,
}

impl HostCounters {
    #[inline]
    pub fn is_congested(&self) -> bool {
        self.background > self.congestion_threshold
    }
}

/// The monitored resource, as seen by the sampling engine.
pub trait WorkSource {
    /// Whether the resource currently has admitted work waiting.
    fn is_busy(&self) -> bool;

    /// Current host counters. Hosts without background accounting can
    /// rely on the default, which never reports congestion.
    fn counters(&self) -> HostCounters {
        HostCounters::default()
    }
}

impl<T: WorkSource + ?Sized> WorkSource for std::sync::Arc<T> {
    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }
    fn counters(&self) -> HostCounters {
        (**self).counters()
    }
}

impl<T: WorkSource + ?Sized> WorkSource for &T {
    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }
    fn counters(&self) -> HostCounters {
        (**self).counters()
    }
}
