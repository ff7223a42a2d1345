//! Rolling-window accumulator.
//!
//! A window runs from one sampling tick to the next. Busy intervals opened
//! and closed inside it are summed into `busy_total`. All mutation happens
//! under the engine lock; nothing here reads the clock on its own.

use std::time::{Duration, Instant};

use crate::signal::ScaleSignal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatWindow {
    /// `None` while the sampling loop is dormant.
    pub(crate) window_start: Option<Instant>,
    pub(crate) busy_total: Duration,
    /// Start of the currently open busy interval, if any.
    pub(crate) busy_start: Option<Instant>,
    pub(crate) load: u32,
    pub(crate) idle_streak: u32,
    pub(crate) signal: ScaleSignal,
}

impl StatWindow {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.window_start.is_some()
    }

    #[inline]
    pub fn is_busy_open(&self) -> bool {
        self.busy_start.is_some()
    }

    pub fn window_start(&self) -> Option<Instant> {
        self.window_start
    }

    pub fn busy_total(&self) -> Duration {
        self.busy_total
    }

    pub fn load(&self) -> u32 {
        self.load
    }

    pub fn idle_streak(&self) -> u32 {
        self.idle_streak
    }

    pub fn signal(&self) -> ScaleSignal {
        self.signal
    }

    /// Start a fresh window with no busy time and no open interval.
    pub(crate) fn open(&mut self, now: Instant) {
        self.window_start = Some(now);
        self.busy_total = Duration::ZERO;
        self.busy_start = None;
    }

    /// Open a busy interval unless one is already open.
    pub(crate) fn open_busy(&mut self, now: Instant) -> bool {
        if self.busy_start.is_some() {
            return false;
        }
        self.busy_start = Some(now);
        true
    }

    /// Fold the open busy interval (if any) into `busy_total` and close it.
    pub(crate) fn close_busy(&mut self, now: Instant) -> bool {
        match self.busy_start.take() {
            Some(start) => {
                self.busy_total += now.saturating_duration_since(start);
                true
            }
            None => false,
        }
    }

    /// Start the next window at `now`, carrying ongoing activity over.
    pub(crate) fn rearm(&mut self, now: Instant, busy_now: bool) {
        self.open(now);
        if busy_now {
            self.busy_start = Some(now);
        }
    }

    /// Drop the window entirely; the next busy edge starts from scratch.
    pub(crate) fn quiesce(&mut self) {
        self.window_start = None;
        self.busy_total = Duration::ZERO;
        self.busy_start = None;
        self.idle_streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_intervals_accumulate() {
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        let mut w = StatWindow::default();
        w.open(t0);
        assert!(w.open_busy(t0 + ms(10)));
        assert!(!w.open_busy(t0 + ms(15)));
        assert!(w.close_busy(t0 + ms(30)));
        assert!(!w.close_busy(t0 + ms(35)));
        assert!(w.open_busy(t0 + ms(50)));
        assert!(w.close_busy(t0 + ms(55)));
        assert_eq!(w.busy_total(), ms(25));
    }

    #[test]
    fn rearm_carries_open_interval() {
        let t0 = Instant::now();
        let mut w = StatWindow::default();
        w.open(t0);
        w.busy_total = Duration::from_millis(40);
        let t1 = t0 + Duration::from_millis(100);
        w.rearm(t1, true);
        assert_eq!(w.window_start(), Some(t1));
        assert_eq!(w.busy_total(), Duration::ZERO);
        assert_eq!(w.busy_start, Some(t1));
        w.rearm(t1, false);
        assert!(!w.is_busy_open());
    }

    #[test]
    fn quiesce_clears_window_and_idle_streak() {
        let mut w = StatWindow::default();
        w.open(Instant::now());
        w.idle_streak = 3;
        w.quiesce();
        assert!(!w.is_open());
        assert_eq!(w.idle_streak(), 0);
    }
}
