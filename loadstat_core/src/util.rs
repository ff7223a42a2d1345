//! Common time/percent helpers for loadstat_core.

use std::time::Duration;

/// Shortest window that yields a sample. A window opened by a busy edge and
/// closed by the immediate first tick is below this and counts as empty.
pub const MIN_WINDOW: Duration = Duration::from_millis(1);

/// Whole microseconds in `d`, saturating at `u64::MAX`.
#[inline]
pub fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

/// Busy share of a window as an integer percent, rounded down.
///
/// - Returns `None` when the window is shorter than `MIN_WINDOW`; the
///   caller should skip the sample and keep its previous decision.
/// - Not clamped: accounting jitter can push the result past 100.
#[inline]
pub fn load_percent(busy: Duration, elapsed: Duration) -> Option<u32> {
    if elapsed < MIN_WINDOW {
        return None;
    }
    let pct = u128::from(micros(busy)) * 100 / u128::from(micros(elapsed));
    Some(u32::try_from(pct).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_to_whole_percent() {
        let ms = Duration::from_millis;
        assert_eq!(load_percent(ms(100), ms(100)), Some(100));
        assert_eq!(load_percent(ms(0), ms(100)), Some(0));
        assert_eq!(load_percent(ms(33), ms(100)), Some(33));
        assert_eq!(load_percent(Duration::from_micros(999), ms(100)), Some(0));
        assert_eq!(load_percent(Duration::from_micros(1_999), ms(2)), Some(99));
    }

    #[test]
    fn zero_length_window_yields_no_sample() {
        assert_eq!(load_percent(Duration::ZERO, Duration::ZERO), None);
        assert_eq!(load_percent(Duration::from_millis(5), Duration::from_nanos(999)), None);
    }

    #[test]
    fn sub_millisecond_window_yields_no_sample() {
        let us = Duration::from_micros;
        assert_eq!(load_percent(us(98), us(98)), None);
        assert_eq!(load_percent(us(1), us(999)), None);
        assert_eq!(load_percent(us(500), MIN_WINDOW), Some(50));
    }

    #[test]
    fn busy_longer_than_window_is_not_clamped() {
        let ms = Duration::from_millis;
        assert_eq!(load_percent(ms(110), ms(100)), Some(110));
    }
}
