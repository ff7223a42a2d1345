use loadstat_core::mocks::FlagSource;
use loadstat_core::{Monitor, Param, ScaleSignal, StatSettings, decide};
use loadstat_traits::ManualClock;
use proptest::prelude::*;

proptest! {
    #[test]
    fn above_scale_up_always_scales_up(
        up in 0u32..100,
        down in 0u32..=100,
        busy in any::<bool>(),
        extra in 1u32..=100,
    ) {
        let load = up.saturating_add(extra).min(100).max(up + 1);
        let (signal, idle) = decide(load, busy, up, down);
        prop_assert_eq!(signal, ScaleSignal::ScaleUp);
        prop_assert!(!idle);
    }

    #[test]
    fn below_scale_down_scales_down(
        down in 1u32..=100,
        up in 0u32..=100,
        busy in any::<bool>(),
        frac in 0.0f64..1.0,
    ) {
        let load = ((f64::from(down) * frac) as u32).min(down - 1);
        prop_assume!(load <= up);
        let (signal, _) = decide(load, busy, up, down);
        prop_assert_eq!(signal, ScaleSignal::ScaleDown);
    }

    #[test]
    fn load_inside_the_band_is_normal(
        down in 0u32..=100,
        width in 0u32..=100,
        offset in 0u32..=100,
        busy in any::<bool>(),
    ) {
        let up = down.saturating_add(width).min(100);
        let load = down + offset % (up - down + 1);
        prop_assume!(load > 0 || busy);
        let (signal, idle) = decide(load, busy, up, down);
        prop_assert_eq!(signal, ScaleSignal::Normal);
        prop_assert!(!idle);
    }

    #[test]
    fn idle_window_bumps_streak_by_exactly_one(prior_idle in 0u32..2) {
        let src = FlagSource::new();
        let clock = ManualClock::new();
        let e = Monitor::builder()
            .with_source(src.clone())
            .with_clock(clock.clone())
            .enabled(true)
            .build_engine();

        src.set_busy(true);
        e.start_busy();
        src.set_busy(false);
        e.update_busy();
        for _ in 0..prior_idle {
            clock.advance_ms(100);
            e.tick();
        }
        clock.advance_ms(100);
        let r = e.tick();
        prop_assert_eq!(r.load, Some(0));
        prop_assert_eq!(r.idle_streak, prior_idle + 1);
        prop_assert_eq!(r.signal, ScaleSignal::ScaleDown);
    }

    #[test]
    fn congestion_forces_scale_up(
        busy_ms in 0u64..=100,
        threshold in 0u32..64,
        over in 1u32..64,
    ) {
        let src = FlagSource::new();
        let clock = ManualClock::new();
        let e = Monitor::builder()
            .with_source(src.clone())
            .with_clock(clock.clone())
            .enabled(true)
            .build_engine();

        src.set_busy(true);
        e.start_busy();
        clock.advance_ms(busy_ms);
        src.set_busy(false);
        e.update_busy();
        clock.advance_ms(100 - busy_ms);
        src.set_congestion_threshold(threshold);
        src.set_background(threshold + over);

        prop_assert_eq!(e.tick().signal, ScaleSignal::ScaleUp);
    }

    #[test]
    fn load_never_exceeds_100_for_busy_time_within_window(
        busy_ms in 0u64..=1000,
        idle_ms in 0u64..=1000,
    ) {
        prop_assume!(busy_ms + idle_ms > 0);
        let src = FlagSource::busy();
        let clock = ManualClock::new();
        let e = Monitor::builder()
            .with_source(src.clone())
            .with_clock(clock.clone())
            .enabled(true)
            .build_engine();

        e.start_busy();
        clock.advance_ms(busy_ms);
        src.set_busy(false);
        e.update_busy();
        clock.advance_ms(idle_ms);
        let load = e.tick().load.unwrap_or_default();
        prop_assert!(load <= 100);
        prop_assert_eq!(u64::from(load), busy_ms * 100 / (busy_ms + idle_ms));
    }

    #[test]
    fn rejected_writes_keep_the_stored_value(
        param_idx in 0usize..Param::ALL.len(),
        value in any::<u32>(),
    ) {
        let param = Param::ALL[param_idx];
        let m = Monitor::builder()
            .with_source(FlagSource::new())
            .with_settings(StatSettings::default())
            .build()
            .unwrap();
        let before = m.read(param);
        match m.write(param, value) {
            Ok(()) => {
                prop_assert!(param.is_writable());
                prop_assert!(value <= param.max());
                prop_assert_eq!(m.read(param), value);
            }
            Err(_) => prop_assert_eq!(m.read(param), before),
        }
    }
}
