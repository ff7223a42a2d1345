use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use loadstat_core::mocks::FlagSource;
use loadstat_core::{Monitor, StatSettings};
use loadstat_traits::ManualClock;

fn settings() -> StatSettings {
    StatSettings {
        enabled: true,
        ..StatSettings::default()
    }
}

pub fn bench_tick(c: &mut Criterion) {
    let mut g = c.benchmark_group("tick");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p loadstat_core --bench tick
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(10));
        }
    } else {
        g.sample_size(50);
    }

    let src = FlagSource::busy();
    let clock = ManualClock::new();
    let engine = Monitor::builder()
        .with_source(src.clone())
        .with_clock(clock.clone())
        .with_settings(settings())
        .build_engine();
    engine.start_busy();

    g.bench_function("busy_window", |b| {
        b.iter(|| {
            clock.advance_ms(100);
            black_box(engine.tick())
        });
    });

    g.bench_function("busy_edges", |b| {
        b.iter_batched(
            || {
                let src = FlagSource::busy();
                let e = Monitor::builder()
                    .with_source(src.clone())
                    .with_clock(ManualClock::new())
                    .with_settings(settings())
                    .build_engine();
                (src, e)
            },
            |(src, e)| {
                for _ in 0..64 {
                    e.start_busy();
                    src.set_busy(false);
                    e.update_busy();
                    src.set_busy(true);
                }
                black_box(e.window_snapshot())
            },
            BatchSize::SmallInput,
        );
    });

    g.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
