use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use flow_core::{RawSample, ReduceCfg, decimate, detect_edges, reduce};

// Synthetic meter capture: square wave with jittered period and occasional idle stretches
fn synth_capture(n: usize, seed: u32) -> Vec<RawSample> {
    // tiny PRNG
    let mut state = seed.max(1);
    let mut next_u32 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    let mut v = Vec::with_capacity(n);
    let mut t: i64 = 0;
    for i in 0..n {
        let r = next_u32();
        // ~100 us sample period, a 2 s idle gap roughly every 5000 samples
        t += 100_000 + i64::from(r % 20_000);
        if r % 5_000 == 0 {
            t += 2_000_000_000;
        }
        v.push(RawSample::new(t, (i / 25) % 2 == 1));
    }
    v
}

pub fn bench_pipeline(c: &mut Criterion) {
    let mut g = c.benchmark_group("pipeline");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p flow_core --bench reduce
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let capture = synth_capture(200_000, 0xC0FFEE);
    let cfg = ReduceCfg::new(0.000847);
    let events = detect_edges(capture.iter().copied(), false).events;

    g.bench_function("detect_edges", |b| {
        b.iter_batched(
            || capture.clone(),
            |s| black_box(detect_edges(s, false)),
            BatchSize::LargeInput,
        )
    });
    g.bench_function("reduce", |b| {
        b.iter_batched(
            || events.clone(),
            |e| black_box(reduce(e, black_box(&cfg))),
            BatchSize::LargeInput,
        )
    });
    for &n in &[10u32, 100] {
        g.bench_function(format!("decimate_every_{n}"), |b| {
            b.iter_batched(
                || reduce(events.clone(), &cfg).unwrap_or_default(),
                |p| black_box(decimate(p, n)),
                BatchSize::LargeInput,
            )
        });
    }
    g.finish();
}

criterion_group!(pipeline, bench_pipeline);
criterion_main!(pipeline);
