use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use postpilot_scheduling::{compute_slots, Cadence};

fn bench_compute_slots(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 6, 5, 10, 30, 0).unwrap();

    let typical = Cadence::new(5, [1, 3, 5], [9, 12, 17], chrono_tz::Europe::Amsterdam, false)
        .expect("valid cadence");
    c.bench_function("compute_slots/typical_week", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| compute_slots(black_box(&typical), black_box(now), &mut rng))
    });

    let saturated = Cadence::new(20, [2], [9], chrono_tz::America::New_York, true)
        .expect("valid cadence");
    c.bench_function("compute_slots/saturated_single_day", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| compute_slots(black_box(&saturated), black_box(now), &mut rng))
    });
}

criterion_group!(benches, bench_compute_slots);
criterion_main!(benches);
