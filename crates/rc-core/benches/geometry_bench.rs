//! Criterion benchmarks for pointer coordinate mapping.
//!
//! Every pointer drag event is mapped once, so this sits on the hot path
//! together with the codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package rc-core --bench geometry_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rc_core::domain::geometry::{map_to_device, Point, Size};

fn bench_map_to_device(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");
    let view = Size::new(300.0, 600.0);

    for (label, remote) in [
        ("same_orientation", Size::new(1080.0, 1920.0)),
        ("swapped_orientation", Size::new(1920.0, 1080.0)),
    ] {
        group.bench_with_input(BenchmarkId::new("map_to_device", label), &remote, |b, &remote| {
            b.iter(|| map_to_device(black_box(Point::new(150.0, 300.0)), view, remote))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_map_to_device);
criterion_main!(benches);
