use criterion::{black_box, criterion_group, criterion_main, Criterion};

use useg::infer_bounds;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("infer_bounds/exact", |b| {
        b.iter(|| infer_bounds(black_box(&["pes", "vod"]), black_box("pesvod")).unwrap())
    });

    c.bench_function("infer_bounds/divergent", |b| {
        b.iter(|| {
            infer_bounds(
                black_box(&["nej", "ne", "zapomenout", "elný", "ější"]),
                black_box("nejnezapomenutelnější"),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
