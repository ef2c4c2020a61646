//! Criterion benchmarks for the transport sweep.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use radiant::flux::TransportUpdate;
use radiant::problems::{ClosedBox, ReferenceProblem, StreamingBeam};

fn bench_transport(c: &mut Criterion) {
    let mut beam = StreamingBeam { num_zones: 4096, ..StreamingBeam::default() }.build().unwrap();
    let mut square = ClosedBox { num_zones: [128, 128, 1], ..ClosedBox::default() }.build().unwrap();

    // The guard zones of a freshly built system are empty until its first step.
    beam.advance_timestep(f64::INFINITY).unwrap();
    square.advance_timestep(f64::INFINITY).unwrap();

    c.bench_function("transport_1d_4096", |b| {
        b.iter(|| {
            TransportUpdate::compute(
                beam.state(),
                beam.span(),
                beam.mesh(),
                beam.params(),
                beam.problem(),
                black_box(beam.dt()),
            )
        })
    });

    c.bench_function("transport_2d_128x128", |b| {
        b.iter(|| {
            TransportUpdate::compute(
                square.state(),
                square.span(),
                square.mesh(),
                square.params(),
                square.problem(),
                black_box(square.dt()),
            )
        })
    });
}

criterion_group!(benches, bench_transport);
criterion_main!(benches);
