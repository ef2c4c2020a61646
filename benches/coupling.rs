//! Criterion benchmarks for the per-zone matter-radiation coupling solve.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use radiant::coupling::CouplingSolver;
use radiant::geometry::Vector3d;
use radiant::problems::{ClosedBox, ReferenceProblem, SuOlsonSource};
use radiant::{Conserved, Parameters};

fn cold_gas() -> Conserved {
    Conserved {
        rad_energy: 1.0,
        rad_flux: Vector3d::new(0.2, 0.0, 0.0),
        gas_energy: 1e-6,
        gas_density: 1.0,
        gas_momentum: Vector3d::zero(),
    }
}

fn bench_single_zone(c: &mut Criterion) {
    let ideal = ClosedBox { kappa: 1e3, ..ClosedBox::default() };
    let su_olson = SuOlsonSource::default();
    let ideal_params = Parameters::new(ideal.parameter_spec()).unwrap();
    let su_olson_params = Parameters::new(su_olson.parameter_spec()).unwrap();

    c.bench_function("coupling_ideal_gas_stiff", |b| {
        let solver = CouplingSolver::new(&ideal_params, &ideal);
        b.iter(|| {
            let mut u = cold_gas();
            solver.solve((0, 0, 0), &mut u, black_box(1e-2), 0.0).unwrap();
            black_box(u)
        })
    });

    c.bench_function("coupling_su_olson_with_source", |b| {
        let solver = CouplingSolver::new(&su_olson_params, &su_olson);
        b.iter(|| {
            let mut u = cold_gas();
            solver.solve((0, 0, 0), &mut u, black_box(1e-2), 1e-2).unwrap();
            black_box(u)
        })
    });
}

fn bench_closed_box_step(c: &mut Criterion) {
    let mut system = ClosedBox {
        num_zones: [64, 64, 1],
        kappa: 100.0,
        ..ClosedBox::default()
    }
    .build()
    .unwrap();

    c.bench_function("advance_closed_box_64x64", |b| {
        b.iter(|| system.advance_timestep(f64::INFINITY).unwrap())
    });
}

criterion_group!(benches, bench_single_zone, bench_closed_box_step);
criterion_main!(benches);
