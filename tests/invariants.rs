use radiant::problem::Problem;
use radiant::problems::{ClosedBox, MarshakWave, ReferenceProblem, StreamingBeam};
use radiant::RadSystem;

/// Check the floor, density and realizability invariants in every interior
/// zone.
fn check_invariants<P: Problem>(system: &RadSystem<P>) {
    let floor = system.params().erad_floor();
    let c_hat = system.params().c_hat();

    for index in system.span().interior().iter() {
        let u = system.cell(index);
        assert!(u.rad_energy >= floor, "E = {:e} below floor at {:?}", u.rad_energy, index);
        assert!(u.gas_density > 0.0, "non-positive density at {:?}", index);
        assert!(u.gas_internal_energy() >= 0.0, "negative gas energy at {:?}", index);
        assert!(
            u.rad_flux.norm() <= c_hat * u.rad_energy * (1.0 + 1e-12),
            "|F| = {:e} exceeds c_hat E = {:e} at {:?}",
            u.rad_flux.norm(),
            c_hat * u.rad_energy,
            index
        );
    }
}

fn run_checking_invariants<P: ReferenceProblem>(problem: P) {
    let stop_time = problem.stop_time();
    let mut system = problem.build().unwrap();
    check_invariants(&system);

    while system.time() < stop_time - 1e-12 {
        system.advance_timestep(stop_time - system.time()).unwrap();
        check_invariants(&system);
    }
}

#[test]
fn streaming_beam_keeps_the_flux_realizable() {
    run_checking_invariants(StreamingBeam {
        num_zones: 100,
        stop_time: 0.6,
        ..StreamingBeam::default()
    });
}

#[test]
fn streaming_beam_at_reduced_light_speed_keeps_the_flux_realizable() {
    run_checking_invariants(StreamingBeam {
        num_zones: 100,
        stop_time: 2.0,
        c_hat: 0.3,
        ..StreamingBeam::default()
    });
}

#[test]
fn marshak_wave_respects_the_floor() {
    run_checking_invariants(MarshakWave {
        num_zones: 100,
        domain_length: 10.0,
        stop_time: 0.5,
        ..MarshakWave::default()
    });
}

#[test]
fn closed_box_respects_the_floor_in_two_dimensions() {
    run_checking_invariants(ClosedBox {
        num_zones: [16, 16, 1],
        stop_time: 0.5,
        kappa: 100.0,
        ..ClosedBox::default()
    });
}
