use approx::assert_relative_eq;
use radiant::problems::{ClosedBox, MarshakWave, ReferenceProblem};

fn assert_closed_box_conserves(problem: ClosedBox) {
    let stop_time = problem.stop_time();
    let mut system = problem.build().unwrap();
    let e0 = system.compute_total_energy();
    let r0 = system.compute_radiation_energy();

    while system.time() < stop_time - 1e-12 {
        system.advance_timestep(stop_time - system.time()).unwrap();
        assert_relative_eq!(system.compute_total_energy(), e0, max_relative = 1e-10);
    }
    assert_eq!(system.boundary_energy_inflow(), 0.0);
    assert!(system.compute_radiation_energy() != r0, "no energy was exchanged");
}

#[test]
fn closed_box_conserves_energy_in_one_dimension() {
    assert_closed_box_conserves(ClosedBox::default());
}

#[test]
fn closed_box_conserves_energy_in_two_dimensions() {
    assert_closed_box_conserves(ClosedBox {
        num_zones: [24, 24, 1],
        stop_time: 0.25,
        ..ClosedBox::default()
    });
}

#[test]
fn closed_box_conserves_energy_in_three_dimensions() {
    assert_closed_box_conserves(ClosedBox {
        num_zones: [8, 8, 8],
        stop_time: 0.2,
        ..ClosedBox::default()
    });
}

#[test]
fn closed_box_conserves_the_reduced_speed_total() {
    assert_closed_box_conserves(ClosedBox {
        c_hat: 0.1,
        stop_time: 2.0,
        ..ClosedBox::default()
    });
}

#[test]
fn closed_box_conserves_energy_with_velocity_dependent_terms() {
    assert_closed_box_conserves(ClosedBox {
        kappa: 10.0,
        gas_velocity: 0.1,
        compute_v_over_c_terms: true,
        ..ClosedBox::default()
    });
}

#[test]
fn open_boundary_energy_change_is_the_boundary_inflow() {
    let problem = MarshakWave {
        num_zones: 100,
        domain_length: 10.0,
        stop_time: 1.0,
        ..MarshakWave::default()
    };
    let mut system = problem.clone().build().unwrap();
    let e0 = system.compute_total_energy();
    let summary = system.evolve(problem.stop_time).unwrap();

    assert!(summary.boundary_energy_inflow > 0.1);
    assert_relative_eq!(
        summary.total_energy - e0,
        summary.boundary_energy_inflow,
        max_relative = 1e-5
    );
}
