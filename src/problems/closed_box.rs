use super::{dimensionless_spec, ReferenceProblem};
use crate::boundary::GhostZones;
use crate::geometry::Vector3d;
use crate::index_space::Side;
use crate::integrator::IntegratorConfig;
use crate::mesh::Mesh;
use crate::params::ParameterSpec;
use crate::problem::Problem;
use crate::state::Conserved;
use serde::{Deserialize, Serialize};

/// A unit box with reflecting walls on every active axis, holding a
/// Gaussian hot spot of radiation in a uniform gas far from equilibrium
/// with it. Nothing enters or leaves, so `Egas + (c / c_hat) Erad` must
/// stay constant.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedBox {
    /// Zones per side; axes after the first with a single zone are inactive.
    pub num_zones: [i64; 3],
    pub stop_time: f64,
    pub kappa: f64,
    pub c_hat: f64,
    pub gas_temperature: f64,
    pub gas_velocity: f64,
    pub compute_v_over_c_terms: bool,
}

impl Default for ClosedBox {
    fn default() -> Self {
        Self {
            num_zones: [64, 1, 1],
            stop_time: 1.0,
            kappa: 1.0,
            c_hat: 1.0,
            gas_temperature: 0.1,
            gas_velocity: 0.0,
            compute_v_over_c_terms: false,
        }
    }
}

impl Problem for ClosedBox {
    fn planck_opacity(&self, _rho: f64, _tgas: f64) -> f64 {
        self.kappa
    }

    fn fill_ghost_zones(&self, ghosts: &mut GhostZones, _time: f64) {
        let span = ghosts.span();
        for axis in span.active_axes() {
            ghosts.reflect(axis, Side::Lower);
            ghosts.reflect(axis, Side::Upper);
        }
    }
}

impl ReferenceProblem for ClosedBox {
    fn parameter_spec(&self) -> ParameterSpec {
        ParameterSpec {
            c_hat: self.c_hat,
            compute_v_over_c_terms: self.compute_v_over_c_terms,
            ..dimensionless_spec(0.0, 0.4)
        }
    }

    fn mesh(&self) -> Mesh {
        Mesh::new_3d([0.0..1.0, 0.0..1.0, 0.0..1.0], self.num_zones)
    }

    fn integrator_config(&self) -> IntegratorConfig {
        IntegratorConfig::default()
    }

    fn initial_state(&self, x: [f64; 3]) -> Conserved {
        let offset = |n: usize| if self.num_zones[n] > 1 { x[n] - 0.5 } else { 0.0 };
        let (dx, dy, dz) = (offset(0), offset(1), offset(2));
        let rho = 1.0;
        let v = self.gas_velocity;
        let egas = 1.5 * rho * self.gas_temperature + 0.5 * rho * v * v;

        Conserved {
            rad_energy: 0.1 + (-(dx * dx + dy * dy + dz * dz) / 0.01).exp(),
            rad_flux: Vector3d::zero(),
            gas_energy: egas,
            gas_density: rho,
            gas_momentum: Vector3d::new(rho * v, 0.0, 0.0),
        }
    }

    fn stop_time(&self) -> f64 {
        self.stop_time
    }
}
