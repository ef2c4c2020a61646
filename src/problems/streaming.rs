use super::{dimensionless_spec, ReferenceProblem};
use crate::boundary::GhostZones;
use crate::index_space::{Axis, Side};
use crate::integrator::IntegratorConfig;
use crate::mesh::Mesh;
use crate::params::ParameterSpec;
use crate::problem::Problem;
use crate::state::{Conserved, RAD_ENERGY, X1_RAD_FLUX};
use serde::{Deserialize, Serialize};

/// A beam of free-streaming radiation (`|F| = c_hat E`) entering an empty,
/// transparent domain through its left face. The beam front travels at the
/// reduced light speed.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingBeam {
    pub num_zones: i64,
    pub domain_length: f64,
    pub stop_time: f64,
    pub c_hat: f64,
    pub beam_energy: f64,
    pub erad_floor: f64,
}

impl Default for StreamingBeam {
    fn default() -> Self {
        Self {
            num_zones: 200,
            domain_length: 1.0,
            stop_time: 0.5,
            c_hat: 1.0,
            beam_energy: 1.0,
            erad_floor: 1e-10,
        }
    }
}

impl Problem for StreamingBeam {
    fn planck_opacity(&self, _rho: f64, _tgas: f64) -> f64 {
        0.0
    }

    fn fill_ghost_zones(&self, ghosts: &mut GhostZones, _time: f64) {
        let energy = self.beam_energy;
        let flux = self.c_hat * energy;
        ghosts.outflow(Axis::I, Side::Lower);
        ghosts.fill_with(Axis::I, Side::Lower, |_, u| {
            u[RAD_ENERGY] = energy;
            u[X1_RAD_FLUX] = flux;
        });
        ghosts.outflow(Axis::I, Side::Upper);
    }
}

impl ReferenceProblem for StreamingBeam {
    fn parameter_spec(&self) -> ParameterSpec {
        ParameterSpec {
            c_hat: self.c_hat,
            ..dimensionless_spec(self.erad_floor, 0.4)
        }
    }

    fn mesh(&self) -> Mesh {
        Mesh::new_1d(0.0..self.domain_length, self.num_zones)
    }

    fn integrator_config(&self) -> IntegratorConfig {
        IntegratorConfig::default()
    }

    fn initial_state(&self, _x: [f64; 3]) -> Conserved {
        Conserved {
            rad_energy: self.erad_floor,
            gas_energy: 1.0,
            gas_density: 1.0,
            ..Conserved::default()
        }
    }

    fn stop_time(&self) -> f64 {
        self.stop_time
    }
}
