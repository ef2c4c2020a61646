use super::{dimensionless_spec, ReferenceProblem, SuOlsonMaterial};
use crate::boundary::GhostZones;
use crate::index_space::{Axis, Side};
use crate::integrator::IntegratorConfig;
use crate::mesh::Mesh;
use crate::params::{ParameterSpec, Parameters};
use crate::problem::Problem;
use crate::state::{Conserved, RAD_ENERGY, X1_RAD_FLUX};
use serde::{Deserialize, Serialize};

/// The classical Marshak wave: a cold slab of Su-Olson material heated
/// through its left face by an incident radiation field at the hohlraum
/// temperature, with `F = c E_inc / 4`. The right face reflects. Lengths
/// are in mean free paths and times in units of `1 / (eps c rho kappa)`.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshakWave {
    pub num_zones: i64,
    pub domain_length: f64,
    pub stop_time: f64,
    pub kappa: f64,
    pub eps: f64,
    pub t_hohlraum: f64,
}

impl Default for MarshakWave {
    fn default() -> Self {
        Self {
            num_zones: 1500,
            domain_length: 100.0,
            stop_time: 10.0,
            kappa: 1.0,
            eps: 1.0,
            t_hohlraum: 1.0,
        }
    }
}

impl MarshakWave {
    fn material(&self) -> SuOlsonMaterial {
        SuOlsonMaterial::new(1.0, self.eps)
    }

    fn incident_energy(&self) -> f64 {
        self.t_hohlraum.powi(4)
    }
}

impl Problem for MarshakWave {
    fn planck_opacity(&self, rho: f64, _tgas: f64) -> f64 {
        self.kappa / rho
    }

    fn egas_from_tgas(&self, _params: &Parameters, _rho: f64, tgas: f64) -> f64 {
        self.material().egas_from_tgas(tgas)
    }

    fn tgas_from_egas(&self, _params: &Parameters, _rho: f64, egas: f64) -> f64 {
        self.material().tgas_from_egas(egas)
    }

    fn egas_temp_derivative(&self, _params: &Parameters, _rho: f64, tgas: f64) -> f64 {
        self.material().egas_temp_derivative(tgas)
    }

    fn fill_ghost_zones(&self, ghosts: &mut GhostZones, _time: f64) {
        let e_inc = self.incident_energy();
        ghosts.outflow(Axis::I, Side::Lower);
        ghosts.fill_with(Axis::I, Side::Lower, |_, u| {
            u[RAD_ENERGY] = e_inc;
            u[X1_RAD_FLUX] = 0.25 * e_inc;
        });
        ghosts.reflect(Axis::I, Side::Upper);
    }
}

impl ReferenceProblem for MarshakWave {
    fn parameter_spec(&self) -> ParameterSpec {
        dimensionless_spec(1e-10 * self.incident_energy(), 0.4)
    }

    fn mesh(&self) -> Mesh {
        Mesh::new_1d(0.0..self.domain_length, self.num_zones)
    }

    fn integrator_config(&self) -> IntegratorConfig {
        IntegratorConfig {
            initial_dt: Some(1e-9),
            max_dt: Some(1e-2),
            max_timesteps: 200_000,
            ..IntegratorConfig::default()
        }
    }

    fn initial_state(&self, _x: [f64; 3]) -> Conserved {
        Conserved {
            rad_energy: 1e-10 * self.incident_energy(),
            gas_energy: 1e-10 * self.material().egas_from_tgas(self.t_hohlraum),
            gas_density: 1.0,
            ..Conserved::default()
        }
    }

    fn stop_time(&self) -> f64 {
        self.stop_time
    }
}
