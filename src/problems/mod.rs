//! Reference problems with known behavior: each supplies its parameters,
//! mesh, initial condition and run controls along with its policies, so it
//! can be built into a `RadSystem` in one call.

use crate::error::Result;
use crate::integrator::{IntegratorConfig, RadSystem};
use crate::mesh::Mesh;
use crate::params::{ParameterSpec, Parameters};
use crate::problem::Problem;
use crate::state::Conserved;

mod closed_box;
mod marshak;
mod pulse;
mod streaming;
mod su_olson;

pub use closed_box::ClosedBox;
pub use marshak::MarshakWave;
pub use pulse::GaussianPulse;
pub use streaming::StreamingBeam;
pub use su_olson::SuOlsonSource;

/// A problem that knows how to set itself up.
///
pub trait ReferenceProblem: Problem + Clone + Sized {
    fn parameter_spec(&self) -> ParameterSpec;
    fn mesh(&self) -> Mesh;
    fn integrator_config(&self) -> IntegratorConfig;
    fn initial_state(&self, x: [f64; 3]) -> Conserved;
    fn stop_time(&self) -> f64;

    fn start_time(&self) -> f64 {
        0.0
    }

    fn build(self) -> Result<RadSystem<Self>> {
        let params = Parameters::new(self.parameter_spec())?;
        let mesh = self.mesh();
        let config = self.integrator_config();
        let start_time = self.start_time();
        let setup = self.clone();
        let system = RadSystem::new(params, mesh, self, config, move |x| setup.initial_state(x))?;
        Ok(system.with_start_time(start_time))
    }
}

/// The Su-Olson material, whose heat capacity is proportional to `T^3`,
/// `Egas = (alpha / 4) T^4` with `alpha = 4 a / eps`. The exchange problem
/// is then linear in `a T^4`.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SuOlsonMaterial {
    pub alpha: f64,
}

impl SuOlsonMaterial {
    pub fn new(radiation_constant: f64, eps: f64) -> Self {
        Self { alpha: 4.0 * radiation_constant / eps }
    }

    pub fn egas_from_tgas(self, tgas: f64) -> f64 {
        0.25 * self.alpha * tgas.powi(4)
    }

    pub fn tgas_from_egas(self, egas: f64) -> f64 {
        (4.0 * egas / self.alpha).powf(0.25)
    }

    pub fn egas_temp_derivative(self, tgas: f64) -> f64 {
        self.alpha * tgas.powi(3)
    }
}

/// Physical constants of the dimensionless test problems: unit light speed,
/// radiation constant, Boltzmann constant and molecular mass.
///
pub(crate) fn dimensionless_spec(erad_floor: f64, cfl: f64) -> ParameterSpec {
    ParameterSpec {
        c_light: 1.0,
        c_hat: 1.0,
        radiation_constant: 1.0,
        mean_molecular_mass: 1.0,
        boltzmann_constant: 1.0,
        gamma: 5.0 / 3.0,
        cfl_hydro: cfl,
        cfl_radiation: cfl,
        erad_floor,
        compute_v_over_c_terms: false,
        reconstruction: Default::default(),
        coupling: Default::default(),
    }
}
