use super::{dimensionless_spec, ReferenceProblem};
use crate::benchmark::gaussian_pulse;
use crate::boundary::GhostZones;
use crate::geometry::Vector3d;
use crate::index_space::{Axis, Side};
use crate::integrator::IntegratorConfig;
use crate::mesh::Mesh;
use crate::params::ParameterSpec;
use crate::problem::Problem;
use crate::state::Conserved;
use serde::{Deserialize, Serialize};

/// A Gaussian pulse of radiation diffusing through a static, optically
/// thick, homogeneous absorbing medium. The initial radiation field is the
/// analytic diffusion solution at `start_time`, with the flux set to its
/// diffusive value `-D dE/dx`, `D = c / (3 rho kappa)`, and the gas in each
/// zone in equilibrium with it. Both faces are held at the floor
/// temperature.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianPulse {
    pub num_zones: i64,
    pub domain_length: f64,
    pub start_time: f64,
    pub stop_time: f64,
    pub kappa: f64,
    pub width: f64,
    pub floor_temperature: f64,
}

impl Default for GaussianPulse {
    fn default() -> Self {
        Self {
            num_zones: 100,
            domain_length: 1.0,
            start_time: 0.01,
            stop_time: 0.03,
            kappa: 200.0,
            width: 0.025,
            floor_temperature: 1e-5,
        }
    }
}

impl GaussianPulse {
    /// The diffusion coefficient of the medium (unit density).
    ///
    pub fn diffusion_coefficient(&self) -> f64 {
        1.0 / (3.0 * self.kappa)
    }

    /// The analytic radiation energy density at position `x` and time `t`.
    ///
    pub fn exact_energy(&self, x: f64, t: f64) -> f64 {
        let center = 0.5 * self.domain_length;
        gaussian_pulse(x - center, t, self.width, self.diffusion_coefficient()).max(self.floor_energy())
    }

    fn floor_energy(&self) -> f64 {
        self.floor_temperature.powi(4)
    }

    /// An ideal gas with unit constants and `gamma = 5/3` has
    /// `Egas = 3 T / 2`.
    fn gas_energy(temperature: f64) -> f64 {
        1.5 * temperature
    }
}

impl Problem for GaussianPulse {
    fn planck_opacity(&self, _rho: f64, _tgas: f64) -> f64 {
        self.kappa
    }

    fn fill_ghost_zones(&self, ghosts: &mut GhostZones, _time: f64) {
        let floor = Conserved {
            rad_energy: self.floor_energy(),
            gas_energy: Self::gas_energy(self.floor_temperature),
            gas_density: 1.0,
            ..Conserved::default()
        };
        ghosts.fixed(Axis::I, Side::Lower, &floor);
        ghosts.fixed(Axis::I, Side::Upper, &floor);
    }
}

impl ReferenceProblem for GaussianPulse {
    fn parameter_spec(&self) -> ParameterSpec {
        dimensionless_spec(self.floor_energy(), 0.4)
    }

    fn mesh(&self) -> Mesh {
        Mesh::new_1d(0.0..self.domain_length, self.num_zones)
    }

    fn integrator_config(&self) -> IntegratorConfig {
        IntegratorConfig {
            initial_dt: Some(1e-6),
            max_dt: Some(1e-5),
            max_timesteps: 20_000,
            ..IntegratorConfig::default()
        }
    }

    fn initial_state(&self, x: [f64; 3]) -> Conserved {
        let t = self.start_time;
        let d = self.diffusion_coefficient();
        let w = self.width * self.width + d * t;
        let offset = x[0] - 0.5 * self.domain_length;
        let energy = self.exact_energy(x[0], t);
        let flux = d * offset / (2.0 * w) * energy;

        Conserved {
            rad_energy: energy,
            rad_flux: Vector3d::new(flux.max(-energy).min(energy), 0.0, 0.0),
            gas_energy: Self::gas_energy(energy.powf(0.25)),
            gas_density: 1.0,
            gas_momentum: Vector3d::zero(),
        }
    }

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn stop_time(&self) -> f64 {
        self.stop_time
    }
}
