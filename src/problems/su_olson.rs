use super::{dimensionless_spec, ReferenceProblem, SuOlsonMaterial};
use crate::boundary::GhostZones;
use crate::index_space::{Axis, Side};
use crate::integrator::IntegratorConfig;
use crate::mesh::Mesh;
use crate::params::{ParameterSpec, Parameters};
use crate::problem::Problem;
use crate::state::Conserved;
use serde::{Deserialize, Serialize};

/// The Su-Olson (1997) non-equilibrium source problem: a cold slab of
/// Su-Olson material with a uniform radiation source of strength
/// `S = a T_H^4 / (2 x0)` in `0 < x < x0`, switched off at `t0`. The plane
/// `x = 0` is a symmetry plane and the far face reflects.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuOlsonSource {
    pub num_zones: i64,
    pub domain_length: f64,
    pub stop_time: f64,
    pub source_width: f64,
    pub source_duration: f64,
    pub kappa: f64,
    pub eps: f64,
    pub t_hohlraum: f64,
}

impl Default for SuOlsonSource {
    fn default() -> Self {
        Self {
            num_zones: 400,
            domain_length: 20.0,
            stop_time: 10.0,
            source_width: 0.5,
            source_duration: 10.0,
            kappa: 1.0,
            eps: 1.0,
            t_hohlraum: 1.0,
        }
    }
}

impl SuOlsonSource {
    fn material(&self) -> SuOlsonMaterial {
        SuOlsonMaterial::new(1.0, self.eps)
    }

    fn source_strength(&self) -> f64 {
        self.t_hohlraum.powi(4) / (2.0 * self.source_width)
    }
}

impl Problem for SuOlsonSource {
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
        ghosts.reflect(Axis::I, Side::Lower);
        ghosts.reflect(Axis::I, Side::Upper);
    }

    /// The source averaged over the zone: the zone straddling `x0` gets the
    /// fraction of its width lying inside the source region.
    fn rad_energy_source(&self, x: [f64; 3], dx: [f64; 3], time: f64) -> f64 {
        if time >= self.source_duration {
            return 0.0;
        }
        let xl = x[0] - 0.5 * dx[0];
        let xr = x[0] + 0.5 * dx[0];
        let x0 = self.source_width;
        let fraction = if xr <= x0 {
            1.0
        } else if xl < x0 {
            (x0 - xl) / (xr - xl)
        } else {
            0.0
        };
        self.source_strength() * fraction
    }

    fn has_rad_energy_source(&self) -> bool {
        true
    }
}

impl ReferenceProblem for SuOlsonSource {
    fn parameter_spec(&self) -> ParameterSpec {
        dimensionless_spec(0.0, 0.4)
    }

    fn mesh(&self) -> Mesh {
        Mesh::new_1d(0.0..self.domain_length, self.num_zones)
    }

    fn integrator_config(&self) -> IntegratorConfig {
        IntegratorConfig {
            initial_dt: Some(1e-9),
            max_dt: Some(1e-2),
            max_timesteps: 12_000,
            ..IntegratorConfig::default()
        }
    }

    fn initial_state(&self, _x: [f64; 3]) -> Conserved {
        Conserved {
            rad_energy: 1e-10 * self.t_hohlraum.powi(4),
            gas_energy: 1e-10 * self.material().egas_from_tgas(self.t_hohlraum),
            gas_density: 1.0,
            ..Conserved::default()
        }
    }

    fn stop_time(&self) -> f64 {
        self.stop_time
    }
}
