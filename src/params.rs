use crate::error::Error;
use crate::reconstruct::Reconstruction;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Convergence controls for the matter-radiation coupling solve.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CouplingTolerances {
    /// Convergence when `|R| < residual_tolerance * (Egas + (c / c_hat) Erad)`.
    pub residual_tolerance: f64,
    pub max_newton_iterations: usize,
    pub max_bisection_iterations: usize,
}

impl Default for CouplingTolerances {
    fn default() -> Self {
        Self {
            residual_tolerance: 1e-13,
            max_newton_iterations: 50,
            max_bisection_iterations: 200,
        }
    }
}

/// The caller-facing description of a problem's physical constants and
/// numerical knobs. It has no `Default`; every problem states its constants,
/// including whether v/c terms are computed.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub c_light: f64,
    pub c_hat: f64,
    pub radiation_constant: f64,
    pub mean_molecular_mass: f64,
    pub boltzmann_constant: f64,
    pub gamma: f64,
    pub cfl_hydro: f64,
    pub cfl_radiation: f64,
    pub erad_floor: f64,
    pub compute_v_over_c_terms: bool,
    #[serde(default)]
    pub reconstruction: Reconstruction,
    #[serde(default)]
    pub coupling: CouplingTolerances,
}

/// Validated, immutable problem parameters. These are built once at problem
/// setup and read by every component through a shared reference.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterSpec", into = "ParameterSpec")]
pub struct Parameters {
    spec: ParameterSpec,
}

impl Parameters {
    pub fn new(spec: ParameterSpec) -> Result<Self, Error> {
        Self::try_from(spec)
    }

    pub fn c_light(&self) -> f64 {
        self.spec.c_light
    }

    pub fn c_hat(&self) -> f64 {
        self.spec.c_hat
    }

    /// The ratio `c / c_hat` weighting radiation energy in the conserved
    /// total energy.
    pub fn light_speed_ratio(&self) -> f64 {
        self.spec.c_light / self.spec.c_hat
    }

    pub fn radiation_constant(&self) -> f64 {
        self.spec.radiation_constant
    }

    pub fn mean_molecular_mass(&self) -> f64 {
        self.spec.mean_molecular_mass
    }

    pub fn boltzmann_constant(&self) -> f64 {
        self.spec.boltzmann_constant
    }

    pub fn gamma(&self) -> f64 {
        self.spec.gamma
    }

    pub fn cfl_hydro(&self) -> f64 {
        self.spec.cfl_hydro
    }

    pub fn cfl_radiation(&self) -> f64 {
        self.spec.cfl_radiation
    }

    pub fn erad_floor(&self) -> f64 {
        self.spec.erad_floor
    }

    /// A strictly positive energy used in place of `Erad` when dividing by
    /// it. Equal to the floor unless the floor is zero.
    pub fn erad_denominator_floor(&self) -> f64 {
        self.spec.erad_floor.max(f64::MIN_POSITIVE)
    }

    pub fn compute_v_over_c_terms(&self) -> bool {
        self.spec.compute_v_over_c_terms
    }

    pub fn reconstruction(&self) -> Reconstruction {
        self.spec.reconstruction
    }

    pub fn coupling(&self) -> &CouplingTolerances {
        &self.spec.coupling
    }

    pub fn spec(&self) -> &ParameterSpec {
        &self.spec
    }
}

impl TryFrom<ParameterSpec> for Parameters {
    type Error = Error;

    fn try_from(spec: ParameterSpec) -> Result<Self, Error> {
        let positive = [
            ("c_light", spec.c_light),
            ("c_hat", spec.c_hat),
            ("radiation_constant", spec.radiation_constant),
            ("mean_molecular_mass", spec.mean_molecular_mass),
            ("boltzmann_constant", spec.boltzmann_constant),
            ("cfl_hydro", spec.cfl_hydro),
            ("cfl_radiation", spec.cfl_radiation),
            ("residual_tolerance", spec.coupling.residual_tolerance),
        ];
        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(Error::InvalidConfiguration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        if spec.c_hat > spec.c_light {
            return Err(Error::InvalidConfiguration(format!(
                "reduced light speed c_hat = {} exceeds c = {}",
                spec.c_hat, spec.c_light
            )));
        }
        if !(spec.gamma > 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "adiabatic index must exceed 1, got {}",
                spec.gamma
            )));
        }
        if !(spec.erad_floor.is_finite() && spec.erad_floor >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "erad_floor must be non-negative, got {}",
                spec.erad_floor
            )));
        }
        if spec.cfl_radiation > 1.0 {
            return Err(Error::InvalidConfiguration(format!(
                "radiation CFL number {} exceeds 1",
                spec.cfl_radiation
            )));
        }
        if spec.coupling.max_newton_iterations + spec.coupling.max_bisection_iterations == 0 {
            return Err(Error::InvalidConfiguration(
                "coupling solve needs a non-zero iteration budget".to_string(),
            ));
        }
        Ok(Self { spec })
    }
}

impl From<Parameters> for ParameterSpec {
    fn from(params: Parameters) -> Self {
        params.spec
    }
}
