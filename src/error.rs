use crate::index_space::Index;
use crate::state::Variable;
use thiserror::Error;

/**
 * Error to represent invalid radiation-hydrodynamics data, or a failed
 * update. Variants carrying a cell index identify the offending zone.
 */
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("non-positive gas density {rho} at cell {index:?}")]
    NonPositiveDensity { index: Index, rho: f64 },

    #[error("non-finite {variable} at cell {index:?}")]
    NonFinite { index: Index, variable: Variable },

    #[error("ghost zone {index:?} violates an invariant: {variable} = {value}")]
    InvalidGhostZone { index: Index, variable: Variable, value: f64 },

    #[error("negative gas internal energy {egas} at cell {index:?}")]
    NegativeInternalEnergy { index: Index, egas: f64 },

    #[error("coupling solve did not converge at cell {index:?}: |residual| = {residual:.3e} after {iterations} iterations")]
    CouplingNonConvergence { index: Index, residual: f64, iterations: usize },

    #[error("coupling solve cannot keep {variable} above its floor at cell {index:?} (value {value:.3e})")]
    FloorViolation { index: Index, variable: Variable, value: f64 },

    #[error("time step {dt:.3e} fell below the minimum {min_dt:.3e}")]
    TimeStepTooSmall { dt: f64, min_dt: f64 },

    #[error("step {step} at t = {time:.6e} failed after {retries} retries: {source}")]
    StepFailed {
        time: f64,
        step: u64,
        retries: usize,
        #[source]
        source: Box<Error>,
    },
}

// ============================================================================
impl Error {
    /**
     * Whether a full step that failed with this error may be retried with a
     * smaller time step.
     */
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::CouplingNonConvergence { .. }
                | Error::FloorViolation { .. }
                | Error::NegativeInternalEnergy { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
