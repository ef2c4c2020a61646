//! Radiant is a library for two-moment radiation transport coupled to a gas,
//! on structured rectilinear grids of one to three dimensions. Radiation is
//! evolved with the M1 closure and a reduced speed of light: an explicit
//! HLL transport sweep, followed in every zone by an implicit solve for the
//! exchange of energy (and optionally momentum) between radiation and gas.
//! Full steps are two-stage Heun updates, retried with a smaller time step
//! when the implicit solve fails.
//!
//! A run is driven through [`RadSystem`], which is parameterised by a
//! [`Problem`] supplying the opacities, the gas equation of state, the
//! ghost-zone fill, and any volumetric radiation source.

pub mod benchmark;
pub mod boundary;
pub mod closure;
pub mod coupling;
pub mod error;
pub mod flux;
pub mod geometry;
pub mod index_space;
pub mod integrator;
pub mod mesh;
pub mod params;
pub mod patch;
pub mod problem;
pub mod problems;
pub mod reconstruct;
pub mod riemann;
pub mod state;

pub use error::{Error, Result};
pub use integrator::{IntegratorConfig, RadSystem, RunSummary, TimeState};
pub use mesh::Mesh;
pub use params::{ParameterSpec, Parameters};
pub use problem::Problem;
pub use state::{Conserved, Variable};
