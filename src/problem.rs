use crate::boundary::GhostZones;
use crate::params::Parameters;

/// The capability set a problem supplies to the radiation core: opacities,
/// the gas energy-temperature relation, the boundary policy, and an optional
/// volumetric radiation energy source. It is resolved once, when a
/// `RadSystem` is constructed, and called through static dispatch from the
/// parallel cell kernels (hence the `Sync` bound).
///
/// The thermodynamic functions default to an ideal gas,
/// `Egas = rho k_B T / (mu (gamma - 1))`, with the constants taken from the
/// problem's `Parameters`. Problems with a different energy-temperature
/// relation override all three together.
///
pub trait Problem: Sync {
    /// The Planck mean opacity (per unit mass), which sets the rate of energy
    /// exchange between gas and radiation.
    fn planck_opacity(&self, rho: f64, tgas: f64) -> f64;

    /// The Rosseland mean opacity (per unit mass), which sets the
    /// absorption of radiation flux. Defaults to the Planck opacity.
    fn rosseland_opacity(&self, rho: f64, tgas: f64) -> f64 {
        self.planck_opacity(rho, tgas)
    }

    /// Gas internal energy density at the given temperature.
    fn egas_from_tgas(&self, params: &Parameters, rho: f64, tgas: f64) -> f64 {
        rho * params.boltzmann_constant() * tgas
            / (params.mean_molecular_mass() * (params.gamma() - 1.0))
    }

    /// Gas temperature at the given internal energy density.
    fn tgas_from_egas(&self, params: &Parameters, rho: f64, egas: f64) -> f64 {
        egas * params.mean_molecular_mass() * (params.gamma() - 1.0)
            / (rho * params.boltzmann_constant())
    }

    /// The heat capacity per unit volume, `d Egas / d T` at fixed density.
    fn egas_temp_derivative(&self, params: &Parameters, rho: f64, _tgas: f64) -> f64 {
        rho * params.boltzmann_constant() / (params.mean_molecular_mass() * (params.gamma() - 1.0))
    }

    /// Fill every guard zone of the state array. Interior zones are readable
    /// but not writable through the `GhostZones` view.
    fn fill_ghost_zones(&self, ghosts: &mut GhostZones, time: f64);

    /// The volumetric radiation energy source `S(x, t)` averaged over the
    /// zone centered at `x` with widths `dx`. Defaults to zero.
    fn rad_energy_source(&self, _x: [f64; 3], _dx: [f64; 3], _time: f64) -> f64 {
        0.0
    }

    /// Whether `rad_energy_source` can be non-zero. The source is only
    /// evaluated when this returns true.
    fn has_rad_energy_source(&self) -> bool {
        false
    }
}
