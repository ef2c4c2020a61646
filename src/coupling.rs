use crate::closure::EddingtonTensor;
use crate::error::Error;
use crate::geometry::Vector3d;
use crate::index_space::Index;
use crate::params::Parameters;
use crate::problem::Problem;
use crate::state::{Conserved, Variable};
use log::trace;




/**
 * Iteration counts of one zone's coupling solve, reduced over the grid for
 * the per-step statistics.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CouplingStats {
    pub newton_iterations: usize,
    pub bisection_iterations: usize,
}




/**
 * The implicit matter-radiation exchange over one stage. For each zone it
 * solves the backward-Euler system
 *
 *   Egas(T) - Egas0 = (c / c_hat) (E0 + Src - E)
 *   E = (E0 + Src + tau a T^4) / (1 + tau),     tau = dt c_hat rho kappa_P
 *
 * for the gas temperature `T`, as a scalar root of
 *
 *   R(T) = Egas(T) + (c / c_hat) E(T) - Etot0
 *
 * with `Etot0 = Egas0 + (c / c_hat) (E0 + Src)`. The gas energy is then
 * taken from `Etot0` so that the total is conserved to round-off, whatever
 * tolerance the iteration stopped at. The flux is relaxed implicitly toward
 * its comoving value through the Rosseland opacity.
 *
 * The solver holds no per-zone state between calls.
 */
pub struct CouplingSolver<'a, P: Problem> {
    params: &'a Parameters,
    problem: &'a P,
}




// ============================================================================
impl CouplingStats {
    pub fn merge(self, other: Self) -> Self {
        Self {
            newton_iterations: self.newton_iterations + other.newton_iterations,
            bisection_iterations: self.bisection_iterations + other.bisection_iterations,
        }
    }
}




// ============================================================================
impl<'a, P: Problem> CouplingSolver<'a, P> {

    pub fn new(params: &'a Parameters, problem: &'a P) -> Self {
        Self { params, problem }
    }

    /**
     * Update the zone `u` at `index` over a stage of length `dt`, with
     * `source` the radiation energy density injected by the volumetric
     * source during the stage. Errors are recoverable (the caller may retry
     * with a smaller step) unless the density is not positive.
     */
    pub fn solve(&self, index: Index, u: &mut Conserved, dt: f64, source: f64) -> Result<CouplingStats, Error> {
        let params = self.params;
        let rho = u.gas_density;

        if !(rho > 0.0) {
            return Err(Error::NonPositiveDensity { index, rho });
        }
        let egas0 = u.gas_internal_energy();

        if egas0 < 0.0 {
            return Err(Error::NegativeInternalEnergy { index, egas: egas0 });
        }
        let ratio = params.light_speed_ratio();
        let erad0 = u.rad_energy + source;
        let etot0 = egas0 + ratio * erad0;
        let (tgas, stats) = self.solve_temperature(index, rho, egas0, erad0, etot0, dt)?;

        let tau = dt * params.c_hat() * rho * self.problem.planck_opacity(rho, tgas);
        let mut erad = (erad0 + tau * params.radiation_constant() * tgas.powi(4)) / (1.0 + tau);

        if erad < params.erad_floor() {
            erad = params.erad_floor();
        }
        let egas = etot0 - ratio * erad;

        if egas < 0.0 {
            return Err(Error::FloorViolation { index, variable: Variable::GasEnergy, value: egas });
        }
        let flux = self.relax_flux(u, rho, tgas, erad, dt);

        if params.compute_v_over_c_terms() {
            let dp = (flux - u.rad_flux) * (-1.0 / (params.c_light() * params.c_hat()));
            let ekin0 = u.gas_kinetic_energy();
            u.gas_momentum = u.gas_momentum + dp;
            let work = u.gas_kinetic_energy() - ekin0;
            u.gas_energy = egas + u.gas_kinetic_energy();
            u.rad_energy = erad - work / ratio;

            if u.rad_energy < params.erad_floor() {
                return Err(Error::FloorViolation { index, variable: Variable::RadEnergy, value: u.rad_energy });
            }
        } else {
            u.gas_energy = egas + u.gas_kinetic_energy();
            u.rad_energy = erad;
        }
        u.rad_flux = realizable(flux, params.c_hat() * u.rad_energy);
        Ok(stats)
    }

    /**
     * Find the gas temperature root of the energy residual. A safeguarded
     * Newton iteration runs first, keeping a bracket `[lo, hi]` that always
     * contains the root and taking a bisection step whenever the Newton
     * step would leave it. If the Newton budget runs out, plain bisection
     * continues on the bracket.
     */
    fn solve_temperature(
        &self,
        index: Index,
        rho: f64,
        egas0: f64,
        erad0: f64,
        etot0: f64,
        dt: f64,
    ) -> Result<(f64, CouplingStats), Error> {
        let params = self.params;
        let problem = self.problem;
        let tolerances = params.coupling();
        let ratio = params.light_speed_ratio();
        let a_rad = params.radiation_constant();
        let c_hat = params.c_hat();
        let scale = etot0.max(f64::MIN_POSITIVE);

        let residual = |t: f64| {
            let tau = dt * c_hat * rho * problem.planck_opacity(rho, t);
            let erad = (erad0 + tau * a_rad * t.powi(4)) / (1.0 + tau);
            let r = problem.egas_from_tgas(params, rho, t) + ratio * erad - etot0;
            let drdt = problem.egas_temp_derivative(params, rho, t)
                + ratio * tau * 4.0 * a_rad * t.powi(3) / (1.0 + tau);
            (r, drdt)
        };
        let egas_max = (etot0 - ratio * params.erad_floor()).max(0.0);
        let mut lo = 0.0;
        let mut hi = problem.tgas_from_egas(params, rho, egas_max);

        if residual(hi).0 <= 0.0 {
            return Ok((hi, CouplingStats::default()));
        }
        let mut t = problem.tgas_from_egas(params, rho, egas0).max(lo).min(hi);
        let mut stats = CouplingStats::default();
        let mut r = 0.0;

        for n in 0..tolerances.max_newton_iterations {
            let (rt, drdt) = residual(t);
            r = rt;
            stats.newton_iterations = n + 1;

            if r.abs() < tolerances.residual_tolerance * scale {
                return Ok((t, stats));
            }
            if r < 0.0 {
                lo = t;
            } else {
                hi = t;
            }
            let next = t - r / drdt;
            t = if next > lo && next < hi { next } else { 0.5 * (lo + hi) };
        }
        stats.newton_iterations = tolerances.max_newton_iterations;
        trace!("coupling at {:?} fell back to bisection on [{:.6e}, {:.6e}]", index, lo, hi);

        for n in 0..tolerances.max_bisection_iterations {
            t = 0.5 * (lo + hi);
            r = residual(t).0;
            stats.bisection_iterations = n + 1;

            if r.abs() < tolerances.residual_tolerance * scale || hi - lo <= f64::EPSILON * hi {
                return Ok((t, stats));
            }
            if r < 0.0 {
                lo = t;
            } else {
                hi = t;
            }
        }
        Err(Error::CouplingNonConvergence {
            index,
            residual: r.abs() / scale,
            iterations: tolerances.max_newton_iterations + tolerances.max_bisection_iterations,
        })
    }

    /**
     * Backward-Euler relaxation of the flux toward its comoving value,
     * `F1 = (F0 + tau_R F_adv) / (1 + tau_R)`. Without v/c terms the
     * comoving value is zero.
     */
    fn relax_flux(&self, u: &Conserved, rho: f64, tgas: f64, erad: f64, dt: f64) -> Vector3d {
        let params = self.params;
        let c_hat = params.c_hat();
        let tau = dt * c_hat * rho * self.problem.rosseland_opacity(rho, tgas);

        let f_adv = if params.compute_v_over_c_terms() {
            let v = u.gas_velocity();
            let f = u.rad_flux / (c_hat * erad.max(params.erad_denominator_floor()));
            let d = EddingtonTensor::from_reduced_flux(f);
            (v * erad + d.dot(v) * erad) * (c_hat / params.c_light())
        } else {
            Vector3d::zero()
        };
        (u.rad_flux + f_adv * tau) / (1.0 + tau)
    }
}




/**
 * Rescale a flux vector onto the realizability bound, if it exceeds it.
 */
fn realizable(flux: Vector3d, bound: f64) -> Vector3d {
    let norm = flux.norm();
    if norm > bound {
        flux * (bound / norm)
    } else {
        flux
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::boundary::GhostZones;
    use crate::params::{test::unit_spec, ParameterSpec};
    use approx::assert_relative_eq;

    struct Grey {
        kappa: f64,
    }

    impl Problem for Grey {
        fn planck_opacity(&self, _rho: f64, _tgas: f64) -> f64 {
            self.kappa
        }
        fn fill_ghost_zones(&self, _ghosts: &mut GhostZones, _time: f64) {}
    }

    fn zone(erad: f64, egas: f64) -> Conserved {
        Conserved {
            rad_energy: erad,
            rad_flux: Vector3d::new(0.1 * erad, 0.0, 0.0),
            gas_energy: egas,
            gas_density: 1.0,
            gas_momentum: Vector3d::zero(),
        }
    }

    fn total(u: &Conserved, params: &Parameters) -> f64 {
        u.gas_energy + params.light_speed_ratio() * u.rad_energy
    }

    #[test]
    fn equilibrium_zone_is_unchanged() {
        let params = Parameters::new(unit_spec()).unwrap();
        let problem = Grey { kappa: 10.0 };
        let t = 2.0;
        let egas = problem.egas_from_tgas(&params, 1.0, t);
        let mut u = zone(t.powi(4), egas);
        u.rad_flux = Vector3d::zero();
        let before = u;
        let stats = CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 0.1, 0.0).unwrap();
        assert_relative_eq!(u.rad_energy, before.rad_energy, max_relative = 1e-12);
        assert_relative_eq!(u.gas_energy, before.gas_energy, max_relative = 1e-12);
        assert_eq!(stats, CouplingStats { newton_iterations: 1, bisection_iterations: 0 });
    }

    #[test]
    fn newton_iterations_count_every_residual_evaluation() {
        let params = Parameters::new(unit_spec()).unwrap();
        let problem = Grey { kappa: 1.0 };
        let mut u = zone(10.0, 0.5);
        let stats = CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 0.5, 0.0).unwrap();
        assert!(stats.newton_iterations >= 2, "{:?}", stats);
        assert_eq!(stats.bisection_iterations, 0);
    }

    #[test]
    fn exchange_conserves_energy_and_drives_toward_equilibrium() {
        for &c_hat in [1.0, 0.1].iter() {
            let params = Parameters::new(ParameterSpec { c_hat, ..unit_spec() }).unwrap();
            let problem = Grey { kappa: 1.0 };
            let mut u = zone(10.0, 0.5);
            let before = total(&u, &params);
            let tgas0 = problem.tgas_from_egas(&params, 1.0, u.gas_energy);

            CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 0.5, 0.0).unwrap();
            let tgas1 = problem.tgas_from_egas(&params, 1.0, u.gas_energy);

            assert_relative_eq!(total(&u, &params), before, max_relative = 1e-13);
            assert!(tgas1 > tgas0);
            assert!(u.rad_energy < 10.0);
            assert!(u.rad_energy > tgas1.powi(4));
        }
    }

    #[test]
    fn stiff_exchange_reaches_equilibrium() {
        let params = Parameters::new(unit_spec()).unwrap();
        let problem = Grey { kappa: 1e12 };
        let mut u = zone(1e-6, 3.0);
        let before = total(&u, &params);
        CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 1.0, 0.0).unwrap();
        let tgas = problem.tgas_from_egas(&params, 1.0, u.gas_energy);

        assert_relative_eq!(total(&u, &params), before, max_relative = 1e-13);
        assert_relative_eq!(u.rad_energy, tgas.powi(4), max_relative = 1e-9);
        assert!(u.rad_flux.norm() < 1e-12);
    }

    #[test]
    fn source_energy_is_added_to_the_total() {
        let params = Parameters::new(unit_spec()).unwrap();
        let problem = Grey { kappa: 1.0 };
        let mut u = zone(1.0, 1.0);
        let before = total(&u, &params);
        CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 0.1, 0.25).unwrap();
        assert_relative_eq!(total(&u, &params), before + 0.25, max_relative = 1e-13);
    }

    #[test]
    fn transparent_zone_keeps_its_flux() {
        let params = Parameters::new(unit_spec()).unwrap();
        let problem = Grey { kappa: 0.0 };
        let mut u = zone(2.0, 1.0);
        let before = u;
        CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 1.0, 0.0).unwrap();
        assert_relative_eq!(u.rad_energy, before.rad_energy, max_relative = 1e-13);
        assert_eq!(u.rad_flux, before.rad_flux);
    }

    #[test]
    fn radiation_momentum_is_given_to_the_gas() {
        let params = Parameters::new(ParameterSpec { compute_v_over_c_terms: true, ..unit_spec() }).unwrap();
        let problem = Grey { kappa: 5.0 };
        let mut u = zone(4.0, 2.0);
        u.rad_flux = Vector3d::new(2.0, 0.0, 0.0);
        let before = u;
        let p_total = |u: &Conserved| u.gas_momentum.0 + u.rad_flux.0 / (params.c_light() * params.c_hat());

        CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 0.1, 0.0).unwrap();

        assert!(u.gas_momentum.0 > 0.0);
        assert!(u.rad_flux.0 < before.rad_flux.0);
        assert_relative_eq!(p_total(&u), p_total(&before), max_relative = 1e-13);
        assert_relative_eq!(total(&u, &params), total(&before, &params), max_relative = 1e-13);
    }

    #[test]
    fn invalid_zones_are_reported() {
        let params = Parameters::new(unit_spec()).unwrap();
        let problem = Grey { kappa: 1.0 };
        let solver = CouplingSolver::new(&params, &problem);

        let mut u = zone(1.0, 1.0);
        u.gas_density = 0.0;
        assert!(matches!(solver.solve((4, 0, 0), &mut u, 0.1, 0.0), Err(Error::NonPositiveDensity { index: (4, 0, 0), .. })));

        let mut u = zone(1.0, 0.1);
        u.gas_momentum = Vector3d::new(1.0, 0.0, 0.0);
        let result = solver.solve((2, 0, 0), &mut u, 0.1, 0.0);
        assert!(matches!(result, Err(Error::NegativeInternalEnergy { .. })));
        assert!(result.unwrap_err().is_recoverable());
    }

    #[test]
    fn exhausted_iteration_budget_is_recoverable() {
        let spec = ParameterSpec {
            coupling: crate::params::CouplingTolerances {
                residual_tolerance: 1e-300,
                max_newton_iterations: 1,
                max_bisection_iterations: 1,
            },
            ..unit_spec()
        };
        let params = Parameters::new(spec).unwrap();
        let problem = Grey { kappa: 1.0 };
        let mut u = zone(10.0, 0.5);
        let result = CouplingSolver::new(&params, &problem).solve((0, 0, 0), &mut u, 0.5, 0.0);
        assert!(matches!(result, Err(Error::CouplingNonConvergence { iterations: 2, .. })));
    }
}
