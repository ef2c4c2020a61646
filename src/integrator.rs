use crate::boundary::{validate_guard_zones, GhostZones};
use crate::coupling::{CouplingSolver, CouplingStats};
use crate::error::{Error, Result};
use crate::flux::TransportUpdate;
use crate::index_space::{Axis, Index};
use crate::mesh::{GridSpan, Mesh};
use crate::params::Parameters;
use crate::patch::Patch;
use crate::problem::Problem;
use crate::state::{Conserved, Variable, GAS_ENERGY, NUM_FIELDS, RAD_ENERGY};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Steps that would end within this fraction of the stop time are treated
/// as having reached it.
const STOP_TIME_TOLERANCE: f64 = 1e-12;

/// Run controls for the time integrator.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Upper bound on the very first step, to resolve fast initial
    /// transients such as the onset of a source term.
    pub initial_dt: Option<f64>,
    pub max_dt: Option<f64>,
    /// A step that must shrink below this after retries is fatal.
    pub min_dt: f64,
    pub max_timesteps: u64,
    /// The number of times a failed step is retried, halving `dt` each time.
    pub max_retries: usize,
    /// The step may span up to this many radiation CFL steps, and is then
    /// split into that many equal two-stage substeps.
    pub max_substeps: usize,
    /// Include the gas sound-crossing time in the step size.
    pub hydro_enabled: bool,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            initial_dt: None,
            max_dt: None,
            min_dt: 0.0,
            max_timesteps: u64::MAX,
            max_retries: 5,
            max_substeps: 1,
            hydro_enabled: false,
        }
    }
}

/// The simulation clock. It only moves at the end of a successful step.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    pub time: f64,
    pub dt: f64,
    pub step: u64,
}

/// The outcome of `RadSystem::evolve`.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: u64,
    pub time: f64,
    pub radiation_energy: f64,
    pub gas_energy: f64,
    pub total_energy: f64,
    pub boundary_energy_inflow: f64,
    pub retries: usize,
}

/// The stages of one Heun (RK2) update. Each stage fills the guard zones,
/// applies the transport increment, then solves the coupling; the corrector
/// result is averaged with the initial state.
///
enum Stage {
    Predictor,
    Corrector { provisional: Patch },
    Advanced { state: Patch },
}

struct StepOutcome {
    state: Patch,
    inflow: f64,
    stats: CouplingStats,
    renormalised: usize,
}

/// The radiation system on one grid: owns the state array, the problem's
/// policies, the immutable parameters, and the clock.
///
pub struct RadSystem<P: Problem> {
    params: Parameters,
    mesh: Mesh,
    span: GridSpan,
    state: Patch,
    problem: P,
    config: IntegratorConfig,
    clock: TimeState,
    boundary_energy_inflow: f64,
    retries: usize,
}

// ============================================================================
impl<P: Problem> RadSystem<P> {
    /// Build a system with its interior zones set from a function of the
    /// zone center. The guard zones are filled before the first step.
    ///
    pub fn new<F>(params: Parameters, mesh: Mesh, problem: P, config: IntegratorConfig, initial: F) -> Result<Self>
    where
        F: Fn([f64; 3]) -> Conserved + Sync,
    {
        mesh.validate()?;

        if config.max_substeps == 0 {
            return Err(Error::InvalidConfiguration("max_substeps must be at least 1".to_string()));
        }
        let span = mesh.span();
        let state = Patch::from_slice_function(span.extended(), NUM_FIELDS, |index, u| {
            if span.interior().contains(index) {
                initial(mesh.cell_center(index)).write_to_slice(u)
            }
        });
        let system = Self {
            params,
            mesh,
            span,
            state,
            problem,
            config,
            clock: TimeState::default(),
            boundary_energy_inflow: 0.0,
            retries: 0,
        };
        system.validate_interior()?;
        Ok(system)
    }

    /// Set the clock to a non-zero start time, for problems whose initial
    /// condition is an analytic solution at that time.
    ///
    pub fn with_start_time(mut self, time: f64) -> Self {
        self.clock.time = time;
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn span(&self) -> &GridSpan {
        &self.span
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn state(&self) -> &Patch {
        &self.state
    }

    pub fn clock(&self) -> TimeState {
        self.clock
    }

    pub fn time(&self) -> f64 {
        self.clock.time
    }

    pub fn dt(&self) -> f64 {
        self.clock.dt
    }

    pub fn step(&self) -> u64 {
        self.clock.step
    }

    /// The total number of step retries so far.
    ///
    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn get(&self, index: Index, variable: Variable) -> f64 {
        self.state.get(index, variable.index())
    }

    pub fn set(&mut self, index: Index, variable: Variable, value: f64) {
        self.state.get_slice_mut(index)[variable.index()] = value
    }

    pub fn cell(&self, index: Index) -> Conserved {
        Conserved::from_slice(self.state.get_slice(index))
    }

    pub fn set_cell(&mut self, index: Index, u: &Conserved) {
        u.write_to_slice(self.state.get_slice_mut(index))
    }

    /// Sample a function of the zone state along the first axis, through
    /// the first zone of the other axes. Returns the zone centers and the
    /// sampled values.
    ///
    pub fn line_profile<F>(&self, f: F) -> (Vec<f64>, Vec<f64>)
    where
        F: Fn(&Conserved) -> f64,
    {
        let start = self.span.interior().start();
        self.span
            .interior()
            .range(Axis::I)
            .map(|i| {
                let index = (i, start.1, start.2);
                (self.mesh.cell_center(index)[0], f(&self.cell(index)))
            })
            .unzip()
    }

    /// The volume-integrated radiation energy over the interior.
    ///
    pub fn compute_radiation_energy(&self) -> f64 {
        self.state.sum_over(self.span.interior(), |u| u[RAD_ENERGY]) * self.mesh.cell_volume()
    }

    /// The volume-integrated gas energy (internal and kinetic) over the
    /// interior.
    ///
    pub fn compute_gas_energy(&self) -> f64 {
        self.state.sum_over(self.span.interior(), |u| u[GAS_ENERGY]) * self.mesh.cell_volume()
    }

    /// The conserved total `Egas + (c / c_hat) Erad`. Without sources, it
    /// changes only by `boundary_energy_inflow`.
    ///
    pub fn compute_total_energy(&self) -> f64 {
        self.compute_gas_energy() + self.params.light_speed_ratio() * self.compute_radiation_energy()
    }

    /// The net energy that has entered through the domain boundary since
    /// construction, in the units of `compute_total_energy`.
    ///
    pub fn boundary_energy_inflow(&self) -> f64 {
        self.boundary_energy_inflow
    }

    /// Advance the system by one step no longer than `max_dt`. A step that
    /// fails with a recoverable error is retried with half the time step,
    /// up to the configured number of retries. Returns the new time and the
    /// step actually taken.
    ///
    pub fn advance_timestep(&mut self, max_dt: f64) -> Result<(f64, f64)> {
        let (mut dt, substeps) = self.next_timestep(max_dt);
        let mut retries = 0;

        loop {
            if !(dt > self.config.min_dt) {
                return Err(Error::TimeStepTooSmall { dt, min_dt: self.config.min_dt });
            }
            match self.try_advance(dt, substeps) {
                Ok(outcome) => {
                    if outcome.renormalised > 0 {
                        warn!("{} zones renormalised onto the floor or flux bound", outcome.renormalised);
                    }
                    debug!(
                        "[{:06}] t={:.6e} dt={:.3e} substeps={} newton={} bisection={}",
                        self.clock.step,
                        self.clock.time,
                        dt,
                        substeps,
                        outcome.stats.newton_iterations,
                        outcome.stats.bisection_iterations
                    );
                    self.state = outcome.state;
                    self.boundary_energy_inflow += outcome.inflow;
                    self.clock = TimeState {
                        time: self.clock.time + dt,
                        dt,
                        step: self.clock.step + 1,
                    };
                    return Ok((self.clock.time, dt));
                }
                Err(e) if e.is_recoverable() && retries < self.config.max_retries => {
                    warn!("step {} failed ({}); retrying with dt = {:.3e}", self.clock.step, e, 0.5 * dt);
                    retries += 1;
                    self.retries += 1;
                    dt *= 0.5;
                }
                Err(e) if e.is_recoverable() => {
                    return Err(Error::StepFailed {
                        time: self.clock.time,
                        step: self.clock.step,
                        retries,
                        source: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Advance until `stop_time` or the maximum number of steps. The last
    /// step is shortened so that the stop time is not overshot.
    ///
    pub fn evolve(&mut self, stop_time: f64) -> Result<RunSummary> {
        let tolerance = STOP_TIME_TOLERANCE * stop_time.abs().max(1.0);
        let start_energy = self.compute_total_energy();

        info!(
            "evolving {} zones from t={:.4e} to t={:.4e}",
            self.mesh.total_zones(),
            self.clock.time,
            stop_time
        );
        while stop_time - self.clock.time > tolerance && self.clock.step < self.config.max_timesteps {
            self.advance_timestep(stop_time - self.clock.time)?;
        }
        let summary = RunSummary {
            steps: self.clock.step,
            time: self.clock.time,
            radiation_energy: self.compute_radiation_energy(),
            gas_energy: self.compute_gas_energy(),
            total_energy: self.compute_total_energy(),
            boundary_energy_inflow: self.boundary_energy_inflow,
            retries: self.retries,
        };
        info!(
            "finished at t={:.4e} after {} steps ({} retries); total energy change {:.3e}, boundary inflow {:.3e}",
            summary.time,
            summary.steps,
            summary.retries,
            summary.total_energy - start_energy,
            summary.boundary_energy_inflow
        );
        Ok(summary)
    }

    /// Choose the next step and the number of equal substeps it is split
    /// into.
    ///
    fn next_timestep(&self, max_dt: f64) -> (f64, usize) {
        let rad_dt = self.params.cfl_radiation() * self.mesh.min_spacing() / self.params.c_hat();
        let max_substeps = self.config.max_substeps;
        let mut dt = rad_dt * max_substeps as f64;

        if self.config.hydro_enabled {
            dt = dt.min(self.hydro_timestep());
        }
        if let Some(user_max_dt) = self.config.max_dt {
            dt = dt.min(user_max_dt);
        }
        if self.clock.step == 0 {
            if let Some(initial_dt) = self.config.initial_dt {
                dt = dt.min(initial_dt);
            }
        }
        dt = dt.min(max_dt);

        let substeps = ((dt / rad_dt).ceil() as usize).max(1).min(max_substeps);
        (dt, substeps)
    }

    /// The hydrodynamic CFL step, `CFL_hydro dx / max(|v| + c_s)`, with the
    /// ideal-gas sound speed.
    ///
    fn hydro_timestep(&self) -> f64 {
        let gamma = self.params.gamma();
        let c_max = self.state.max_over(self.span.interior(), |u| {
            let u = Conserved::from_slice(u);
            let cs = (gamma * (gamma - 1.0) * u.gas_internal_energy().max(0.0) / u.gas_density).sqrt();
            u.gas_velocity().norm() + cs
        });
        if c_max > 0.0 {
            self.params.cfl_hydro() * self.mesh.min_spacing() / c_max
        } else {
            f64::INFINITY
        }
    }

    fn try_advance(&self, dt: f64, substeps: usize) -> Result<StepOutcome> {
        let sub_dt = dt / substeps as f64;
        let mut outcome = StepOutcome {
            state: self.state.clone(),
            inflow: 0.0,
            stats: CouplingStats::default(),
            renormalised: 0,
        };
        for n in 0..substeps {
            let time = self.clock.time + n as f64 * sub_dt;
            let next = self.heun_update(&outcome.state, time, sub_dt)?;
            outcome = StepOutcome {
                state: next.state,
                inflow: outcome.inflow + next.inflow,
                stats: outcome.stats.merge(next.stats),
                renormalised: outcome.renormalised + next.renormalised,
            };
        }
        Ok(outcome)
    }

    fn heun_update(&self, initial: &Patch, time: f64, dt: f64) -> Result<StepOutcome> {
        let mut stage = Stage::Predictor;
        let mut inflow = 0.0;
        let mut stats = CouplingStats::default();
        let mut renormalised = 0;

        loop {
            stage = match stage {
                Stage::Predictor => {
                    let mut u = initial.clone();
                    let (i, s, r) = self.stage_update(&mut u, time, dt)?;
                    inflow += 0.5 * i;
                    stats = stats.merge(s);
                    renormalised += r;
                    Stage::Corrector { provisional: u }
                }
                Stage::Corrector { mut provisional } => {
                    let (i, s, r) = self.stage_update(&mut provisional, time + dt, dt)?;
                    inflow += 0.5 * i;
                    stats = stats.merge(s);
                    renormalised += r;
                    provisional.combine(0.5, initial, 0.5);
                    Stage::Advanced { state: provisional }
                }
                Stage::Advanced { state } => {
                    return Ok(StepOutcome { state, inflow, stats, renormalised });
                }
            }
        }
    }

    /// One explicit stage on `u` in place: guard zones, transport, then
    /// coupling. Returns the boundary inflow (in total-energy units), the
    /// coupling statistics, and the number of renormalised zones.
    ///
    fn stage_update(&self, u: &mut Patch, time: f64, dt: f64) -> Result<(f64, CouplingStats, usize)> {
        let params = &self.params;
        let problem = &self.problem;

        problem.fill_ghost_zones(&mut GhostZones::new(u, &self.span, &self.mesh), time);
        validate_guard_zones(u, &self.span, params.erad_floor())?;

        let update = TransportUpdate::compute(u, &self.span, &self.mesh, params, problem, dt);
        let renormalised = update.apply_to(u, params);

        let solver = CouplingSolver::new(params, problem);
        let newton = AtomicUsize::new(0);
        let bisection = AtomicUsize::new(0);
        let mesh = &self.mesh;
        let dx = [
            mesh.cell_spacing(Axis::I),
            mesh.cell_spacing(Axis::J),
            mesh.cell_spacing(Axis::K),
        ];
        let has_source = problem.has_rad_energy_source();

        u.try_map_mut_in(self.span.interior(), |index, slice| {
            let mut zone = Conserved::from_slice(slice);

            if let Some(variable) = zone.first_non_finite() {
                return Err(Error::NonFinite { index, variable });
            }
            let source = if has_source {
                dt * problem.rad_energy_source(mesh.cell_center(index), dx, time)
            } else {
                0.0
            };
            let s = solver.solve(index, &mut zone, dt, source)?;
            newton.fetch_add(s.newton_iterations, Ordering::Relaxed);
            bisection.fetch_add(s.bisection_iterations, Ordering::Relaxed);
            zone.write_to_slice(slice);
            Ok(())
        })?;

        let stats = CouplingStats {
            newton_iterations: newton.into_inner(),
            bisection_iterations: bisection.into_inner(),
        };
        let inflow = params.light_speed_ratio() * update.boundary_inflow();
        Ok((inflow, stats, renormalised))
    }

    fn validate_interior(&self) -> Result<()> {
        for index in self.span.interior().iter() {
            let u = self.cell(index);

            if let Some(variable) = u.first_non_finite() {
                return Err(Error::NonFinite { index, variable });
            }
            if !(u.gas_density > 0.0) {
                return Err(Error::NonPositiveDensity { index, rho: u.gas_density });
            }
            if u.rad_energy < self.params.erad_floor() {
                return Err(Error::InvalidConfiguration(format!(
                    "initial radiation energy {:.3e} at cell {:?} is below the floor",
                    u.rad_energy, index
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::geometry::Vector3d;
    use crate::index_space::Side;
    use crate::params::{test::unit_spec, ParameterSpec};
    use approx::assert_relative_eq;

    struct Box1d {
        kappa: f64,
    }

    impl Problem for Box1d {
        fn planck_opacity(&self, _rho: f64, _tgas: f64) -> f64 {
            self.kappa
        }
        fn fill_ghost_zones(&self, ghosts: &mut GhostZones, _time: f64) {
            ghosts.reflect(Axis::I, Side::Lower);
            ghosts.reflect(Axis::I, Side::Upper);
        }
    }

    /// A transparent medium drained by a uniform sink of radiation energy.
    struct Drain {
        rate: f64,
    }

    impl Problem for Drain {
        fn planck_opacity(&self, _rho: f64, _tgas: f64) -> f64 {
            0.0
        }
        fn fill_ghost_zones(&self, ghosts: &mut GhostZones, _time: f64) {
            ghosts.reflect(Axis::I, Side::Lower);
            ghosts.reflect(Axis::I, Side::Upper);
        }
        fn rad_energy_source(&self, _x: [f64; 3], _dx: [f64; 3], _time: f64) -> f64 {
            -self.rate
        }
        fn has_rad_energy_source(&self) -> bool {
            true
        }
    }

    fn initial(x: [f64; 3]) -> Conserved {
        Conserved {
            rad_energy: if x[0] < 0.5 { 2.0 } else { 0.5 },
            rad_flux: Vector3d::zero(),
            gas_energy: 1.0,
            gas_density: 1.0,
            gas_momentum: Vector3d::zero(),
        }
    }

    fn system(kappa: f64, config: IntegratorConfig) -> RadSystem<Box1d> {
        let params = Parameters::new(unit_spec()).unwrap();
        RadSystem::new(params, Mesh::new_1d(0.0..1.0, 32), Box1d { kappa }, config, initial).unwrap()
    }

    #[test]
    fn first_step_uses_initial_dt_and_the_clock_advances() {
        let config = IntegratorConfig {
            initial_dt: Some(1e-4),
            ..IntegratorConfig::default()
        };
        let mut sys = system(1.0, config);
        let (t, dt) = sys.advance_timestep(f64::INFINITY).unwrap();
        assert_eq!(dt, 1e-4);
        assert_eq!(t, 1e-4);
        assert_eq!(sys.step(), 1);

        let (_, dt) = sys.advance_timestep(f64::INFINITY).unwrap();
        assert_relative_eq!(dt, 0.4 / 32.0, epsilon = 1e-15);
    }

    #[test]
    fn closed_box_conserves_total_energy() {
        let mut sys = system(10.0, IntegratorConfig::default());
        let e0 = sys.compute_total_energy();
        let summary = sys.evolve(0.5).unwrap();
        assert_eq!(summary.time, sys.time());
        assert!((summary.time - 0.5).abs() < 1e-12);
        assert_relative_eq!(sys.compute_total_energy(), e0, max_relative = 1e-12);
        assert_eq!(sys.boundary_energy_inflow(), 0.0);
    }

    #[test]
    fn substeps_divide_a_longer_step() {
        let config = IntegratorConfig {
            max_substeps: 4,
            ..IntegratorConfig::default()
        };
        let mut sys = system(1.0, config);
        let (_, dt) = sys.advance_timestep(f64::INFINITY).unwrap();
        assert_relative_eq!(dt, 4.0 * 0.4 / 32.0, epsilon = 1e-15);
    }

    #[test]
    fn evolve_respects_the_step_limit() {
        let config = IntegratorConfig {
            max_timesteps: 3,
            ..IntegratorConfig::default()
        };
        let mut sys = system(1.0, config);
        let summary = sys.evolve(10.0).unwrap();
        assert_eq!(summary.steps, 3);
        assert!(summary.time < 10.0);
    }

    #[test]
    fn exhausted_retries_report_the_failed_step() {
        let spec = ParameterSpec {
            coupling: crate::params::CouplingTolerances {
                residual_tolerance: 1e-300,
                max_newton_iterations: 1,
                max_bisection_iterations: 1,
            },
            ..unit_spec()
        };
        let params = Parameters::new(spec).unwrap();
        let config = IntegratorConfig { max_retries: 2, ..IntegratorConfig::default() };
        let mut sys = RadSystem::new(params, Mesh::new_1d(0.0..1.0, 8), Box1d { kappa: 1.0 }, config, initial).unwrap();

        match sys.advance_timestep(f64::INFINITY) {
            Err(Error::StepFailed { step, retries, source, .. }) => {
                assert_eq!(step, 0);
                assert_eq!(retries, 2);
                assert!(matches!(*source, Error::CouplingNonConvergence { .. }));
            }
            other => panic!("expected a failed step, got {:?}", other.map(|_| ())),
        }
        assert_eq!(sys.retries(), 2);
        assert_eq!(sys.step(), 0);
    }

    #[test]
    fn failed_step_succeeds_with_half_the_time_step() {
        // At the CFL step the corrector stage drains more radiation than the
        // zone holds; at half the step it does not.
        let params = Parameters::new(unit_spec()).unwrap();
        let uniform = |_: [f64; 3]| Conserved {
            rad_energy: 1.0,
            rad_flux: Vector3d::zero(),
            gas_energy: 1e-3,
            gas_density: 1.0,
            gas_momentum: Vector3d::zero(),
        };
        let problem = Drain { rate: 60.0 };
        let mesh = Mesh::new_1d(0.0..1.0, 32);
        let mut sys = RadSystem::new(params, mesh, problem, IntegratorConfig::default(), uniform).unwrap();

        let (t, dt) = sys.advance_timestep(f64::INFINITY).unwrap();
        assert_relative_eq!(dt, 0.5 * 0.4 / 32.0, epsilon = 1e-15);
        assert_eq!(t, dt);
        assert_eq!(sys.retries(), 1);
        assert_eq!(sys.step(), 1);

        for index in sys.span().interior().iter() {
            assert_relative_eq!(sys.cell(index).rad_energy, 0.625, max_relative = 1e-12);
            assert_relative_eq!(sys.cell(index).gas_energy, 1e-3, max_relative = 1e-9);
        }
    }

    #[test]
    fn hydro_limit_shortens_the_step_when_enabled() {
        let config = IntegratorConfig {
            hydro_enabled: true,
            ..IntegratorConfig::default()
        };
        let mut sys = system(1.0, config);
        let (_, dt) = sys.advance_timestep(f64::INFINITY).unwrap();

        // Egas = rho = 1 gives c_s^2 = gamma (gamma - 1) = 10 / 9.
        let sound_speed = (10.0f64 / 9.0).sqrt();
        assert_relative_eq!(dt, 0.4 / 32.0 / sound_speed, max_relative = 1e-12);

        let mut sys = system(1.0, IntegratorConfig::default());
        let (_, dt) = sys.advance_timestep(f64::INFINITY).unwrap();
        assert_relative_eq!(dt, 0.4 / 32.0, epsilon = 1e-15);
    }

    #[test]
    fn step_below_the_minimum_is_fatal() {
        let config = IntegratorConfig { min_dt: 1.0, ..IntegratorConfig::default() };
        let mut sys = system(1.0, config);
        assert!(matches!(
            sys.advance_timestep(f64::INFINITY),
            Err(Error::TimeStepTooSmall { .. })
        ));
    }

    #[test]
    fn invalid_initial_state_is_rejected() {
        let params = Parameters::new(unit_spec()).unwrap();
        let result = RadSystem::new(
            params,
            Mesh::new_1d(0.0..1.0, 8),
            Box1d { kappa: 1.0 },
            IntegratorConfig::default(),
            |x| Conserved { gas_density: if x[0] > 0.5 { 0.0 } else { 1.0 }, ..initial(x) },
        );
        assert!(matches!(result, Err(Error::NonPositiveDensity { .. })));
    }

    #[test]
    fn cell_accessors_read_and_write_variables() {
        let mut sys = system(1.0, IntegratorConfig::default());
        sys.set((3, 0, 0), Variable::RadFlux(Axis::I), 0.25);
        assert_eq!(sys.get((3, 0, 0), Variable::RadFlux(Axis::I)), 0.25);
        assert_eq!(sys.cell((3, 0, 0)).rad_flux.0, 0.25);
        assert_eq!(sys.get((20, 0, 0), Variable::RadEnergy), 0.5);
    }
}
