//! The explicit transport operator for the radiation moment equations. Each
//! active axis is swept in two passes: face states and fluxes are first
//! written to separate buffers, then the flux divergence is accumulated into
//! a per-zone increment. No zone is written by more than one task.

use crate::geometry::Vector3d;
use crate::index_space::{offset, Axis};
use crate::mesh::{GridSpan, Mesh};
use crate::params::Parameters;
use crate::patch::Patch;
use crate::problem::Problem;
use crate::riemann::{face_optical_depth, riemann_hll, RadState};
use crate::state::{Conserved, NUM_RAD_FIELDS, RAD_ENERGY, X1_RAD_FLUX, X3_RAD_FLUX};
use std::sync::atomic::{AtomicUsize, Ordering};

const EDGE_LOWER: usize = 0;
const EDGE_UPPER: usize = 4;
const ABSORPTION: usize = 8;
const NUM_EDGE_FIELDS: usize = 9;

/// The transport-only change to the radiation fields over one stage, and
/// the radiation energy that crossed the domain boundary while producing it
/// (positive when inward, volume-integrated).
///
pub struct TransportUpdate {
    increment: Patch,
    boundary_inflow: f64,
}

impl TransportUpdate {
    /// Compute the update for a stage of length `dt`. The guard zones of
    /// `state` must already be filled.
    ///
    pub fn compute<P: Problem>(
        state: &Patch,
        span: &GridSpan,
        mesh: &Mesh,
        params: &Parameters,
        problem: &P,
        dt: f64,
    ) -> Self {
        let mut increment = Patch::zeros(NUM_RAD_FIELDS, span.interior().clone());
        let mut boundary_inflow = 0.0;

        for axis in span.active_axes() {
            let dx = mesh.cell_spacing(axis);
            let edges = reconstruct_edges(state, span, params, problem, axis);
            let fluxes = face_fluxes(&edges, span, params, axis, dx);

            increment.map_mut(|index, du| {
                let fl = fluxes.get_slice(index);
                let fr = fluxes.get_slice(offset(index, 1, axis));
                for n in 0..NUM_RAD_FIELDS {
                    du[n] -= dt / dx * (fr[n] - fl[n]);
                }
            });
            boundary_inflow += dt * mesh.face_area(axis) * boundary_face_sum(&fluxes, span, axis);
        }
        Self { increment, boundary_inflow }
    }

    pub fn increment(&self) -> &Patch {
        &self.increment
    }

    pub fn boundary_inflow(&self) -> f64 {
        self.boundary_inflow
    }

    /// Add the increment to the interior zones of `state`, then restore the
    /// floor and realizability of each updated zone. Returns the number of
    /// zones that had to be renormalised.
    ///
    pub fn apply_to(&self, state: &mut Patch, params: &Parameters) -> usize {
        let renormalised = AtomicUsize::new(0);
        let interior = self.increment.index_space();

        state.map_mut(|index, u| {
            if interior.contains(index) {
                let du = self.increment.get_slice(index);
                for n in 0..NUM_RAD_FIELDS {
                    u[n] += du[n];
                }
                if renormalise_radiation(u, params) {
                    renormalised.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
        renormalised.into_inner()
    }
}

/// Raise the radiation energy of a zone to the floor and rescale its flux
/// onto the bound `|F| <= c_hat E` if it exceeds it. Returns whether the
/// zone was changed.
///
pub fn renormalise_radiation(u: &mut [f64], params: &Parameters) -> bool {
    let mut changed = false;

    if u[RAD_ENERGY] < params.erad_floor() {
        u[RAD_ENERGY] = params.erad_floor();
        changed = true;
    }
    let flux = Vector3d::from_slice(&u[X1_RAD_FLUX..=X3_RAD_FLUX]);
    let bound = params.c_hat() * u[RAD_ENERGY];
    let norm = flux.norm();

    if norm > bound {
        (flux * (bound / norm)).write_to_slice(&mut u[X1_RAD_FLUX..=X3_RAD_FLUX]);
        changed = true;
    }
    changed
}

fn is_realizable(edge: &[f64; 4]) -> bool {
    edge[0] > 0.0 && Vector3d(edge[1], edge[2], edge[3]).norm() <= 1.0
}

fn face_state(edge: &[f64], c_hat: f64) -> RadState {
    let f = Vector3d::from_slice(&edge[1..4]);
    RadState::new(edge[0], f * (c_hat * edge[0]))
}

/// Reconstruct the radiation energy and reduced flux at the lower and upper
/// faces of every zone in the interior extended by one zone along `axis`.
/// A zone whose reconstructed energy is not positive, or whose reduced flux
/// exceeds unity, on either face reverts to piecewise-constant values. The
/// Rosseland absorption coefficient of each zone is stored alongside.
///
fn reconstruct_edges<P: Problem>(
    state: &Patch,
    span: &GridSpan,
    params: &Parameters,
    problem: &P,
    axis: Axis,
) -> Patch {
    let reconstruction = params.reconstruction();
    let c_hat = params.c_hat();
    let floor = params.erad_denominator_floor();

    Patch::from_slice_function(span.interior().extend(1, axis), NUM_EDGE_FIELDS, |index, edges| {
        let mut q = [[0.0; 5]; 4];

        for (n, delta) in (-2..=2).enumerate() {
            let u = Conserved::from_slice(state.get_slice(offset(index, delta, axis)));
            let f = u.rad_flux / (c_hat * u.rad_energy.max(floor));
            q[0][n] = u.rad_energy;
            q[1][n] = f.0;
            q[2][n] = f.1;
            q[3][n] = f.2;
        }
        let mut lower = [0.0; 4];
        let mut upper = [0.0; 4];

        for m in 0..4 {
            let (l, u) = reconstruction.face_values(&q[m]);
            lower[m] = l;
            upper[m] = u;
        }
        if !is_realizable(&lower) || !is_realizable(&upper) {
            for m in 0..4 {
                lower[m] = q[m][2];
                upper[m] = q[m][2];
            }
        }
        edges[EDGE_LOWER..EDGE_LOWER + 4].copy_from_slice(&lower);
        edges[EDGE_UPPER..EDGE_UPPER + 4].copy_from_slice(&upper);

        let u = Conserved::from_slice(state.get_slice(index));
        let rho = u.gas_density;
        let tgas = problem.tgas_from_egas(params, rho, u.gas_internal_energy().max(0.0));
        edges[ABSORPTION] = rho * problem.rosseland_opacity(rho, tgas);
    })
}

/// Solve the Riemann problem at every face normal to `axis` bounding an
/// interior zone. Face `i` is the lower face of zone `i`.
///
fn face_fluxes(edges: &Patch, span: &GridSpan, params: &Parameters, axis: Axis, dx: f64) -> Patch {
    let c_hat = params.c_hat();
    let floor = params.erad_denominator_floor();

    Patch::from_slice_function(span.interior().extend_upper(1, axis), NUM_RAD_FIELDS, |index, flux| {
        let l = edges.get_slice(offset(index, -1, axis));
        let r = edges.get_slice(index);
        let sl = face_state(&l[EDGE_UPPER..EDGE_UPPER + 4], c_hat);
        let sr = face_state(&r[EDGE_LOWER..EDGE_LOWER + 4], c_hat);
        let tau = face_optical_depth(l[ABSORPTION], r[ABSORPTION], dx);
        riemann_hll(sl, sr, axis, c_hat, floor, tau).write_to_slice(flux)
    })
}

/// The net energy flux into the interior through the two boundary faces
/// normal to `axis`, summed over the face area in units of one face.
///
fn boundary_face_sum(fluxes: &Patch, span: &GridSpan, axis: Axis) -> f64 {
    let range = span.interior().range(axis);
    let faces = fluxes.index_space();
    let lower = faces.with_range(axis, range.start..range.start + 1);
    let upper = faces.with_range(axis, range.end..range.end + 1);
    fluxes.sum_over(&lower, |f| f[RAD_ENERGY]) - fluxes.sum_over(&upper, |f| f[RAD_ENERGY])
}
