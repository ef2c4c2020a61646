//! The M1 closure for the two-moment radiation system: the Eddington factor
//! as a function of the reduced flux `f = |F| / (c_hat E)`, the Eddington
//! tensor, and the characteristic speeds of the resulting hyperbolic system.

use crate::geometry::{along, Vector3d};
use crate::index_space::Axis;

/// The Levermore (1984) M1 Eddington factor. It is 1/3 in the diffusion
/// limit (`f = 0`) and 1 in the streaming limit (`f = 1`).
///
pub fn eddington_factor(f: f64) -> f64 {
    let f = f.abs().min(1.0);
    let s = (4.0 - 3.0 * f * f).sqrt();
    (3.0 + 4.0 * f * f) / (5.0 + 2.0 * s)
}

/// The derivative of `eddington_factor` with respect to the signed reduced
/// flux. It is an odd function of `f`, equal to 2 at `f = 1`.
///
pub fn eddington_factor_derivative(f: f64) -> f64 {
    let g = f.abs().min(1.0);
    let s = (4.0 - 3.0 * g * g).sqrt();
    let d = 5.0 + 2.0 * s;
    let dchi = 8.0 * g / d + 6.0 * g * (3.0 + 4.0 * g * g) / (s * d * d);
    dchi * f.signum()
}

/// The normalized Eddington tensor `D = P / E`, stored as rows.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EddingtonTensor([[f64; 3]; 3]);

impl EddingtonTensor {
    /// Build the tensor from the reduced flux vector `F / (c_hat E)`:
    ///
    /// `D = (1 - chi) / 2 I + (3 chi - 1) / 2 n n`
    ///
    pub fn from_reduced_flux(f: Vector3d) -> Self {
        let chi = eddington_factor(f.norm());
        let n = f.unit();
        let n = [n.0, n.1, n.2];
        let a = 0.5 * (1.0 - chi);
        let b = 0.5 * (3.0 * chi - 1.0);
        let mut d = [[0.0; 3]; 3];

        for (p, row) in d.iter_mut().enumerate() {
            for (q, x) in row.iter_mut().enumerate() {
                let axis_p = Axis::from_component(p);
                let axis_q = Axis::from_component(q);
                *x = a * along(axis_p, axis_q) + b * n[p] * n[q];
            }
        }
        Self(d)
    }

    /// Return the row of the tensor for the given axis.
    ///
    pub fn row(&self, axis: Axis) -> Vector3d {
        let r = self.0[axis.component()];
        Vector3d(r[0], r[1], r[2])
    }

    /// Contract the tensor with a vector: `D v`.
    ///
    pub fn dot(&self, v: Vector3d) -> Vector3d {
        Vector3d(
            self.row(Axis::I).dot(&v),
            self.row(Axis::J).dot(&v),
            self.row(Axis::K).dot(&v),
        )
    }
}

/// Return the minimum and maximum characteristic speeds of the M1 system
/// along a direction, given the signed component `f_n` of the reduced flux
/// along it. These are the eigenvalues of the one-dimensional flux Jacobian
///
/// `[[0, 1], [c^2 (chi - f chi'), c chi']]`
///
/// which are `+- c_hat / sqrt(3)` in the diffusion limit and both `c_hat sign(f)`
/// in the streaming limit. The result is clamped to `[-c_hat, c_hat]`.
///
pub fn signal_speeds(f_normal: f64, c_hat: f64) -> (f64, f64) {
    let f = f_normal.max(-1.0).min(1.0);
    let chi = eddington_factor(f);
    let dchi = eddington_factor_derivative(f);
    let disc = (dchi * dchi + 4.0 * (chi - f * dchi)).max(0.0).sqrt();
    let lm = 0.5 * c_hat * (dchi - disc);
    let lp = 0.5 * c_hat * (dchi + disc);
    (lm.max(-c_hat).min(c_hat), lp.max(-c_hat).min(c_hat))
}
