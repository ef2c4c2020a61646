//! Reconstruction of face values from cell averages along one axis.

use serde::{Deserialize, Serialize};

/// Slope limiters for piecewise-linear reconstruction.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeLimiter {
    Minmod,
    MonotonizedCentral,
    VanLeer,
}

impl SlopeLimiter {
    /// Return the limited slope, given the backward and forward differences.
    ///
    pub fn slope(self, dl: f64, dr: f64) -> f64 {
        if dl * dr <= 0.0 {
            return 0.0;
        }
        match self {
            SlopeLimiter::Minmod => minmod(dl, dr),
            SlopeLimiter::MonotonizedCentral => minmod(minmod(2.0 * dl, 2.0 * dr), 0.5 * (dl + dr)),
            SlopeLimiter::VanLeer => 2.0 * dl * dr / (dl + dr),
        }
    }
}

fn minmod(a: f64, b: f64) -> f64 {
    if a * b <= 0.0 {
        0.0
    } else if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

/// The interface reconstruction policy.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconstruction {
    PiecewiseConstant,
    PiecewiseLinear(SlopeLimiter),
    Ppm,
}

impl Default for Reconstruction {
    fn default() -> Self {
        Reconstruction::PiecewiseLinear(SlopeLimiter::MonotonizedCentral)
    }
}

impl Reconstruction {
    /// Return the values at the lower and upper faces of the central zone of
    /// a five-zone stencil `q[0..5]` (the zone itself is `q[2]`).
    ///
    pub fn face_values(self, q: &[f64; 5]) -> (f64, f64) {
        match self {
            Reconstruction::PiecewiseConstant => (q[2], q[2]),
            Reconstruction::PiecewiseLinear(limiter) => {
                let slope = limiter.slope(q[2] - q[1], q[3] - q[2]);
                (q[2] - 0.5 * slope, q[2] + 0.5 * slope)
            }
            Reconstruction::Ppm => ppm_face_values(q),
        }
    }
}

/// Piecewise-parabolic face values (Colella & Woodward 1984), with the
/// interface values bounded by their neighbors and the parabola limited to
/// be monotone within the zone.
///
fn ppm_face_values(q: &[f64; 5]) -> (f64, f64) {
    let interface = |a: f64, b: f64, c: f64, d: f64| {
        let v = (7.0 * (b + c) - (a + d)) / 12.0;
        v.max(b.min(c)).min(b.max(c))
    };
    let mut ql = interface(q[0], q[1], q[2], q[3]);
    let mut qr = interface(q[1], q[2], q[3], q[4]);
    let q0 = q[2];

    if (qr - q0) * (q0 - ql) <= 0.0 {
        return (q0, q0);
    }
    let dq = qr - ql;
    let q6 = 6.0 * (q0 - 0.5 * (ql + qr));

    if dq * q6 > dq * dq {
        ql = 3.0 * q0 - 2.0 * qr;
    } else if -dq * dq > dq * q6 {
        qr = 3.0 * q0 - 2.0 * ql;
    }
    (ql, qr)
}
