//! Reference solutions used to judge a run: the tabulated Su-Olson
//! transport solution, the analytic diffusing Gaussian, and the
//! interpolation and error norms that compare a numerical profile against
//! them.

use std::f64::consts::PI;

/// Positions (in mean free paths) at which the Su-Olson solution is
/// tabulated.
pub const SU_OLSON_POSITIONS: [f64; 13] = [
    0.01, 0.1, 0.17783, 0.31623, 0.45, 0.5, 0.56234, 0.75, 1.0, 1.33352, 1.77828, 3.16228,
    5.62341,
];

/**
 * A profile tabulated at a fixed set of positions, at one instant. Values
 * are in units of `a T_H^4`.
 */
#[derive(Clone, Copy, Debug)]
pub struct ReferenceProfile {
    pub time: f64,
    pub x: &'static [f64],
    pub values: &'static [f64],
}

pub const SU_OLSON_ERAD_TRANSPORT_0P1: ReferenceProfile = ReferenceProfile {
    time: 0.1,
    x: &SU_OLSON_POSITIONS,
    values: &[
        0.09531, 0.09531, 0.09532, 0.09529, 0.08823, 0.04765, 0.00375, 0.0, 0.0, 0.0, 0.0, 0.0,
        0.0,
    ],
};

pub const SU_OLSON_ERAD_TRANSPORT_1: ReferenceProfile = ReferenceProfile {
    time: 1.0,
    x: &SU_OLSON_POSITIONS,
    values: &[
        0.64308, 0.63585, 0.61958, 0.56187, 0.44711, 0.35801, 0.25374, 0.11430, 0.03648, 0.00291,
        0.0, 0.0, 0.0,
    ],
};

pub const SU_OLSON_EGAS_TRANSPORT_1: ReferenceProfile = ReferenceProfile {
    time: 1.0,
    x: &SU_OLSON_POSITIONS,
    values: &[
        0.27126, 0.26839, 0.26261, 0.23978, 0.18826, 0.14187, 0.08838, 0.03014, 0.00625, 0.00017,
        0.0, 0.0, 0.0,
    ],
};

pub const SU_OLSON_ERAD_TRANSPORT_10: ReferenceProfile = ReferenceProfile {
    time: 10.0,
    x: &SU_OLSON_POSITIONS,
    values: &[
        2.23575, 2.21944, 2.18344, 2.06448, 1.86072, 1.73178, 1.57496, 1.27398, 0.98782, 0.70822,
        0.45016, 0.09673, 0.00375,
    ],
};

pub const SU_OLSON_EGAS_TRANSPORT_10: ReferenceProfile = ReferenceProfile {
    time: 10.0,
    x: &SU_OLSON_POSITIONS,
    values: &[
        2.11186, 2.09585, 2.06052, 1.94365, 1.74291, 1.61536, 1.46027, 1.16591, 0.88992, 0.62521,
        0.38688, 0.07642, 0.00253,
    ],
};

/// The diffusion-approximation solution at `tau = 10`, which the transport
/// solution should *not* match.
pub const SU_OLSON_ERAD_DIFFUSION_10: ReferenceProfile = ReferenceProfile {
    time: 10.0,
    x: &SU_OLSON_POSITIONS,
    values: &[
        1.86585, 1.85424, 1.82889, 1.74866, 1.62824, 1.57237, 1.50024, 1.29758, 1.06011, 0.79696,
        0.52980, 0.12187, 0.00445,
    ],
};




// ============================================================================
impl ReferenceProfile {
    /**
     * Apply a function to every tabulated value, e.g. to turn an energy
     * density into a temperature.
     */
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Vec<f64> {
        self.values.iter().map(|&v| f(v)).collect()
    }
}




/**
 * Linearly interpolate the samples `(xs, ys)` at the point `x`. The
 * abscissae must be increasing; points outside the sampled range take the
 * nearest end value.
 */
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    assert_eq!(xs.len(), ys.len(), "abscissae and ordinates differ in length");
    assert!(!xs.is_empty(), "cannot interpolate an empty profile");

    let n = xs.len();

    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let i = xs.partition_point(|&xi| xi <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/**
 * Interpolate the samples `(xs, ys)` onto each of the points `targets`.
 */
pub fn interpolate_onto(targets: &[f64], xs: &[f64], ys: &[f64]) -> Vec<f64> {
    targets.iter().map(|&x| interpolate(xs, ys, x)).collect()
}

/**
 * Relative L1 error, `sum |a - b| / sum |b|`, of `approx` against `exact`.
 */
pub fn relative_l1_error(approx: &[f64], exact: &[f64]) -> f64 {
    assert_eq!(approx.len(), exact.len());
    let err: f64 = approx.iter().zip(exact).map(|(a, b)| (a - b).abs()).sum();
    let norm: f64 = exact.iter().map(|b| b.abs()).sum();
    err / norm
}

/**
 * Relative L2 error, `sqrt(sum (a - b)^2 / sum b^2)`, of `approx` against
 * `exact`.
 */
pub fn relative_l2_error(approx: &[f64], exact: &[f64]) -> f64 {
    assert_eq!(approx.len(), exact.len());
    let err: f64 = approx.iter().zip(exact).map(|(a, b)| (a - b).powi(2)).sum();
    let norm: f64 = exact.iter().map(|b| b * b).sum();
    (err / norm).sqrt()
}

/**
 * The unit-mass Gaussian spreading under linear diffusion with coefficient
 * `diffusion`, starting from width `sigma` at `t = 0`:
 *
 * `E(x, t) = exp(-x^2 / 4w) / (2 sqrt(pi w))`, `w = sigma^2 + D t`.
 */
pub fn gaussian_pulse(x: f64, t: f64, sigma: f64, diffusion: f64) -> f64 {
    let w = sigma * sigma + diffusion * t;
    (-x * x / (4.0 * w)).exp() / (2.0 * (PI * w).sqrt())
}
