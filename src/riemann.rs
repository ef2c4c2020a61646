use crate::closure::{signal_speeds, EddingtonTensor};
use crate::geometry::Vector3d;
use crate::index_space::Axis;
use std::ops::{Add, Mul, Sub};




/**
 * The transported part of the state: radiation energy density and the
 * (reduced) radiation flux vector.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RadState {
    pub energy: f64,
    pub flux: Vector3d,
}




/**
 * A vector in the space of transported quantities: used for both states and
 * fluxes of the radiation moment equations.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RadVector(pub f64, pub Vector3d);




// ============================================================================
impl RadState {

    pub fn new(energy: f64, flux: Vector3d) -> Self {
        Self { energy, flux }
    }

    /**
     * Return the reduced flux `F / (c_hat E)`, with the energy clamped to a
     * positive floor.
     */
    pub fn reduced_flux(&self, c_hat: f64, floor: f64) -> Vector3d {
        self.flux / (c_hat * self.energy.max(floor))
    }

    pub fn as_vector(&self) -> RadVector {
        RadVector(self.energy, self.flux)
    }

    /**
     * The physical flux of the moment equations through a face normal to
     * `axis`: `(F_n, c_hat^2 P_n)` with `P = E D`.
     */
    pub fn flux_vector(&self, axis: Axis, c_hat: f64, floor: f64) -> RadVector {
        let d = EddingtonTensor::from_reduced_flux(self.reduced_flux(c_hat, floor));
        RadVector(
            self.flux.component(axis),
            d.row(axis) * (c_hat * c_hat * self.energy),
        )
    }

    /**
     * The minimum and maximum characteristic speeds along `axis`.
     */
    pub fn outer_wavespeeds(&self, axis: Axis, c_hat: f64, floor: f64) -> (f64, f64) {
        signal_speeds(self.reduced_flux(c_hat, floor).component(axis), c_hat)
    }
}




// ============================================================================
impl RadVector {

    pub fn energy(&self) -> f64 {
        self.0
    }

    pub fn flux(&self) -> Vector3d {
        self.1
    }

    pub fn write_to_slice(&self, f: &mut [f64]) {
        f[0] = self.0;
        self.1.write_to_slice(&mut f[1..4]);
    }
}

impl Add<RadVector> for RadVector {
    type Output = RadVector;
    fn add(self, u: Self) -> RadVector {
        RadVector(self.0 + u.0, self.1 + u.1)
    }
}

impl Sub<RadVector> for RadVector {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1)
    }
}

impl Mul<f64> for RadVector {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a)
    }
}




/**
 * The optical depth of a face: the cell width times the harmonic mean of the
 * Rosseland absorption coefficients `rho kappa_R` on either side. The
 * harmonic mean lets an optically thin zone next to a thick one dominate.
 */
pub fn face_optical_depth(chi_l: f64, chi_r: f64, dx: f64) -> f64 {
    let sum = chi_l + chi_r;
    if sum > 0.0 {
        dx * 2.0 * chi_l * chi_r / sum
    } else {
        0.0
    }
}




// ============================================================================
/**
 * HLL Riemann solver for the M1 radiation moment equations. Wavespeeds come
 * from the M1 closure, bounded by the reduced speed of light, and are
 * extended to include zero so that the flux reduces to upwinding when all
 * waves move one way. The diffusive term of the energy equation is scaled
 * by `min(1, 1 / tau)` where `tau` is the face optical depth, which recovers
 * the correct diffusion limit in optically thick media.
 */
pub fn riemann_hll(sl: RadState, sr: RadState, axis: Axis, c_hat: f64, floor: f64, tau: f64) -> RadVector {
    let ul = sl.as_vector();
    let ur = sr.as_vector();
    let fl = sl.flux_vector(axis, c_hat, floor);
    let fr = sr.flux_vector(axis, c_hat, floor);

    let (alm, alp) = sl.outer_wavespeeds(axis, c_hat, floor);
    let (arm, arp) = sr.outer_wavespeeds(axis, c_hat, floor);
    let ap = alp.max(arp).max(0.0);
    let am = alm.min(arm).min(0.0);

    if ap - am <= 0.0 {
        return (fl + fr) * 0.5;
    }
    let epsilon = if tau > 1.0 { 1.0 / tau } else { 1.0 };
    let diffusive = (ul - ur) * (ap * am);
    let diffusive = RadVector(diffusive.0 * epsilon, diffusive.1);

    (fl * ap - fr * am - diffusive) * (1.0 / (ap - am))
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use approx::assert_relative_eq;

    const C: f64 = 1.0;
    const FLOOR: f64 = 1e-30;

    #[test]
    fn uniform_state_flux_equals_physical_flux() {
        let s = RadState::new(2.0, Vector3d::new(0.5, 0.0, 0.0));
        let f = riemann_hll(s, s, Axis::I, C, FLOOR, 0.0);
        let g = s.flux_vector(Axis::I, C, FLOOR);
        assert_relative_eq!(f.energy(), g.energy(), epsilon = 1e-14);
        assert_relative_eq!(f.flux().0, g.flux().0, epsilon = 1e-14);
    }

    #[test]
    fn streaming_beam_is_upwinded() {
        let sl = RadState::new(1.0, Vector3d::new(1.0, 0.0, 0.0));
        let sr = RadState::new(1.0, Vector3d::new(1.0, 0.0, 0.0));
        let f = riemann_hll(sl, sr, Axis::I, C, FLOOR, 0.0);
        assert_relative_eq!(f.energy(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.flux().0, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mirrored_states_carry_no_energy_through_the_face() {
        let sl = RadState::new(1.5, Vector3d::new(0.7, 0.2, 0.0));
        let sr = RadState::new(1.5, Vector3d::new(-0.7, 0.2, 0.0));
        let f = riemann_hll(sl, sr, Axis::I, C, FLOOR, 3.0);
        assert_relative_eq!(f.energy(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn thick_faces_suppress_energy_dissipation() {
        let sl = RadState::new(2.0, Vector3d::zero());
        let sr = RadState::new(1.0, Vector3d::zero());
        let thin = riemann_hll(sl, sr, Axis::I, C, FLOOR, 0.5);
        let thick = riemann_hll(sl, sr, Axis::I, C, FLOOR, 100.0);
        assert_relative_eq!(thin.energy(), 0.5 / 3f64.sqrt(), epsilon = 1e-14);
        assert_relative_eq!(thick.energy(), thin.energy() / 100.0, epsilon = 1e-14);
    }

    #[test]
    fn harmonic_mean_is_dominated_by_the_thin_side() {
        assert_relative_eq!(face_optical_depth(1.0, 1.0, 0.5), 0.5);
        assert!(face_optical_depth(1e6, 1e-3, 1.0) < 2.1e-3);
        assert_eq!(face_optical_depth(0.0, 0.0, 1.0), 0.0);
    }
}
