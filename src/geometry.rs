use crate::index_space::Axis;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/**
 * A 3D vector
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3d(pub f64, pub f64, pub f64);

// ============================================================================
impl Vector3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3d(x, y, z)
    }

    pub fn zero() -> Self {
        Vector3d(0.0, 0.0, 0.0)
    }

    pub fn from_slice(v: &[f64]) -> Self {
        Vector3d(v[0], v[1], v[2])
    }

    pub fn write_to_slice(&self, v: &mut [f64]) {
        v[0] = self.0;
        v[1] = self.1;
        v[2] = self.2;
    }

    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::I => self.0,
            Axis::J => self.1,
            Axis::K => self.2,
        }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0 * other.0 + self.1 * other.1 + self.2 * other.2
    }

    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /**
     * Return the unit vector along this one, or zero if this vector has zero
     * length.
     */
    pub fn unit(&self) -> Self {
        let n = self.norm();
        if n > 0.0 {
            *self / n
        } else {
            Self::zero()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.2.is_finite()
    }
}

/**
 * Return the Kronecker delta for two axes.
 */
pub fn along(a: Axis, b: Axis) -> f64 {
    if a == b {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
impl Add for Vector3d {
    type Output = Self;
    fn add(self, u: Self) -> Self {
        Self(self.0 + u.0, self.1 + u.1, self.2 + u.2)
    }
}

impl Sub for Vector3d {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1, self.2 - u.2)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a, self.2 * a)
    }
}

impl Div<f64> for Vector3d {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self(self.0 / a, self.1 / a, self.2 / a)
    }
}

impl Neg for Vector3d {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0, -self.1, -self.2)
    }
}
