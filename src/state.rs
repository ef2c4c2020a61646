use crate::geometry::Vector3d;
use crate::index_space::Axis;
use serde::{Deserialize, Serialize};
use std::fmt;




// ============================================================================
pub const RAD_ENERGY: usize = 0;
pub const X1_RAD_FLUX: usize = 1;
pub const X2_RAD_FLUX: usize = 2;
pub const X3_RAD_FLUX: usize = 3;
pub const GAS_ENERGY: usize = 4;
pub const GAS_DENSITY: usize = 5;
pub const X1_GAS_MOMENTUM: usize = 6;
pub const X2_GAS_MOMENTUM: usize = 7;
pub const X3_GAS_MOMENTUM: usize = 8;

/// The number of conserved quantities stored per cell.
pub const NUM_FIELDS: usize = 9;

/// The number of fields advanced by the radiation transport step (`Erad`
/// and the three flux components).
pub const NUM_RAD_FIELDS: usize = 4;




/**
 * Names one of the conserved quantities in a cell.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    RadEnergy,
    RadFlux(Axis),
    GasEnergy,
    GasDensity,
    GasMomentum(Axis),
}




// ============================================================================
impl Variable {

    pub const ALL: [Variable; NUM_FIELDS] = [
        Variable::RadEnergy,
        Variable::RadFlux(Axis::I),
        Variable::RadFlux(Axis::J),
        Variable::RadFlux(Axis::K),
        Variable::GasEnergy,
        Variable::GasDensity,
        Variable::GasMomentum(Axis::I),
        Variable::GasMomentum(Axis::J),
        Variable::GasMomentum(Axis::K),
    ];

    /**
     * Return the position of this variable in a cell's slice of the state
     * array.
     */
    pub fn index(self) -> usize {
        match self {
            Variable::RadEnergy => RAD_ENERGY,
            Variable::RadFlux(axis) => X1_RAD_FLUX + axis.component(),
            Variable::GasEnergy => GAS_ENERGY,
            Variable::GasDensity => GAS_DENSITY,
            Variable::GasMomentum(axis) => X1_GAS_MOMENTUM + axis.component(),
        }
    }

    /**
     * Whether this variable is the normal component of a vector quantity on
     * the given axis. Such components flip sign under reflection.
     */
    pub fn is_normal_component(self, axis: Axis) -> bool {
        match self {
            Variable::RadFlux(a) | Variable::GasMomentum(a) => a == axis,
            _ => false,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::RadEnergy => write!(fmt, "radiation energy"),
            Variable::RadFlux(axis) => write!(fmt, "radiation flux x{}", axis.component() + 1),
            Variable::GasEnergy => write!(fmt, "gas energy"),
            Variable::GasDensity => write!(fmt, "gas density"),
            Variable::GasMomentum(axis) => write!(fmt, "gas momentum x{}", axis.component() + 1),
        }
    }
}




/**
 * The conserved quantities of a single cell, copied out of the state array.
 */
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conserved {
    pub rad_energy: f64,
    pub rad_flux: Vector3d,
    pub gas_energy: f64,
    pub gas_density: f64,
    pub gas_momentum: Vector3d,
}




// ============================================================================
impl Conserved {

    pub fn from_slice(cons: &[f64]) -> Self {
        Self {
            rad_energy: cons[RAD_ENERGY],
            rad_flux: Vector3d::from_slice(&cons[X1_RAD_FLUX..=X3_RAD_FLUX]),
            gas_energy: cons[GAS_ENERGY],
            gas_density: cons[GAS_DENSITY],
            gas_momentum: Vector3d::from_slice(&cons[X1_GAS_MOMENTUM..=X3_GAS_MOMENTUM]),
        }
    }

    pub fn write_to_slice(&self, cons: &mut [f64]) {
        cons[RAD_ENERGY] = self.rad_energy;
        self.rad_flux.write_to_slice(&mut cons[X1_RAD_FLUX..=X3_RAD_FLUX]);
        cons[GAS_ENERGY] = self.gas_energy;
        cons[GAS_DENSITY] = self.gas_density;
        self.gas_momentum.write_to_slice(&mut cons[X1_GAS_MOMENTUM..=X3_GAS_MOMENTUM]);
    }

    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::RadEnergy => self.rad_energy,
            Variable::RadFlux(axis) => self.rad_flux.component(axis),
            Variable::GasEnergy => self.gas_energy,
            Variable::GasDensity => self.gas_density,
            Variable::GasMomentum(axis) => self.gas_momentum.component(axis),
        }
    }

    pub fn gas_velocity(&self) -> Vector3d {
        self.gas_momentum / self.gas_density
    }

    pub fn gas_kinetic_energy(&self) -> f64 {
        0.5 * self.gas_momentum.norm_squared() / self.gas_density
    }

    /**
     * The gas internal energy density: the total gas energy less the bulk
     * kinetic energy.
     */
    pub fn gas_internal_energy(&self) -> f64 {
        self.gas_energy - self.gas_kinetic_energy()
    }

    /**
     * Return the first variable holding a NaN or infinite value, if any.
     */
    pub fn first_non_finite(&self) -> Option<Variable> {
        Variable::ALL.iter().copied().find(|&v| !self.get(v).is_finite())
    }
}
