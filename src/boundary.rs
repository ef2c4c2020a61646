use crate::error::Error;
use crate::index_space::{Axis, Index, IndexSpace, Side};
use crate::mesh::{GridSpan, Mesh};
use crate::patch::Patch;
use crate::state::{Conserved, Variable, NUM_FIELDS};

/// A view of the state array handed to a problem's boundary policy. Guard
/// zones may be written; interior zones may only be read. Each guard slab
/// covers the interior range of the other axes, so corner zones are never
/// part of the view.
///
pub struct GhostZones<'a> {
    patch: &'a mut Patch,
    span: &'a GridSpan,
    mesh: &'a Mesh,
}

impl<'a> GhostZones<'a> {
    pub(crate) fn new(patch: &'a mut Patch, span: &'a GridSpan, mesh: &'a Mesh) -> Self {
        Self { patch, span, mesh }
    }

    pub fn span(&self) -> &'a GridSpan {
        self.span
    }

    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// The guard slab beyond one face of the interior.
    ///
    pub fn slab(&self, axis: Axis, side: Side) -> IndexSpace {
        self.span
            .interior()
            .slab_outside(self.span.num_guard(), axis, side)
    }

    /// Read the fields of an interior zone.
    ///
    pub fn interior(&self, index: Index) -> &[f64] {
        assert!(
            self.span.interior().contains(index),
            "zone {:?} is not in the interior",
            index
        );
        self.patch.get_slice(index)
    }

    /// Mutable access to the fields of a guard zone.
    ///
    pub fn ghost_mut(&mut self, index: Index) -> &mut [f64] {
        assert!(self.span.is_guard(index), "zone {:?} is not a guard zone", index);
        self.patch.get_slice_mut(index)
    }

    /// Fill the guard slab beyond one face from a closure of the zone index.
    ///
    pub fn fill_with<F>(&mut self, axis: Axis, side: Side, mut f: F)
    where
        F: FnMut(Index, &mut [f64]),
    {
        for index in self.slab(axis, side).iter() {
            f(index, self.ghost_mut(index))
        }
    }

    /// Fill the guard slab beyond one face with a fixed state.
    ///
    pub fn fixed(&mut self, axis: Axis, side: Side, state: &Conserved) {
        self.fill_with(axis, side, |_, slice| state.write_to_slice(slice))
    }

    /// Mirror the interior across one face. Normal components of the
    /// radiation flux and gas momentum change sign.
    ///
    pub fn reflect(&mut self, axis: Axis, side: Side) {
        let range = self.span.interior().range(axis);
        self.copy_from(axis, side, |i| match side {
            Side::Lower => 2 * range.start - 1 - i,
            Side::Upper => 2 * range.end - 1 - i,
        });
        self.fill_with(axis, side, |_, slice| {
            for v in Variable::ALL.iter() {
                if v.is_normal_component(axis) {
                    slice[v.index()] = -slice[v.index()];
                }
            }
        })
    }

    /// Copy the nearest interior zone into the guard slab (zero gradient).
    ///
    pub fn outflow(&mut self, axis: Axis, side: Side) {
        let range = self.span.interior().range(axis);
        self.copy_from(axis, side, |i| i.max(range.start).min(range.end - 1))
    }

    /// Copy zones from the opposite end of the interior.
    ///
    pub fn periodic(&mut self, axis: Axis, side: Side) {
        let range = self.span.interior().range(axis);
        let n = range.end - range.start;
        self.copy_from(axis, side, |i| match side {
            Side::Lower => i + n,
            Side::Upper => i - n,
        })
    }

    fn copy_from<M>(&mut self, axis: Axis, side: Side, source: M)
    where
        M: Fn(i64) -> i64,
    {
        let mut buffer = [0.0; NUM_FIELDS];

        for index in self.slab(axis, side).iter() {
            let i = [index.0, index.1, index.2][axis.component()];
            let src = crate::index_space::offset(index, source(i) - i, axis);
            buffer.copy_from_slice(self.interior(src));
            self.ghost_mut(index).copy_from_slice(&buffer);
        }
    }
}

/// Check the guard zones written by a boundary policy against the state
/// invariants: finite values, positive density, and radiation energy at or
/// above the floor.
///
pub fn validate_guard_zones(patch: &Patch, span: &GridSpan, erad_floor: f64) -> Result<(), Error> {
    for (_, _, slab) in span.guard_slabs() {
        for index in slab.iter() {
            let u = Conserved::from_slice(patch.get_slice(index));

            if let Some(variable) = u.first_non_finite() {
                return Err(Error::InvalidGhostZone { index, variable, value: u.get(variable) });
            }
            if u.gas_density <= 0.0 {
                return Err(Error::InvalidGhostZone {
                    index,
                    variable: Variable::GasDensity,
                    value: u.gas_density,
                });
            }
            if u.rad_energy < erad_floor {
                return Err(Error::InvalidGhostZone {
                    index,
                    variable: Variable::RadEnergy,
                    value: u.rad_energy,
                });
            }
        }
    }
    Ok(())
}
