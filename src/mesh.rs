use crate::error::Error;
use crate::index_space::{Axis, Index, IndexSpace, Side};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The width of the guard zone layer on each face of the grid. Three zones
/// accommodate the widest reconstruction stencil (PPM).
pub const NUM_GUARD: i64 = 3;

/// A simple rectilinear structured mesh, with one to three active axes.
/// Inactive axes have a single zone and no guard zones.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
    pub size: [i64; 3],
}

impl Mesh {
    pub fn new_1d(area: Range<f64>, size: i64) -> Self {
        Self {
            lower: [area.start, 0.0, 0.0],
            upper: [area.end, 1.0, 1.0],
            size: [size, 1, 1],
        }
    }

    pub fn new_3d(area: [Range<f64>; 3], size: [i64; 3]) -> Self {
        Self {
            lower: [area[0].start, area[1].start, area[2].start],
            upper: [area[0].end, area[1].end, area[2].end],
            size,
        }
    }

    /// Check that the mesh has positive extent and resolution, and at least
    /// one active axis.
    ///
    pub fn validate(&self) -> Result<(), Error> {
        for n in 0..3 {
            if self.size[n] < 1 || !(self.upper[n] > self.lower[n]) {
                return Err(Error::InvalidConfiguration(format!(
                    "mesh axis {} has size {} over [{}, {}]",
                    n, self.size[n], self.lower[n], self.upper[n]
                )));
            }
        }
        if self.size[0] < 2 {
            return Err(Error::InvalidConfiguration(
                "the first mesh axis must be active".to_string(),
            ));
        }
        for axis in self.active_axes() {
            if self.size[axis.component()] < NUM_GUARD {
                return Err(Error::InvalidConfiguration(format!(
                    "active mesh axis {:?} needs at least {} zones",
                    axis, NUM_GUARD
                )));
            }
        }
        Ok(())
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        self.size[axis.component()] > 1
    }

    pub fn active_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.iter().copied().filter(move |&a| self.is_active(a))
    }

    pub fn cell_spacing(&self, axis: Axis) -> f64 {
        let n = axis.component();
        (self.upper[n] - self.lower[n]) / self.size[n] as f64
    }

    /// The smallest cell spacing over the active axes.
    ///
    pub fn min_spacing(&self) -> f64 {
        self.active_axes()
            .map(|a| self.cell_spacing(a))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn cell_center(&self, index: Index) -> [f64; 3] {
        let i = [index.0, index.1, index.2];
        let mut x = [0.0; 3];
        for n in 0..3 {
            let d = self.cell_spacing(Axis::from_component(n));
            x[n] = self.lower[n] + d * (i[n] as f64 + 0.5);
        }
        x
    }

    /// The cell volume, measured over the active axes only.
    ///
    pub fn cell_volume(&self) -> f64 {
        self.active_axes().map(|a| self.cell_spacing(a)).product()
    }

    /// The area of a face normal to `axis`, measured over the other active
    /// axes (1 in one dimension).
    ///
    pub fn face_area(&self, axis: Axis) -> f64 {
        self.cell_volume() / self.cell_spacing(axis)
    }

    pub fn total_zones(&self) -> i64 {
        self.size.iter().product()
    }

    pub fn span(&self) -> GridSpan {
        GridSpan::new(
            IndexSpace::new(0..self.size[0], 0..self.size[1], 0..self.size[2]),
            NUM_GUARD,
            [
                self.is_active(Axis::I),
                self.is_active(Axis::J),
                self.is_active(Axis::K),
            ],
        )
    }
}

/// The interior index range of a grid, together with a guard zone layer of
/// fixed width on every face of each active axis. The span never changes
/// during a run.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridSpan {
    interior: IndexSpace,
    num_guard: i64,
    active: [bool; 3],
}

impl GridSpan {
    pub fn new(interior: IndexSpace, num_guard: i64, active: [bool; 3]) -> Self {
        Self {
            interior,
            num_guard,
            active,
        }
    }

    pub fn interior(&self) -> &IndexSpace {
        &self.interior
    }

    pub fn num_guard(&self) -> i64 {
        self.num_guard
    }

    pub fn is_active(&self, axis: Axis) -> bool {
        self.active[axis.component()]
    }

    pub fn active_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.iter().copied().filter(move |&a| self.is_active(a))
    }

    /// The interior plus guard zones: the index space of the state array.
    ///
    pub fn extended(&self) -> IndexSpace {
        self.active_axes()
            .fold(self.interior.clone(), |s, a| s.extend(self.num_guard, a))
    }

    /// Return the guard zone slabs: one per face of each active axis, each
    /// spanning the interior range of the other axes. Corner zones are not
    /// included; the dimensionally split flux sweeps never read them.
    ///
    pub fn guard_slabs(&self) -> Vec<(Axis, Side, IndexSpace)> {
        let mut slabs = Vec::new();
        for axis in self.active_axes() {
            for side in [Side::Lower, Side::Upper].iter().copied() {
                slabs.push((axis, side, self.interior.slab_outside(self.num_guard, axis, side)));
            }
        }
        slabs
    }

    pub fn is_guard(&self, index: Index) -> bool {
        self.extended().contains(index) && !self.interior.contains(index)
    }
}
