use core::ops::Range;
use serde::{Deserialize, Serialize};




/**
 * Identifier for a Cartesian axis
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    I,
    J,
    K,
}




// ============================================================================
impl Axis {

    pub const ALL: [Axis; 3] = [Axis::I, Axis::J, Axis::K];

    /**
     * Return the zero-based component number of this axis.
     */
    pub fn component(self) -> usize {
        match self {
            Axis::I => 0,
            Axis::J => 1,
            Axis::K => 2,
        }
    }

    pub fn from_component(n: usize) -> Self {
        match n {
            0 => Axis::I,
            1 => Axis::J,
            2 => Axis::K,
            _ => panic!("axis component {} out of range", n),
        }
    }
}




/**
 * A 3D index
 */
pub type Index = (i64, i64, i64);




/**
 * Represents a rectangular region in a discrete 3D index space. Lower-rank
 * problems use a unit-length range on the inactive axes.
 */
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpace {
    di: Range<i64>,
    dj: Range<i64>,
    dk: Range<i64>,
}




/**
 * Describes a rectangular index space. The index type is signed 64-bit integer.
 */
impl IndexSpace {


    pub fn new(di: Range<i64>, dj: Range<i64>, dk: Range<i64>) -> Self {

        assert!(
            di.start <= di.end && dj.start <= dj.end && dk.start <= dk.end,
            "index space has negative volume");

        Self { di, dj, dk }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize, usize) {
        ((self.di.end - self.di.start) as usize,
         (self.dj.end - self.dj.start) as usize,
         (self.dk.end - self.dk.start) as usize)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m, n) = self.dim();
        l * m * n
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> Index {
        (self.di.start, self.dj.start, self.dk.start)
    }


    /**
     * Return the maximum index (exclusive).
     */
    pub fn end(&self) -> Index {
        (self.di.end, self.dj.end, self.dk.end)
    }


    /**
     * Return the range of indexes covered on the given axis.
     */
    pub fn range(&self, axis: Axis) -> Range<i64> {
        match axis {
            Axis::I => self.di.clone(),
            Axis::J => self.dj.clone(),
            Axis::K => self.dk.clone(),
        }
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: Index) -> bool {
        self.di.contains(&index.0) && self.dj.contains(&index.1) && self.dk.contains(&index.2)
    }


    /**
     * Expand this index space by the given number of elements on both ends
     * of a single axis.
     */
    pub fn extend(&self, delta: i64, axis: Axis) -> Self {
        self.extend_lower(delta, axis).extend_upper(delta, axis)
    }


    /**
     * Expand just the lower end of this index space on the given axis.
     */
    pub fn extend_lower(&self, delta: i64, axis: Axis) -> Self {
        let mut result = self.clone();
        match axis {
            Axis::I => result.di.start -= delta,
            Axis::J => result.dj.start -= delta,
            Axis::K => result.dk.start -= delta,
        }
        Self::new(result.di, result.dj, result.dk)
    }


    /**
     * Expand just the upper end of this index space on the given axis.
     */
    pub fn extend_upper(&self, delta: i64, axis: Axis) -> Self {
        let mut result = self.clone();
        match axis {
            Axis::I => result.di.end += delta,
            Axis::J => result.dj.end += delta,
            Axis::K => result.dk.end += delta,
        }
        Self::new(result.di, result.dj, result.dk)
    }


    /**
     * Return the slab of thickness `width` lying just outside the lower (or
     * upper) face of this index space on the given axis.
     */
    pub fn slab_outside(&self, width: i64, axis: Axis, side: Side) -> Self {
        let r = self.range(axis);
        let slab = match side {
            Side::Lower => r.start - width..r.start,
            Side::Upper => r.end..r.end + width,
        };
        self.with_range(axis, slab)
    }


    /**
     * Return a copy of this index space with the range on one axis replaced.
     */
    pub fn with_range(&self, axis: Axis, range: Range<i64>) -> Self {
        match axis {
            Axis::I => Self::new(range, self.dj.clone(), self.dk.clone()),
            Axis::J => Self::new(self.di.clone(), range, self.dk.clone()),
            Axis::K => Self::new(self.di.clone(), self.dj.clone(), range),
        }
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: Index) -> usize {
        let (_, m, n) = self.dim();
        let i = (index.0 - self.di.start) as usize;
        let j = (index.1 - self.dj.start) as usize;
        let k = (index.2 - self.dk.start) as usize;
        (i * m + j) * n + k
    }


    /**
     * The inverse of `row_major_offset`.
     */
    pub fn index_at(&self, offset: usize) -> Index {
        let (_, m, n) = self.dim();
        let k = offset % n;
        let j = (offset / n) % m;
        let i = offset / (m * n);
        (self.di.start + i as i64, self.dj.start + j as i64, self.dk.start + k as i64)
    }


    /**
     * Return an iterator which traverses the index space in row-major order
     * (C-like; the final index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = Index> + '_ {
        self.di.clone().flat_map(move |i| {
            self.dj.clone().flat_map(move |j| self.dk.clone().map(move |k| (i, j, k)))
        })
    }
}




/**
 * The lower or upper end of an axis
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Lower,
    Upper,
}




impl From<(Range<i64>, Range<i64>, Range<i64>)> for IndexSpace {
    fn from(range: (Range<i64>, Range<i64>, Range<i64>)) -> Self {
        Self::new(range.0, range.1, range.2)
    }
}

impl From<IndexSpace> for (Range<i64>, Range<i64>, Range<i64>) {
    fn from(space: IndexSpace) -> Self {
        (space.di, space.dj, space.dk)
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range3d(di: Range<i64>, dj: Range<i64>, dk: Range<i64>) -> IndexSpace {
    IndexSpace::new(di, dj, dk)
}




/**
 * Translate an index by `delta` along one axis.
 */
pub fn offset(index: Index, delta: i64, axis: Axis) -> Index {
    match axis {
        Axis::I => (index.0 + delta, index.1, index.2),
        Axis::J => (index.0, index.1 + delta, index.2),
        Axis::K => (index.0, index.1, index.2 + delta),
    }
}
