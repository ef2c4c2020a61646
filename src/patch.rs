use crate::index_space::{Index, IndexSpace};
use rayon::prelude::*;




/**
 * A patch is a mapping from a rectangular subset of an index space to a fixed
 * number of field values per zone. The mapping is backed by a contiguous,
 * row-major array, with the fields of each zone stored adjacent to one
 * another. Patches own their data; kernels that need to run over the zones
 * in parallel do so through the `map` family of methods, each of which hands
 * disjoint zone slices to the rayon thread pool.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    space: IndexSpace,
    num_fields: usize,
    data: Vec<f64>,
}




// ============================================================================
impl Patch {


    /**
     * Generate a patch of zeros over the given index space.
     */
    pub fn zeros(num_fields: usize, space: IndexSpace) -> Self {
        Self {
            data: vec![0.0; space.len() * num_fields],
            space,
            num_fields,
        }
    }


    /**
     * Generate a patch covering the given space, with values defined from a
     * closure which writes a zone's fields into a mutable slice. The closure
     * is evaluated in parallel.
     */
    pub fn from_slice_function<F>(space: IndexSpace, num_fields: usize, f: F) -> Self
    where
        F: Fn(Index, &mut [f64]) + Sync,
    {
        let mut patch = Self::zeros(num_fields, space);
        patch.map_mut(|index, slice| f(index, slice));
        patch
    }


    pub fn index_space(&self) -> &IndexSpace {
        &self.space
    }


    pub fn num_fields(&self) -> usize {
        self.num_fields
    }


    pub fn data(&self) -> &[f64] {
        &self.data
    }


    /**
     * Return the fields of the zone at the given index.
     */
    pub fn get_slice(&self, index: Index) -> &[f64] {
        self.validate_index(index);
        let s = self.space.row_major_offset(index) * self.num_fields;
        &self.data[s..s + self.num_fields]
    }


    pub fn get_slice_mut(&mut self, index: Index) -> &mut [f64] {
        self.validate_index(index);
        let s = self.space.row_major_offset(index) * self.num_fields;
        &mut self.data[s..s + self.num_fields]
    }


    pub fn get(&self, index: Index, field: usize) -> f64 {
        self.get_slice(index)[field]
    }


    /**
     * Apply a closure to every zone in the patch, in parallel.
     */
    pub fn map_mut<F>(&mut self, f: F)
    where
        F: Fn(Index, &mut [f64]) + Sync,
    {
        let space = &self.space;
        self.data
            .par_chunks_mut(self.num_fields)
            .enumerate()
            .for_each(|(n, slice)| f(space.index_at(n), slice))
    }


    /**
     * Apply a fallible closure to the zones lying in `subspace`, in
     * parallel. One of the errors is returned if any application fails;
     * zones other than the failing one may or may not have been visited.
     */
    pub fn try_map_mut_in<F, E>(&mut self, subspace: &IndexSpace, f: F) -> Result<(), E>
    where
        F: Fn(Index, &mut [f64]) -> Result<(), E> + Sync,
        E: Send,
    {
        let space = &self.space;
        self.data
            .par_chunks_mut(self.num_fields)
            .enumerate()
            .try_for_each(|(n, slice)| {
                let index = space.index_at(n);
                if subspace.contains(index) {
                    f(index, slice)
                } else {
                    Ok(())
                }
            })
    }


    /**
     * Sum a function of each zone's fields over the zones in `subspace`.
     */
    pub fn sum_over<F>(&self, subspace: &IndexSpace, f: F) -> f64
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        let space = &self.space;
        self.data
            .par_chunks(self.num_fields)
            .enumerate()
            .filter(|(n, _)| subspace.contains(space.index_at(*n)))
            .map(|(_, slice)| f(slice))
            .sum()
    }


    /**
     * The maximum of a function of each zone's fields over the zones in
     * `subspace`, or negative infinity if the subspace is empty.
     */
    pub fn max_over<F>(&self, subspace: &IndexSpace, f: F) -> f64
    where
        F: Fn(&[f64]) -> f64 + Sync,
    {
        let space = &self.space;
        self.data
            .par_chunks(self.num_fields)
            .enumerate()
            .filter(|(n, _)| subspace.contains(space.index_at(*n)))
            .map(|(_, slice)| f(slice))
            .reduce(|| f64::NEG_INFINITY, f64::max)
    }


    /**
     * Overwrite this patch with the weighted combination `a * self + b *
     * other`, zone by zone. The two patches must cover the same space.
     */
    pub fn combine(&mut self, a: f64, other: &Patch, b: f64) {
        assert!(self.space == other.space && self.num_fields == other.num_fields,
            "combined patches must have the same layout");

        self.data
            .par_iter_mut()
            .zip(other.data.par_iter())
            .for_each(|(x, y)| *x = a * *x + b * *y)
    }


    fn validate_index(&self, index: Index) {
        if !self.space.contains(index) {
            panic!("index {:?} out of range on patch {:?}", index, self.space);
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::Patch;
    use crate::index_space::range3d;

    #[test]
    fn patch_slices_are_addressed_by_index() {
        let patch = Patch::from_slice_function(range3d(-2..6, 0..3, 0..1), 2, |(i, j, _), s| {
            s[0] = i as f64;
            s[1] = j as f64;
        });
        assert_eq!(patch.get_slice((-2, 1, 0)), &[-2.0, 1.0]);
        assert_eq!(patch.get((5, 2, 0), 1), 2.0);
    }

    #[test]
    fn sums_and_fallible_maps_are_restricted_to_the_subspace() {
        let mut patch = Patch::from_slice_function(range3d(-3..13, 0..1, 0..1), 1, |_, s| s[0] = 1.0);
        let interior = range3d(0..10, 0..1, 0..1);
        assert_eq!(patch.sum_over(&interior, |s| s[0]), 10.0);

        let result: Result<(), i64> = patch.try_map_mut_in(&interior, |(i, _, _), s| {
            s[0] = 2.0;
            if i == 11 { Err(i) } else { Ok(()) }
        });
        assert!(result.is_ok());
        assert_eq!(patch.get((-1, 0, 0), 0), 1.0);
        assert_eq!(patch.get((9, 0, 0), 0), 2.0);

        let result: Result<(), i64> = patch.try_map_mut_in(&interior, |(i, _, _), _| {
            if i == 4 { Err(i) } else { Ok(()) }
        });
        assert_eq!(result, Err(4));
    }

    #[test]
    fn maximum_ignores_zones_outside_the_subspace() {
        let patch = Patch::from_slice_function(range3d(-3..13, 0..1, 0..1), 1, |(i, _, _), s| s[0] = i as f64);
        assert_eq!(patch.max_over(&range3d(0..10, 0..1, 0..1), |s| s[0]), 9.0);
        assert_eq!(patch.max_over(&range3d(0..0, 0..1, 0..1), |s| s[0]), f64::NEG_INFINITY);
    }

    #[test]
    fn combine_averages_two_patches() {
        let mut a = Patch::from_slice_function(range3d(0..4, 0..1, 0..1), 1, |_, s| s[0] = 1.0);
        let b = Patch::from_slice_function(range3d(0..4, 0..1, 0..1), 1, |_, s| s[0] = 3.0);
        a.combine(0.5, &b, 0.5);
        assert!(a.data().iter().all(|&x| x == 2.0));
    }

    #[test]
    #[should_panic]
    fn out_of_range_access_panics() {
        let patch = Patch::zeros(1, range3d(0..4, 0..1, 0..1));
        patch.get_slice((4, 0, 0));
    }
}
