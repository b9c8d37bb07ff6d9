//! Sparse occupancy map: which scan slices returned points from which voxel.

use std::collections::{BTreeSet, HashMap};

use crate::core::{voxel_of_point, Point3, Voxel};

/// Maps each occupied voxel to the ordered set of slice indices with at
/// least one return inside it.
///
/// Lookups are O(1) average on the ray-walking hot path; the value sets are
/// ordered so the emptiness visitor can run "smallest index >= k" queries.
#[derive(Debug, Default)]
pub struct OccupancyMap {
    cells: HashMap<Voxel, BTreeSet<usize>>,
    voxel_size: f64,
}

impl OccupancyMap {
    /// Create an empty map for the given grid size.
    pub fn new(voxel_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            voxel_size,
        }
    }

    /// Record that `slice` has a return at global point `p`.
    #[inline]
    pub fn insert(&mut self, p: &Point3, slice: usize) {
        self.cells
            .entry(voxel_of_point(p, self.voxel_size))
            .or_default()
            .insert(slice);
    }

    /// Record every point of a slice.
    pub fn insert_slice(&mut self, points: &[Point3], slice: usize) {
        for p in points {
            self.insert(p, slice);
        }
    }

    /// Slice indices with returns in voxel `v`, if any.
    #[inline]
    pub fn get(&self, v: &Voxel) -> Option<&BTreeSet<usize>> {
        self.cells.get(v)
    }

    /// Number of occupied voxels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no voxel is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid size the map was built with.
    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }
}
