//! The per-voxel decision applied while walking a line of sight.

use std::collections::BTreeSet;

use crate::core::Voxel;

use super::occupancy::OccupancyMap;

/// Visitor state for one ray: marks traversed voxels empty unless a
/// temporally nearby slice has returns there.
///
/// A voxel with no returns at all gives no evidence either way, so it is
/// skipped without being marked. A voxel whose occupant slices fall inside
/// the sliding window `[slice - diff, slice + diff]` is treated as a real
/// surface and terminates the walk; occupants only seen from distant slices
/// mean the ray passed through, so the voxel is recorded as empty.
pub struct EmptinessVisitor<'a> {
    occupancy: &'a OccupancyMap,
    current_slice: usize,
    diff: usize,
    empty: BTreeSet<Voxel>,
}

impl<'a> EmptinessVisitor<'a> {
    /// Create a visitor for rays of `current_slice` with window radius `diff`.
    pub fn new(occupancy: &'a OccupancyMap, current_slice: usize, diff: usize) -> Self {
        Self {
            occupancy,
            current_slice,
            diff,
            empty: BTreeSet::new(),
        }
    }

    /// Decide one voxel; returns false to stop the walk.
    pub fn visit(&mut self, v: Voxel) -> bool {
        let slices = match self.occupancy.get(&v) {
            Some(slices) => slices,
            None => return true,
        };
        if self.diff == 0 {
            if slices.contains(&self.current_slice) {
                return false;
            }
        } else {
            let window_start = self.current_slice.saturating_sub(self.diff);
            if let Some(&first) = slices.range(window_start..).next() {
                if first <= self.current_slice + self.diff {
                    return false;
                }
            }
        }
        self.empty.insert(v);
        true
    }

    /// Voxels this visitor proved traversable.
    pub fn into_empty(self) -> BTreeSet<Voxel> {
        self.empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point3;

    fn occupancy_with(entries: &[(Voxel, &[usize])]) -> OccupancyMap {
        let mut map = OccupancyMap::new(1.0);
        for (v, slices) in entries {
            for &s in *slices {
                map.insert(
                    &Point3::new(v.x as f64 + 0.5, v.y as f64 + 0.5, v.z as f64 + 0.5),
                    s,
                );
            }
        }
        map
    }

    #[test]
    fn test_unoccupied_voxel_continues_without_marking() {
        let map = occupancy_with(&[]);
        let mut visitor = EmptinessVisitor::new(&map, 0, 0);
        assert!(visitor.visit(Voxel::new(5, 5, 5)));
        assert!(visitor.into_empty().is_empty());
    }

    #[test]
    fn test_own_slice_stops_walk() {
        let v = Voxel::new(1, 0, 0);
        let map = occupancy_with(&[(v, &[3])]);
        let mut visitor = EmptinessVisitor::new(&map, 3, 0);
        assert!(!visitor.visit(v));
        assert!(visitor.into_empty().is_empty());
    }

    #[test]
    fn test_foreign_slice_marks_empty() {
        let v = Voxel::new(1, 0, 0);
        let map = occupancy_with(&[(v, &[7])]);
        let mut visitor = EmptinessVisitor::new(&map, 3, 0);
        assert!(visitor.visit(v));
        assert_eq!(visitor.into_empty().into_iter().collect::<Vec<_>>(), vec![v]);
    }

    #[test]
    fn test_window_spares_adjacent_slices() {
        let v = Voxel::new(2, 0, 0);
        let map = occupancy_with(&[(v, &[1])]);
        let mut visitor = EmptinessVisitor::new(&map, 0, 1);
        // slice 1 lies inside [0, 1]: evidence of a real surface
        assert!(!visitor.visit(v));
        assert!(visitor.into_empty().is_empty());
    }

    #[test]
    fn test_window_marks_distant_slices() {
        let v = Voxel::new(2, 0, 0);
        let map = occupancy_with(&[(v, &[9])]);
        let mut visitor = EmptinessVisitor::new(&map, 0, 1);
        assert!(visitor.visit(v));
        assert_eq!(visitor.into_empty().len(), 1);
    }

    #[test]
    fn test_window_start_clamps_at_zero() {
        let v = Voxel::new(2, 0, 0);
        let map = occupancy_with(&[(v, &[0])]);
        // current slice 1 with diff 5 would underflow an unchecked window
        let mut visitor = EmptinessVisitor::new(&map, 1, 5);
        assert!(!visitor.visit(v));
    }

    #[test]
    fn test_window_uses_lower_bound_search() {
        let v = Voxel::new(2, 0, 0);
        let map = occupancy_with(&[(v, &[0, 20])]);
        let mut visitor = EmptinessVisitor::new(&map, 10, 3);
        // occupants exist below and above the window but none inside it
        assert!(visitor.visit(v));
        assert_eq!(visitor.into_empty().len(), 1);
    }
}
