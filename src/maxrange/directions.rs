//! Angular cone queries over the unit directions of a scan.
//!
//! The estimator needs "all point indices whose direction from the scanner
//! lies within half-angle alpha of a query direction". Two unit vectors are
//! within angle alpha of each other exactly when their chord distance is at
//! most `2 * sin(alpha / 2)`, so a k-d tree over the normalized directions
//! answers the cone query with a plain radius search.

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::Point3;

/// Index over the unit directions of a slice's scanner-local points.
pub struct DirectionIndex {
    tree: KdTree<f64, 3>,
}

impl DirectionIndex {
    /// Build the index. Points must be non-zero; the pipeline's range
    /// filter guarantees this for scan returns.
    pub fn new(points: &[Point3]) -> Self {
        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (j, p) in points.iter().enumerate() {
            let d = p.normalized();
            tree.add(&[d.x, d.y, d.z], j as u64);
        }
        Self { tree }
    }

    /// Indices of all points whose direction lies within `half_angle`
    /// radians of the unit vector `direction`.
    pub fn search(&self, direction: &Point3, half_angle: f64) -> Vec<usize> {
        let clamped = half_angle.clamp(0.0, std::f64::consts::PI);
        let chord = 2.0 * (clamped / 2.0).sin();
        self.tree
            .within_unsorted::<SquaredEuclidean>(&[direction.x, direction.y, direction.z], chord * chord)
            .into_iter()
            .map(|n| n.item as usize)
            .collect()
    }
}
