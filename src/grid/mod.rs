//! Voxel grid occupancy and ray traversal.

pub mod occupancy;
pub mod visitor;
pub mod walker;

pub use occupancy::OccupancyMap;
pub use visitor::EmptinessVisitor;
pub use walker::walk_voxels;
