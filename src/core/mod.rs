//! Foundation types: points, poses and voxel lattice arithmetic.

pub mod point;
pub mod pose;
pub mod voxel;

pub use point::Point3;
pub use pose::{Pose, Transform4};
pub use voxel::{floor_div, floor_mod, voxel_of_point, Voxel};
