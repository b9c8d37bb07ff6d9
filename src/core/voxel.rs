//! Voxel lattice coordinates and the floor arithmetic they depend on.
//!
//! Native integer division truncates toward zero, which corrupts the voxel
//! lattice around the origin: a point at -0.1 must land in voxel -1, not 0.
//! Every point-to-voxel mapping in the crate therefore goes through
//! [`floor_div`] / [`floor_mod`], which round toward negative infinity the
//! way Python's `//` and `%` do.

use serde::{Deserialize, Serialize};

use super::point::Point3;

/// Floor division of `a / b`, rounding toward negative infinity.
#[inline]
pub fn floor_div(a: f64, b: f64) -> i64 {
    let mut q = (a / b) as i64;
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        q -= 1;
    }
    q
}

/// Floor modulo of `a % b`; the result carries the sign of `b`.
#[inline]
pub fn floor_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else {
        r
    }
}

/// A cell of the axis-aligned voxel lattice.
///
/// Ordering is lexicographic on (x, y, z); keys are plain values and hash
/// without allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Voxel {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Voxel {
    /// Create a new voxel key.
    #[inline]
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

/// Map a point to the voxel containing it at grid size `voxel_size`.
#[inline]
pub fn voxel_of_point(p: &Point3, voxel_size: f64) -> Voxel {
    Voxel::new(
        floor_div(p.x, voxel_size),
        floor_div(p.y, voxel_size),
        floor_div(p.z, voxel_size),
    )
}
