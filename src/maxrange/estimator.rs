//! Per-point maximum ray ranges from local surface normals.
//!
//! Shooting every line of sight all the way to its return makes the walk
//! cost proportional to scene depth. When the local surface around a return
//! is known, the ray only needs to reach a stop plane one voxel diagonal
//! (plus a fuzz margin) in front of that surface: anything beyond cannot be
//! seen through anyway. Points are processed from the scanner outward so
//! that the first point of a surface claims the whole angular shadow behind
//! it and later points in the cone inherit its plane bound.

use crate::core::Point3;
use crate::error::{Error, Result};

use super::directions::DirectionIndex;
use super::normals::plane_normal;

/// Compute the maxrange table row for one slice in `normals` mode.
///
/// `points` are scanner-local coordinates after range filtering, so every
/// radius is at least one voxel diagonal. Finite results never exceed the
/// point's own radius.
pub fn normals_maxranges(points: &[Point3], voxel_diagonal: f64, fuzz: f64) -> Result<Vec<f64>> {
    let mut maxranges = vec![f64::INFINITY; points.len()];
    if points.is_empty() {
        return Ok(maxranges);
    }

    let index = DirectionIndex::new(points);
    let radii: Vec<f64> = points.iter().map(Point3::norm).collect();

    // ascending distance from the scanner, ties kept in index order
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| radii[a].total_cmp(&radii[b]));

    for j in order {
        if maxranges[j].is_finite() {
            continue;
        }
        let r = radii[j];
        if r < voxel_diagonal {
            return Err(Error::Invariant(format!(
                "point at radius {r} inside the voxel diagonal {voxel_diagonal} was not range-filtered"
            )));
        }
        let p = points[j];
        let p_hat = p / r;

        // half-angle under which the circumsphere of one voxel is seen at
        // this distance, worst case with the target on its far side
        let half_angle = 2.0 * (voxel_diagonal / (r - voxel_diagonal)).min(1.0).asin();
        let cone = index.search(&p_hat, half_angle);

        let neighbours: Vec<Point3> = cone.iter().map(|&k| points[k]).collect();
        let mut normal = plane_normal(&neighbours).unwrap_or(p_hat);
        if normal.dot(&p_hat) >= 0.0 {
            // the normal must face the scanner
            normal = -normal;
        }

        // stop plane one voxel diagonal (+ fuzz) in front of the surface
        let p_base = p + normal * (voxel_diagonal + fuzz);
        let dividend = p_base.dot(&normal);
        let divisor = p_hat.dot(&normal);
        if divisor == 0.0 {
            // grazing line of sight, shoot no ray at all
            maxranges[j] = 0.0;
            continue;
        }
        let d = dividend / divisor;
        if d > r {
            return Err(Error::Invariant(format!(
                "maxrange {d} exceeds point radius {r}"
            )));
        }
        maxranges[j] = d.max(0.0);

        // propagate the plane bound across the shadow of this point
        for &k in &cone {
            let pk_hat = points[k] / radii[k];
            let divisor_k = pk_hat.dot(&normal);
            if divisor_k == 0.0 {
                continue;
            }
            let dk = dividend / divisor_k;
            // the plane lies beyond this point: process it on its own later
            if dk > radii[k] {
                continue;
            }
            let dk = dk.max(0.0);
            if maxranges[k] > dk {
                maxranges[k] = dk;
            }
        }
    }

    Ok(maxranges)
}
