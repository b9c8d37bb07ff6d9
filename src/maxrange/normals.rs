//! Local surface normal estimation from a point neighbourhood.

use nalgebra::Matrix3;

use crate::core::Point3;

/// Fit a plane normal to a neighbourhood as the eigenvector of the smallest
/// covariance eigenvalue. Returns `None` when fewer than three points are
/// given; the caller falls back to the line of sight.
pub fn plane_normal(points: &[Point3]) -> Option<Point3> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len() as f64;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut cz = 0.0;
    for p in points {
        cx += p.x;
        cy += p.y;
        cz += p.z;
    }
    cx /= n;
    cy /= n;
    cz /= n;

    let mut xx = 0.0;
    let mut xy = 0.0;
    let mut xz = 0.0;
    let mut yy = 0.0;
    let mut yz = 0.0;
    let mut zz = 0.0;
    for p in points {
        let dx = p.x - cx;
        let dy = p.y - cy;
        let dz = p.z - cz;
        xx += dx * dx;
        xy += dx * dy;
        xz += dx * dz;
        yy += dy * dy;
        yz += dy * dz;
        zz += dz * dz;
    }

    let cov = Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz) / n;
    let eigen = cov.symmetric_eigen();
    let smallest = eigen.eigenvalues.argmin().0;
    let v = eigen.eigenvectors.column(smallest);
    Some(Point3::new(v[0], v[1], v[2]).normalized())
}
