//! Scan poses: scanner position, orientation and the rigid transform that
//! maps scanner-local points into the global frame.

use serde::{Deserialize, Serialize};

use super::point::Point3;

/// A 4x4 homogeneous rigid transform, stored row-major.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform4 {
    m: [[f64; 4]; 4],
}

impl Transform4 {
    /// Identity transform.
    pub fn identity() -> Self {
        let mut m = [[0.0; 4]; 4];
        for (k, row) in m.iter_mut().enumerate() {
            row[k] = 1.0;
        }
        Self { m }
    }

    /// Build a rigid transform from a translation and Euler angles (radians).
    ///
    /// The rotation follows the convention of 6DOF scan registration pose
    /// files, so that registered trajectories transform identically here.
    pub fn from_position_euler(position: Point3, theta: [f64; 3]) -> Self {
        let (sx, cx) = theta[0].sin_cos();
        let (sy, cy) = theta[1].sin_cos();
        let (sz, cz) = theta[2].sin_cos();
        let m = [
            [cy * cz, -cy * sz, sy, position.x],
            [sx * sy * cz + cx * sz, -sx * sy * sz + cx * cz, -sx * cy, position.y],
            [-cx * sy * cz + sx * sz, cx * sy * sz + sx * cz, cx * cy, position.z],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self { m }
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn apply(&self, p: Point3) -> Point3 {
        Point3::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2] * p.z + self.m[0][3],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2] * p.z + self.m[1][3],
            self.m[2][0] * p.x + self.m[2][1] * p.y + self.m[2][2] * p.z + self.m[2][3],
        )
    }
}

/// Pose of a single scan along the trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Scanner origin in the global frame.
    pub position: Point3,
    /// Euler orientation angles in radians.
    pub orientation: [f64; 3],
    /// Rigid transform from scanner-local to global coordinates.
    pub transform: Transform4,
}

impl Pose {
    /// Build a pose from a position and Euler angles in radians.
    pub fn new(position: Point3, orientation: [f64; 3]) -> Self {
        Self {
            position,
            orientation,
            transform: Transform4::from_position_euler(position, orientation),
        }
    }

    /// Identity pose at the origin.
    pub fn identity() -> Self {
        Self::new(Point3::ZERO, [0.0; 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform4::identity().apply(p), p);
    }

    #[test]
    fn test_translation_only() {
        let pose = Pose::new(Point3::new(10.0, -5.0, 2.0), [0.0; 3]);
        let p = pose.transform.apply(Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p.x, 11.0);
        assert_relative_eq!(p.y, -4.0);
        assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let pose = Pose::new(Point3::ZERO, [0.3, -0.7, 1.1]);
        let p = Point3::new(2.0, -3.0, 5.0);
        assert_relative_eq!(pose.transform.apply(p).norm(), p.norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_orientation_is_translation() {
        let pose = Pose::new(Point3::new(1.0, 0.0, 0.0), [0.0; 3]);
        assert_eq!(
            pose.transform.apply(Point3::new(4.0, 0.0, 0.0)),
            Point3::new(5.0, 0.0, 0.0)
        );
    }
}
