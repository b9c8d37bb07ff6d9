//! 3D point type shared by the scanner-local and global frames.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 3D point or vector in double precision.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Origin.
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Squared length (avoids the sqrt).
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Unit vector in the same direction. Zero vectors are returned unchanged.
    #[inline]
    pub fn normalized(&self) -> Point3 {
        let len = self.norm();
        if len > 0.0 {
            *self / len
        } else {
            *self
        }
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Point3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Div<f64> for Point3 {
    type Output = Self;

    #[inline]
    fn div(self, scalar: f64) -> Self {
        Point3::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl Neg for Point3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Point3::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm() {
        let p = Point3::new(3.0, 4.0, 12.0);
        assert_relative_eq!(p.norm(), 13.0);
        assert_relative_eq!(p.norm_squared(), 169.0);
    }

    #[test]
    fn test_normalized() {
        let p = Point3::new(0.0, 5.0, 0.0).normalized();
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(p.norm(), 1.0);
        assert_eq!(Point3::ZERO.normalized(), Point3::ZERO);
    }

    #[test]
    fn test_arithmetic() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Point3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Point3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Point3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Point3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(a.dot(&b), 32.0);
    }
}
