//! Tolerance-aware point algebra.
//!
//! Affine combination with vectors (`p + v`, `p - v`, `p - q`) is plain
//! nalgebra arithmetic; this module adds distance and tolerant equality.

use crate::tolerance::Tolerance;
use crate::{Point3, Scalar, Vec3};

/// Point operations routed through the process-wide tolerance.
pub trait PointExt {
    /// Euclidean distance to `other`.
    fn distance_to(&self, other: &Point3) -> Scalar;

    /// Squared distance to `other` (no square root).
    fn distance_sq_to(&self, other: &Point3) -> Scalar;

    /// Coincident within tolerance (squared distance vs eps²).
    fn approx_eq(&self, other: &Point3) -> bool;

    /// Midpoint between `self` and `other`.
    fn midpoint(&self, other: &Point3) -> Point3;

    /// Position vector from the origin.
    fn to_vector(&self) -> Vec3;
}

impl PointExt for Point3 {
    #[inline]
    fn distance_to(&self, other: &Point3) -> Scalar {
        self.distance_sq_to(other).sqrt()
    }

    #[inline]
    fn distance_sq_to(&self, other: &Point3) -> Scalar {
        (self - other).norm_squared()
    }

    fn approx_eq(&self, other: &Point3) -> bool {
        Tolerance::current().points_equal(self, other)
    }

    fn midpoint(&self, other: &Point3) -> Point3 {
        nalgebra::center(self, other)
    }

    fn to_vector(&self) -> Vec3 {
        self.coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance_sq_to(&b) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_approx_eq() {
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(a.approx_eq(&Point3::new(1.0 + 5e-7, 2.0, 3.0)));
        assert!(!a.approx_eq(&Point3::new(1.0 + 5e-6, 2.0, 3.0)));
    }

    #[test]
    fn test_affine_combination() {
        let p = Point3::new(1.0, 1.0, 1.0) + Vec3::new(1.0, -1.0, 2.0);
        assert!(p.approx_eq(&Point3::new(2.0, 0.0, 3.0)));
        let back = p - Vec3::new(1.0, -1.0, 2.0);
        assert!(back.approx_eq(&Point3::new(1.0, 1.0, 1.0)));
        assert!(p.midpoint(&back).approx_eq(&Point3::new(1.5, 0.5, 2.0)));
    }
}
