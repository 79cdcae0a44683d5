//! Tolerance-aware vector algebra.

use nalgebra::{Rotation3, Unit};

use crate::consts::PI;
use crate::tolerance::{epsilon, epsilon_sq};
use crate::{Scalar, Vec3};

/// Vector operations routed through the process-wide tolerance.
///
/// `dot` and `cross` come straight from nalgebra; this trait adds the
/// operations whose behavior depends on the tolerance policy or on a
/// degenerate-input convention.
pub trait VectorExt {
    /// Euclidean length.
    fn length(&self) -> Scalar;

    /// Squared length (no square root).
    fn length_sq(&self) -> Scalar;

    /// Unit vector in the same direction, or the zero vector if `self` is zero.
    fn normalized_or_zero(&self) -> Vec3;

    /// Unsigned angle to `other` in `[0, π]`; `0` if either vector is zero.
    fn angle_to(&self, other: &Vec3) -> Scalar;

    /// Angle from `self` to `other` measured counter-clockwise around `axis`,
    /// in `[0, 2π)`.
    fn full_angle(&self, other: &Vec3, axis: &Vec3) -> Scalar;

    /// Rotate by `angle` radians around `axis` (right-hand rule).
    ///
    /// A zero axis leaves the vector unchanged.
    fn rotated_about(&self, axis: &Vec3, angle: Scalar) -> Vec3;

    /// A deterministic vector orthogonal to `self`, with the same length.
    fn any_orthogonal(&self) -> Vec3;

    /// The opposite vector.
    fn opposite(&self) -> Vec3;

    /// Equal within tolerance (squared difference length vs eps²).
    fn approx_eq(&self, other: &Vec3) -> bool;

    /// Parallel or anti-parallel within tolerance.
    fn is_parallel_to(&self, other: &Vec3) -> bool;

    /// Orthogonal within tolerance.
    fn is_orthogonal_to(&self, other: &Vec3) -> bool;

    /// Equal to the negation of `other` within tolerance.
    fn is_opposite_to(&self, other: &Vec3) -> bool;

    /// Length within tolerance of zero.
    fn is_zero_length(&self) -> bool;
}

impl VectorExt for Vec3 {
    #[inline]
    fn length(&self) -> Scalar {
        self.norm()
    }

    #[inline]
    fn length_sq(&self) -> Scalar {
        self.norm_squared()
    }

    fn normalized_or_zero(&self) -> Vec3 {
        let len = self.norm();
        if len == 0.0 {
            *self
        } else {
            self / len
        }
    }

    fn angle_to(&self, other: &Vec3) -> Scalar {
        if self.norm() * other.norm() == 0.0 {
            return 0.0;
        }
        // atan2 stays accurate near 0 and π where acos of the cosine does not.
        self.cross(other).norm().atan2(self.dot(other))
    }

    fn full_angle(&self, other: &Vec3, axis: &Vec3) -> Scalar {
        let angle = self.angle_to(other);
        // Below tolerance the sign of the cross product is noise.
        if angle <= epsilon() || self.cross(other).dot(axis) >= 0.0 {
            angle
        } else {
            2.0 * PI - angle
        }
    }

    fn rotated_about(&self, axis: &Vec3, angle: Scalar) -> Vec3 {
        match Unit::try_new(*axis, 0.0) {
            Some(axis) => Rotation3::from_axis_angle(&axis, angle) * *self,
            None => *self,
        }
    }

    fn any_orthogonal(&self) -> Vec3 {
        let (ax, ay, az) = (self.x.abs(), self.y.abs(), self.z.abs());
        if ax >= ay && ax >= az {
            Vec3::new(-self.y, self.x, 0.0).normalized_or_zero() * self.norm()
        } else if ay >= az {
            Vec3::new(0.0, -self.z, self.y).normalized_or_zero() * self.norm()
        } else {
            Vec3::new(self.z, 0.0, -self.x).normalized_or_zero() * self.norm()
        }
    }

    #[inline]
    fn opposite(&self) -> Vec3 {
        -self
    }

    fn approx_eq(&self, other: &Vec3) -> bool {
        (self - other).norm_squared() <= epsilon_sq()
    }

    fn is_parallel_to(&self, other: &Vec3) -> bool {
        self.normalized_or_zero()
            .cross(&other.normalized_or_zero())
            .norm_squared()
            <= epsilon_sq()
    }

    fn is_orthogonal_to(&self, other: &Vec3) -> bool {
        let d = self.normalized_or_zero().dot(&other.normalized_or_zero());
        d * d <= epsilon_sq()
    }

    fn is_opposite_to(&self, other: &Vec3) -> bool {
        self.approx_eq(&-other)
    }

    fn is_zero_length(&self) -> bool {
        self.norm() <= epsilon()
    }
}
