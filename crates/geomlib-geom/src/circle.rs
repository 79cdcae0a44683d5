//! Full circles in 3D space.

use std::fmt;
use std::io::{Read, Write};

use geomlib_math::consts::PI;
use geomlib_math::{
    epsilon, Matrix, Persist, Point3, PointExt, Result, Scalar, Vec3, VectorExt, Xyz,
};

use crate::{transform_frame, Curve, CurveKind, Cylinder, Linear, Plane, Surface};

/// A circle defined by center, axis (normal of its plane), and radius.
///
/// Parameterization: `P(t) = center + radius * rot(axis.any_orthogonal(), axis, t)`
/// for `t ∈ [0, 2π)`, counter-clockwise around the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center of the circle.
    pub center: Point3,
    /// Normal to the circle plane (nonzero, not necessarily unit).
    pub axis: Vec3,
    /// Radius.
    pub radius: Scalar,
}

impl Circle {
    /// Create a circle.
    pub fn new(center: Point3, axis: Vec3, radius: Scalar) -> Self {
        Self {
            center,
            axis,
            radius,
        }
    }

    /// The plane containing the circle.
    pub fn supporting_plane(&self) -> Plane {
        Plane::new(self.center, self.axis)
    }

    /// The cylinder sharing the circle's axis and radius.
    pub fn coaxial_cylinder(&self) -> Cylinder {
        Cylinder::new(self.center, self.axis, self.radius)
    }

    /// Unit direction of the point at parameter 0.
    pub fn zero_direction(&self) -> Vec3 {
        self.axis.any_orthogonal().normalized_or_zero()
    }

    /// Whether `pt` lies in the closed disk bounded by the circle.
    pub fn is_inside(&self, pt: &Point3) -> bool {
        self.supporting_plane().belongs(pt)
            && pt.distance_to(&self.center) <= self.radius + epsilon()
    }

    /// Circumference.
    pub fn length(&self) -> Scalar {
        2.0 * PI * self.radius
    }

    /// Same circle within tolerance (axis orientation matters).
    pub fn approx_eq(&self, other: &Circle) -> bool {
        self.center.approx_eq(&other.center)
            && self
                .axis
                .normalized_or_zero()
                .approx_eq(&other.axis.normalized_or_zero())
            && (self.radius - other.radius).abs() <= epsilon()
    }

    /// Apply an affine transform. The radius scales with the in-plane
    /// reference direction.
    pub fn transformed(&self, m: &Matrix) -> Self {
        let (center, axis, reference) =
            transform_frame(m, &self.center, &self.axis, &self.zero_direction());
        Self::new(center, axis, self.radius * reference.length())
    }
}

impl Curve for Circle {
    fn kind(&self) -> CurveKind {
        CurveKind::Circle
    }

    fn belongs(&self, pt: &Point3) -> bool {
        self.supporting_plane().belongs(pt)
            && (pt.distance_to(&self.center) - self.radius).abs() <= epsilon()
    }

    fn parameter_of(&self, pt: &Point3) -> Option<Scalar> {
        if !self.belongs(pt) {
            return None;
        }
        Some(
            self.zero_direction()
                .full_angle(&(pt - self.center), &self.axis),
        )
    }

    fn point_at(&self, t: Scalar) -> Point3 {
        self.center + self.zero_direction().rotated_about(&self.axis, t) * self.radius
    }

    fn tangent_at(&self, pt: &Point3) -> Option<Vec3> {
        if !self.belongs(pt) {
            return None;
        }
        Some(self.axis.cross(&(pt - self.center)).normalized_or_zero())
    }

    fn domain(&self) -> (Scalar, Scalar) {
        (0.0, 2.0 * PI)
    }

    /// A linear primitive lying in the circle's plane is intersected through
    /// the coaxial cylinder; one crossing the plane through the plane.
    fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3> {
        let plane = self.supporting_plane();
        if linear.direction().is_orthogonal_to(&self.axis) {
            if !plane.belongs(&linear.origin()) {
                return Vec::new();
            }
            return self
                .coaxial_cylinder()
                .find_intersections(linear)
                .into_iter()
                .filter(|p| self.belongs(p))
                .collect();
        }
        plane
            .find_intersection(linear)
            .filter(|p| self.belongs(p))
            .into_iter()
            .collect()
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(*self)
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circle with center: {}    Axis: {}    Radius: {}",
            Xyz(self.center),
            Xyz(self.axis),
            self.radius
        )
    }
}

impl Persist for Circle {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.center.save(w)?;
        self.axis.save(w)?;
        self.radius.save(w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let center = Point3::restore(r)?;
        let axis = Vec3::restore(r)?;
        let radius = Scalar::restore(r)?;
        Ok(Self::new(center, axis, radius))
    }
}
