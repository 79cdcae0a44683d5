#![warn(missing_docs)]

//! Analytic primitives for the geomlib toolkit.
//!
//! Linear primitives (lines, rays, segments) share one parametric
//! representation `origin + t * direction` and differ only in the valid range
//! of `t`; see [`Linear`] and [`ParamRange`]. Surfaces (planes, cylinders)
//! and curves (circles, arcs) answer membership, projection,
//! parametrization and intersection queries against any linear primitive.
//!
//! Every comparison goes through the process-wide tolerance in
//! [`geomlib_math::tolerance`].

pub mod arc;
pub mod circle;
pub mod cylinder;
pub mod linear;
pub mod plane;

pub use arc::Arc;
pub use circle::Circle;
pub use cylinder::Cylinder;
pub use linear::{Line, Linear, ParamRange, Ray, Segment};
pub use plane::Plane;

use geomlib_math::{Matrix, Point2, Point3, Scalar, Vec3, VectorExt};

// =============================================================================
// Surface types
// =============================================================================

/// The kind of a surface (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Infinite plane.
    Plane,
    /// Cylindrical surface (infinite extent along axis).
    Cylinder,
}

/// An analytic surface in 3D space.
///
/// Queries that only make sense for points on the surface (`parameters`,
/// `normal_at`) return `None` for points that do not belong to it.
pub trait Surface: Send + Sync + std::fmt::Debug {
    /// The kind of this surface.
    fn kind(&self) -> SurfaceKind;

    /// Whether `pt` lies on the surface within tolerance.
    fn belongs(&self, pt: &Point3) -> bool;

    /// Nearest point of the surface to `pt`.
    fn projection_of(&self, pt: &Point3) -> Point3;

    /// Surface coordinates of a point on the surface.
    fn parameters(&self, pt: &Point3) -> Option<Point2>;

    /// Inverse of [`Surface::parameters`].
    fn point_at(&self, uv: Point2) -> Point3;

    /// Unit normal at a point on the surface.
    fn normal_at(&self, pt: &Point3) -> Option<Vec3>;

    /// Every point where `linear` meets the surface, within the linear's
    /// parameter range.
    fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3>;

    /// Apply an affine transform, returning a new surface.
    fn transform(&self, m: &Matrix) -> Box<dyn Surface>;

    /// Clone this surface into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Surface>;
}

impl Clone for Box<dyn Surface> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// =============================================================================
// Curve types
// =============================================================================

/// The kind of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Full circle.
    Circle,
    /// Circular arc.
    Arc,
}

/// A bounded planar curve in 3D space, parametrized by angle.
pub trait Curve: Send + Sync + std::fmt::Debug {
    /// The kind of this curve.
    fn kind(&self) -> CurveKind;

    /// Whether `pt` lies on the curve within tolerance.
    fn belongs(&self, pt: &Point3) -> bool;

    /// Parameter of a point on the curve.
    fn parameter_of(&self, pt: &Point3) -> Option<Scalar>;

    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: Scalar) -> Point3;

    /// Unit tangent at a point on the curve (counter-clockwise around the axis).
    fn tangent_at(&self, pt: &Point3) -> Option<Vec3>;

    /// Parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (Scalar, Scalar);

    /// Every point where `linear` meets the curve.
    fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3>;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Curve>;
}

impl Clone for Box<dyn Curve> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Transform a plane frame given by a point, a normal and an in-plane unit
/// reference direction.
///
/// Returns the new point, the new normal (rescaled to the original normal's
/// length) and the transformed reference direction before normalization.
/// Building the normal from the two transformed in-plane directions keeps it
/// perpendicular under non-uniform scaling.
pub(crate) fn transform_frame(
    m: &Matrix,
    point: &Point3,
    normal: &Vec3,
    reference: &Vec3,
) -> (Point3, Vec3, Vec3) {
    let u = m.apply_vector(reference);
    let v = m.apply_vector(&normal.normalized_or_zero().cross(reference));
    let n = u.cross(&v).normalized_or_zero() * normal.length();
    (m.apply_point(point), n, u)
}
