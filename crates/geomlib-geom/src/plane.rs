//! Infinite planes.

use std::fmt;
use std::io::{Read, Write};

use geomlib_math::{
    epsilon, Matrix, Persist, Point2, Point3, Result, Scalar, Vec3, VectorExt, Xyz,
};

use crate::{transform_frame, Linear, Surface, SurfaceKind};

/// An infinite plane through `origin` with normal `normal`.
///
/// The normal need not be unit length. Parameterization:
/// `P(u, v) = origin + u * e1 + v * e2` where `(e1, e2)` is [`Plane::basis`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// A point on the plane.
    pub origin: Point3,
    /// Normal vector (nonzero).
    pub normal: Vec3,
}

impl Plane {
    /// Create a plane from a point and a normal.
    pub fn new(origin: Point3, normal: Vec3) -> Self {
        Self { origin, normal }
    }

    /// Plane through three points, or `None` if they are collinear.
    ///
    /// The normal follows the right-hand rule for `a -> b -> c`.
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        if n.is_zero_length() {
            return None;
        }
        Some(Self::new(*a, n.normalized_or_zero()))
    }

    /// XY plane at the origin.
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vec3::z())
    }

    /// Unit normal.
    pub fn unit_normal(&self) -> Vec3 {
        self.normal.normalized_or_zero()
    }

    /// Signed distance from `pt`, positive on the side the normal points to.
    pub fn signed_distance(&self, pt: &Point3) -> Scalar {
        (pt - self.origin).dot(&self.unit_normal())
    }

    /// Orthonormal in-plane basis `(e1, e2)` with `e1 × e2` along the normal.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let n = self.unit_normal();
        let e1 = n.any_orthogonal().normalized_or_zero();
        (e1, n.cross(&e1))
    }

    /// Point where `linear` crosses the plane, within the linear's range.
    ///
    /// A primitive parallel to the plane never intersects it, even when it
    /// lies inside it.
    pub fn find_intersection(&self, linear: &dyn Linear) -> Option<Point3> {
        let n = self.unit_normal();
        let d = linear.direction();
        if n.dot(&d.normalized_or_zero()).abs() <= epsilon() {
            return None;
        }
        let t = (self.origin - linear.origin()).dot(&n) / n.dot(&d);
        let p = linear.point_at(t);
        linear.belongs(&p).then_some(p)
    }

    /// Both planes describe the same oriented plane within tolerance.
    pub fn approx_eq(&self, other: &Plane) -> bool {
        self.unit_normal().approx_eq(&other.unit_normal()) && other.belongs(&self.origin)
    }

    /// Apply an affine transform.
    pub fn transformed(&self, m: &Matrix) -> Self {
        let (e1, _) = self.basis();
        let (origin, normal, _) = transform_frame(m, &self.origin, &self.normal, &e1);
        Self::new(origin, normal)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::xy()
    }
}

impl Surface for Plane {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Plane
    }

    fn belongs(&self, pt: &Point3) -> bool {
        self.signed_distance(pt).abs() <= epsilon()
    }

    fn projection_of(&self, pt: &Point3) -> Point3 {
        pt - self.unit_normal() * self.signed_distance(pt)
    }

    fn parameters(&self, pt: &Point3) -> Option<Point2> {
        if !self.belongs(pt) {
            return None;
        }
        let (e1, e2) = self.basis();
        let d = pt - self.origin;
        Some(Point2::new(d.dot(&e1), d.dot(&e2)))
    }

    fn point_at(&self, uv: Point2) -> Point3 {
        let (e1, e2) = self.basis();
        self.origin + e1 * uv.x + e2 * uv.y
    }

    fn normal_at(&self, pt: &Point3) -> Option<Vec3> {
        self.belongs(pt).then(|| self.unit_normal())
    }

    fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3> {
        self.find_intersection(linear).into_iter().collect()
    }

    fn transform(&self, m: &Matrix) -> Box<dyn Surface> {
        Box::new(self.transformed(m))
    }

    fn clone_box(&self) -> Box<dyn Surface> {
        Box::new(*self)
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plane with origin: {}    Normal: {}",
            Xyz(self.origin),
            Xyz(self.normal)
        )
    }
}

impl Persist for Plane {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.origin.save(w)?;
        self.normal.save(w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let origin = Point3::restore(r)?;
        let normal = Vec3::restore(r)?;
        Ok(Self::new(origin, normal))
    }
}
