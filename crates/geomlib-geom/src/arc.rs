//! Circular arcs.

use std::fmt;
use std::io::{Read, Write};

use geomlib_math::{
    epsilon, GeomError, Matrix, Persist, Point3, PointExt, Result, Scalar, Vec3, VectorExt, Xyz,
};

use crate::{Circle, Curve, CurveKind, Linear};

/// A circular arc walked counter-clockwise around the circle's axis from
/// `start` to `end`.
///
/// Parameterization: `P(t) = center + rot(start - center, axis, t)` for
/// `t ∈ [0, sweep]`. Coincident start and end are not detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    circle: Circle,
    start: Point3,
    end: Point3,
}

impl Arc {
    /// Create an arc without checking that the end points lie on the circle.
    pub fn new(circle: Circle, start: Point3, end: Point3) -> Self {
        Self { circle, start, end }
    }

    /// Create an arc, or `None` if `start` or `end` is off the circle.
    pub fn try_new(circle: Circle, start: Point3, end: Point3) -> Option<Self> {
        (circle.belongs(&start) && circle.belongs(&end)).then_some(Self { circle, start, end })
    }

    /// The full circle the arc lies on.
    pub fn as_circle(&self) -> Circle {
        self.circle
    }

    /// Center of the supporting circle.
    pub fn center(&self) -> Point3 {
        self.circle.center
    }

    /// Axis of the supporting circle.
    pub fn axis(&self) -> Vec3 {
        self.circle.axis
    }

    /// Radius of the supporting circle.
    pub fn radius(&self) -> Scalar {
        self.circle.radius
    }

    /// First end point.
    pub fn start(&self) -> Point3 {
        self.start
    }

    /// Last end point.
    pub fn end(&self) -> Point3 {
        self.end
    }

    /// Replace the first end point.
    pub fn set_start(&mut self, start: Point3) {
        self.start = start;
    }

    /// Replace the last end point.
    pub fn set_end(&mut self, end: Point3) {
        self.end = end;
    }

    /// Angle from start to end, in `[0, 2π)`.
    pub fn sweep(&self) -> Scalar {
        let c = self.circle.center;
        (self.start - c).full_angle(&(self.end - c), &self.circle.axis)
    }

    /// Arc length.
    pub fn length(&self) -> Scalar {
        self.sweep() * self.circle.radius
    }

    /// Angle of `pt` from start around the axis. Points within tolerance of
    /// the start report 0 rather than an angle close to 2π.
    fn angle_of(&self, pt: &Point3) -> Scalar {
        if pt.approx_eq(&self.start) {
            return 0.0;
        }
        let c = self.circle.center;
        (self.start - c).full_angle(&(pt - c), &self.circle.axis)
    }

    /// Same circle and end points within tolerance.
    pub fn approx_eq(&self, other: &Arc) -> bool {
        self.circle.approx_eq(&other.circle)
            && self.start.approx_eq(&other.start)
            && self.end.approx_eq(&other.end)
    }

    /// Apply an affine transform.
    pub fn transformed(&self, m: &Matrix) -> Self {
        Self::new(
            self.circle.transformed(m),
            m.apply_point(&self.start),
            m.apply_point(&self.end),
        )
    }
}

impl Curve for Arc {
    fn kind(&self) -> CurveKind {
        CurveKind::Arc
    }

    fn belongs(&self, pt: &Point3) -> bool {
        self.circle.belongs(pt) && self.angle_of(pt) <= self.sweep() + epsilon()
    }

    fn parameter_of(&self, pt: &Point3) -> Option<Scalar> {
        self.belongs(pt).then(|| self.angle_of(pt))
    }

    fn point_at(&self, t: Scalar) -> Point3 {
        let c = self.circle.center;
        c + (self.start - c).rotated_about(&self.circle.axis, t)
    }

    fn tangent_at(&self, pt: &Point3) -> Option<Vec3> {
        if !self.belongs(pt) {
            return None;
        }
        Some(
            self.circle
                .axis
                .cross(&(pt - self.circle.center))
                .normalized_or_zero(),
        )
    }

    fn domain(&self) -> (Scalar, Scalar) {
        (0.0, self.sweep())
    }

    fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3> {
        self.circle
            .find_intersections(linear)
            .into_iter()
            .filter(|p| self.belongs(p))
            .collect()
    }

    fn clone_box(&self) -> Box<dyn Curve> {
        Box::new(*self)
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Arc with center: {}    Axis: {}    Radius: {}    Start point: {}    End point: {}",
            Xyz(self.circle.center),
            Xyz(self.circle.axis),
            self.circle.radius,
            Xyz(self.start),
            Xyz(self.end)
        )
    }
}

impl Persist for Arc {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.circle.save(w)?;
        self.start.save(w)?;
        self.end.save(w)
    }

    /// Fails with [`GeomError::CorruptData`] if an end point is off the circle.
    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let circle = Circle::restore(r)?;
        let start = Point3::restore(r)?;
        let end = Point3::restore(r)?;
        Self::try_new(circle, start, end)
            .ok_or_else(|| GeomError::CorruptData("arc end point off its circle".into()))
    }
}
