//! Infinite circular cylinders.

use std::fmt;
use std::io::{Read, Write};

use geomlib_math::{
    epsilon, GeomError, Matrix, Persist, Point2, Point3, Result, Scalar, Vec3, VectorExt, Xyz,
};

use crate::{Line, Linear, Surface, SurfaceKind};

/// A cylindrical surface of infinite extent along its axis.
///
/// Parameterization: `P(h, θ) = origin + h * axis + radius * rot(zero_dir, axis, θ)`,
/// where `h` is the signed offset along the axis and `θ ∈ [0, 2π)` is
/// measured counter-clockwise around the axis from the zero direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    origin: Point3,
    axis: Vec3,
    radius: Scalar,
    zero_dir: Vec3,
}

/// Closest approach of a linear primitive's supporting line to the axis.
struct Approach {
    /// Parameter of the closest point on the linear.
    t: Scalar,
    /// Distance from that point to the axis.
    distance: Scalar,
    /// Squared length of the direction component perpendicular to the axis.
    speed_sq: Scalar,
}

impl Cylinder {
    /// Create a cylinder. The axis is normalized; the zero-angle direction
    /// defaults to `axis.any_orthogonal()`.
    pub fn new(origin: Point3, axis: Vec3, radius: Scalar) -> Self {
        let axis = axis.normalized_or_zero();
        Self {
            origin,
            axis,
            radius,
            zero_dir: axis.any_orthogonal().normalized_or_zero(),
        }
    }

    /// Use `dir` as the zero-angle direction of the parametrization.
    ///
    /// Returns `None` if `dir` is zero or not orthogonal to the axis.
    pub fn with_zero_direction(mut self, dir: &Vec3) -> Option<Self> {
        if dir.is_zero_length() || !dir.is_orthogonal_to(&self.axis) {
            return None;
        }
        self.zero_dir = dir.normalized_or_zero();
        Some(self)
    }

    /// A point on the axis.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Unit axis direction.
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Radius.
    pub fn radius(&self) -> Scalar {
        self.radius
    }

    /// Unit zero-angle direction.
    pub fn zero_direction(&self) -> Vec3 {
        self.zero_dir
    }

    /// Move the cylinder so its axis passes through `origin`.
    pub fn set_origin(&mut self, origin: Point3) {
        self.origin = origin;
    }

    /// Replace the axis (normalized). Resets the zero-angle direction.
    pub fn set_axis(&mut self, axis: &Vec3) {
        *self = Self::new(self.origin, *axis, self.radius);
    }

    /// Replace the radius.
    pub fn set_radius(&mut self, radius: Scalar) {
        self.radius = radius;
    }

    /// The axis as an infinite line.
    pub fn axis_line(&self) -> Line {
        Line::new(self.origin, self.axis)
    }

    fn approach(&self, linear: &dyn Linear) -> Option<Approach> {
        if linear.direction().is_parallel_to(&self.axis) {
            return None;
        }
        let d = linear.direction();
        let w = linear.origin() - self.origin;
        let d_perp = d - self.axis * self.axis.dot(&d);
        let w_perp = w - self.axis * self.axis.dot(&w);
        let speed_sq = d_perp.length_sq();
        let t = -w_perp.dot(&d_perp) / speed_sq;
        let distance = (w_perp + d_perp * t).length();
        Some(Approach {
            t,
            distance,
            speed_sq,
        })
    }

    /// Whether the supporting line of `linear` touches the cylinder at
    /// exactly one point.
    pub fn is_tangent(&self, linear: &dyn Linear) -> bool {
        self.approach(linear)
            .is_some_and(|a| (a.distance - self.radius).abs() <= epsilon())
    }

    /// Points where `linear` meets the cylinder, within the linear's range.
    ///
    /// Returns nothing for primitives parallel to the axis (including those
    /// lying on the surface), one point for a tangent, otherwise up to two
    /// points ordered by parameter.
    pub fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3> {
        let Some(a) = self.approach(linear) else {
            return Vec::new();
        };
        let candidates: Vec<Scalar> = if (a.distance - self.radius).abs() <= epsilon() {
            vec![a.t]
        } else if a.distance > self.radius {
            Vec::new()
        } else {
            let h = ((self.radius * self.radius - a.distance * a.distance) / a.speed_sq).sqrt();
            vec![a.t - h, a.t + h]
        };
        candidates
            .into_iter()
            .map(|t| linear.point_at(t))
            .filter(|p| linear.belongs(p))
            .collect()
    }

    fn foot(&self, pt: &Point3) -> Point3 {
        self.axis_line().nearest_point_on_line(pt)
    }

    /// Same axis line, radius, and zero direction within tolerance.
    pub fn approx_eq(&self, other: &Cylinder) -> bool {
        self.axis_line().belongs(&other.origin)
            && self.axis.is_parallel_to(&other.axis)
            && (self.radius - other.radius).abs() <= epsilon()
            && self.zero_dir.approx_eq(&other.zero_dir)
    }

    /// Apply an affine transform.
    ///
    /// The radius scales with the transformed zero direction; non-uniform
    /// scaling across the axis does not produce an elliptic cylinder.
    pub fn transformed(&self, m: &Matrix) -> Self {
        let axis = m.apply_vector(&self.axis).normalized_or_zero();
        let zero = m.apply_vector(&self.zero_dir);
        let scale = zero.length();
        let zero = (zero - axis * axis.dot(&zero)).normalized_or_zero();
        Self {
            origin: m.apply_point(&self.origin),
            axis,
            radius: self.radius * scale,
            zero_dir: zero,
        }
    }
}

impl Surface for Cylinder {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Cylinder
    }

    fn belongs(&self, pt: &Point3) -> bool {
        (self.axis_line().distance_to_line(pt) - self.radius).abs() <= epsilon()
    }

    /// Points on the axis are returned unchanged.
    fn projection_of(&self, pt: &Point3) -> Point3 {
        let axis = self.axis_line();
        if axis.belongs(pt) {
            return *pt;
        }
        let foot = axis.nearest_point_on_line(pt);
        foot + (pt - foot).normalized_or_zero() * self.radius
    }

    fn parameters(&self, pt: &Point3) -> Option<Point2> {
        if !self.belongs(pt) {
            return None;
        }
        let height = (pt - self.origin).dot(&self.axis);
        let foot = self.origin + self.axis * height;
        let angle = self.zero_dir.full_angle(&(pt - foot), &self.axis);
        Some(Point2::new(height, angle))
    }

    fn point_at(&self, uv: Point2) -> Point3 {
        self.origin
            + self.axis * uv.x
            + self.zero_dir.rotated_about(&self.axis, uv.y) * self.radius
    }

    fn normal_at(&self, pt: &Point3) -> Option<Vec3> {
        if !self.belongs(pt) {
            return None;
        }
        Some((pt - self.foot(pt)).normalized_or_zero())
    }

    fn find_intersections(&self, linear: &dyn Linear) -> Vec<Point3> {
        Cylinder::find_intersections(self, linear)
    }

    fn transform(&self, m: &Matrix) -> Box<dyn Surface> {
        Box::new(self.transformed(m))
    }

    fn clone_box(&self) -> Box<dyn Surface> {
        Box::new(*self)
    }
}

impl fmt::Display for Cylinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cylinder with center: {}    Axis: {}    Radius: {}",
            Xyz(self.origin),
            Xyz(self.axis),
            self.radius
        )
    }
}

impl Persist for Cylinder {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.origin.save(w)?;
        self.axis.save(w)?;
        self.radius.save(w)?;
        self.zero_dir.save(w)
    }

    /// Fails with [`GeomError::CorruptData`] unless the axis and zero
    /// direction are orthogonal unit vectors.
    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let origin = Point3::restore(r)?;
        let axis = Vec3::restore(r)?;
        let radius = Scalar::restore(r)?;
        let zero_dir = Vec3::restore(r)?;
        // Stored as unit vectors; read back without renormalizing.
        let is_unit = |d: &Vec3| (d.length() - 1.0).abs() <= epsilon();
        if !is_unit(&axis) || !is_unit(&zero_dir) {
            return Err(GeomError::CorruptData("cylinder direction is not unit length".into()));
        }
        if !zero_dir.is_orthogonal_to(&axis) {
            return Err(GeomError::CorruptData(
                "cylinder zero direction not orthogonal to axis".into(),
            ));
        }
        Ok(Self {
            origin,
            axis,
            radius,
            zero_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ray, Segment};
    use geomlib_math::consts::{FRAC_PI_2, PI};
    use geomlib_math::PointExt;

    fn z_cylinder() -> Cylinder {
        Cylinder::new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0), 2.0)
    }

    #[test]
    fn test_parameters_on_surface() {
        let cyl = z_cylinder();
        let uv = cyl.parameters(&Point3::new(2.0, 0.0, 4.0)).unwrap();
        assert!((uv.x - 4.0).abs() < 1e-12);
        assert!(uv.y.abs() < 1e-12);

        let uv = cyl.parameters(&Point3::new(0.0, 2.0, -1.0)).unwrap();
        assert!((uv.x + 1.0).abs() < 1e-12);
        assert!((uv.y - FRAC_PI_2).abs() < 1e-9);

        assert!(cyl.parameters(&Point3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_point_at_round_trip() {
        let cyl = Cylinder::new(Point3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 2.0, 2.0), 0.5);
        for (h, a) in [(0.0, 0.5), (2.0, 1.0), (-3.0, 4.0), (1.5, PI - 0.25)] {
            let pt = cyl.point_at(Point2::new(h, a));
            assert!(cyl.belongs(&pt));
            let uv = cyl.parameters(&pt).unwrap();
            assert!((uv.x - h).abs() < 1e-9, "h {h} -> {}", uv.x);
            assert!((uv.y - a).abs() < 1e-9, "a {a} -> {}", uv.y);
        }
    }

    #[test]
    fn test_line_parallel_to_axis_has_no_intersections() {
        let cyl = z_cylinder();
        let on_surface = Line::new(Point3::new(2.0, 0.0, 4.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(cyl.find_intersections(&on_surface).is_empty());
        assert!(!cyl.is_tangent(&on_surface));
        assert!(cyl.belongs(&on_surface.origin));
    }

    #[test]
    fn test_secant_and_tangent() {
        let cyl = z_cylinder();
        let secant = Line::new(Point3::new(-5.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let hits = cyl.find_intersections(&secant);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].approx_eq(&Point3::new(-2.0, 0.0, 1.0)));
        assert!(hits[1].approx_eq(&Point3::new(2.0, 0.0, 1.0)));

        let tangent = Line::new(Point3::new(-5.0, 2.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        assert!(cyl.is_tangent(&tangent));
        let hits = cyl.find_intersections(&tangent);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].approx_eq(&Point3::new(0.0, 2.0, 0.0)));

        let miss = Line::new(Point3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(cyl.find_intersections(&miss).is_empty());
    }

    #[test]
    fn test_oblique_secant() {
        let cyl = z_cylinder();
        let line = Line::new(Point3::new(-4.0, 0.0, -4.0), Vec3::new(1.0, 0.0, 1.0));
        let hits = cyl.find_intersections(&line);
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert!(cyl.belongs(h));
            assert!(line.belongs(h));
        }
    }

    #[test]
    fn test_range_filters_hits() {
        let cyl = z_cylinder();
        // Starts inside: only the forward wall.
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.0, 0.0));
        let hits = cyl.find_intersections(&ray);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].approx_eq(&Point3::new(2.0, 0.0, 0.0)));

        let seg = Segment::from_points(Point3::new(3.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0));
        assert!(cyl.find_intersections(&seg).is_empty());
    }

    #[test]
    fn test_projection_and_normal() {
        let cyl = z_cylinder();
        let proj = cyl.projection_of(&Point3::new(5.0, 0.0, 3.0));
        assert!(proj.approx_eq(&Point3::new(2.0, 0.0, 3.0)));
        let on_axis = Point3::new(0.0, 0.0, 7.0);
        assert_eq!(cyl.projection_of(&on_axis), on_axis);

        let n = cyl.normal_at(&Point3::new(0.0, -2.0, 1.0)).unwrap();
        assert!(n.approx_eq(&Vec3::new(0.0, -1.0, 0.0)));
        assert!(cyl.normal_at(&Point3::new(0.0, -3.0, 1.0)).is_none());
    }

    #[test]
    fn test_zero_direction() {
        let cyl = z_cylinder();
        assert!(cyl.zero_direction().approx_eq(&Vec3::x()));
        assert!(cyl.with_zero_direction(&Vec3::new(1.0, 0.0, 1.0)).is_none());
        assert!(cyl.with_zero_direction(&Vec3::zeros()).is_none());

        let turned = cyl.with_zero_direction(&Vec3::new(0.0, 5.0, 0.0)).unwrap();
        let uv = turned.parameters(&Point3::new(0.0, 2.0, 0.0)).unwrap();
        assert!(uv.y.abs() < 1e-12);
    }

    #[test]
    fn test_transformed() {
        let cyl = z_cylinder();
        let m = Matrix::rotation_x(FRAC_PI_2)
            * Matrix::scaling(&Vec3::new(3.0, 3.0, 3.0))
            * Matrix::translation(&Vec3::new(1.0, 0.0, 0.0));
        let moved = cyl.transformed(&m);
        assert!((moved.radius() - 6.0).abs() < 1e-9);
        assert!(moved.axis().is_parallel_to(&Vec3::y()));
        assert!(moved.belongs(&m.apply_point(&Point3::new(2.0, 0.0, 4.0))));
    }

    #[test]
    fn test_persist_and_display() {
        let cyl = Cylinder::new(Point3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 1.0, 1.0), 4.0);
        assert_eq!(Cylinder::from_bytes(&cyl.to_bytes().unwrap()).unwrap(), cyl);
        let tilted = Cylinder::new(Point3::origin(), Vec3::new(0.3, -0.7, 0.2), 1.5)
            .with_zero_direction(&Vec3::new(0.7, 0.3, 0.0))
            .unwrap();
        assert_eq!(Cylinder::from_bytes(&tilted.to_bytes().unwrap()).unwrap(), tilted);
        assert!(cyl.to_string().contains("Radius: 4"));
    }

    #[test]
    fn test_restore_rejects_bad_frame() {
        let mut bytes = Vec::new();
        Point3::origin().save(&mut bytes).unwrap();
        Vec3::new(0.0, 0.0, 2.0).save(&mut bytes).unwrap();
        (1.0 as Scalar).save(&mut bytes).unwrap();
        Vec3::x().save(&mut bytes).unwrap();
        assert!(matches!(Cylinder::from_bytes(&bytes), Err(GeomError::CorruptData(_))));

        let mut bytes = Vec::new();
        Point3::origin().save(&mut bytes).unwrap();
        Vec3::z().save(&mut bytes).unwrap();
        (1.0 as Scalar).save(&mut bytes).unwrap();
        Vec3::new(0.6, 0.0, 0.8).save(&mut bytes).unwrap();
        assert!(matches!(Cylinder::from_bytes(&bytes), Err(GeomError::CorruptData(_))));
    }
}
