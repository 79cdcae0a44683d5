//! Lines, rays and segments.
//!
//! All three are `origin + t * direction`; they differ only in the valid
//! range of `t`. The shared algorithms live as provided methods on
//! [`Linear`], so one intersection routine serves every combination and each
//! side re-validates the candidate point against its own range.

use std::fmt;
use std::io::{Read, Write};

use geomlib_math::{
    epsilon, epsilon_sq, Matrix, Persist, Point3, PointExt, Result, Scalar, Vec3, VectorExt, Xyz,
};

/// Valid range of the parameter `t` of a linear primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRange {
    /// All reals (line).
    Unbounded,
    /// `t >= 0` (ray).
    NonNegative,
    /// `0 <= t <= 1` (segment).
    Unit,
}

impl ParamRange {
    /// Clamp `t` into the range.
    pub fn clamp(self, t: Scalar) -> Scalar {
        match self {
            Self::Unbounded => t,
            Self::NonNegative => t.max(0.0),
            Self::Unit => t.clamp(0.0, 1.0),
        }
    }

    /// Whether `t` lies inside the range (no tolerance).
    pub fn contains(self, t: Scalar) -> bool {
        self.clamp(t) == t
    }
}

/// A parametric linear primitive `origin + t * direction`.
///
/// Implementors supply the three accessors; every query is provided.
/// The direction need not be unit length but must not be zero.
pub trait Linear {
    /// Point at `t = 0`.
    fn origin(&self) -> Point3;

    /// Direction vector (point at `t = 1` minus origin).
    fn direction(&self) -> Vec3;

    /// Valid parameter range.
    fn range(&self) -> ParamRange;

    /// Parameter of the orthogonal projection of `pt` onto the infinite line.
    fn parameter_of(&self, pt: &Point3) -> Scalar {
        let d = self.direction();
        (*pt - self.origin()).dot(&d) / d.length_sq()
    }

    /// Point at parameter `t` (range not enforced).
    fn point_at(&self, t: Scalar) -> Point3 {
        self.origin() + self.direction() * t
    }

    /// Projection of `pt` onto the infinite supporting line.
    fn nearest_point_on_line(&self, pt: &Point3) -> Point3 {
        self.point_at(self.parameter_of(pt))
    }

    /// Nearest point of the primitive itself (parameter clamped to the range).
    fn nearest_point(&self, pt: &Point3) -> Point3 {
        self.point_at(self.range().clamp(self.parameter_of(pt)))
    }

    /// Distance from `pt` to the infinite supporting line.
    fn distance_to_line(&self, pt: &Point3) -> Scalar {
        self.distance_sq_to_line(pt).sqrt()
    }

    /// Squared distance from `pt` to the infinite supporting line.
    fn distance_sq_to_line(&self, pt: &Point3) -> Scalar {
        pt.distance_sq_to(&self.nearest_point_on_line(pt))
    }

    /// Distance from `pt` to the primitive.
    fn distance(&self, pt: &Point3) -> Scalar {
        self.distance_sq(pt).sqrt()
    }

    /// Squared distance from `pt` to the primitive.
    fn distance_sq(&self, pt: &Point3) -> Scalar {
        pt.distance_sq_to(&self.nearest_point(pt))
    }

    /// Whether `pt` lies on the primitive within tolerance.
    ///
    /// Uses the clamped nearest point, so a point collinear with a ray but
    /// behind its origin does not belong to it.
    fn belongs(&self, pt: &Point3) -> bool {
        self.distance_sq(pt) <= epsilon_sq()
    }

    /// Directions parallel or anti-parallel.
    fn is_parallel(&self, other: &dyn Linear) -> bool {
        self.direction().is_parallel_to(&other.direction())
    }

    /// Directions orthogonal.
    fn is_orthogonal(&self, other: &dyn Linear) -> bool {
        self.direction().is_orthogonal_to(&other.direction())
    }

    /// Same supporting line.
    fn is_collinear(&self, other: &dyn Linear) -> bool {
        self.is_parallel(other) && self.distance_sq_to_line(&other.origin()) <= epsilon_sq()
    }

    /// Whether the two primitives share a point.
    fn intersects(&self, other: &dyn Linear) -> bool {
        self.find_intersection(other).is_some()
    }

    /// A common point of the two primitives, if any.
    ///
    /// Skew and parallel primitives never intersect. For collinear ones the
    /// result is `other`'s origin if it lies on `self`, else `self`'s origin
    /// if it lies on `other`.
    fn find_intersection(&self, other: &dyn Linear) -> Option<Point3> {
        let (oa, da) = (self.origin(), self.direction());
        let (ob, db) = (other.origin(), other.direction());

        let triple = (oa - ob).dot(&db.normalized_or_zero().cross(&da.normalized_or_zero()));
        if triple.abs() > epsilon() {
            return None;
        }

        if self.is_collinear(other) {
            if self.belongs(&ob) {
                return Some(ob);
            }
            if other.belongs(&oa) {
                return Some(oa);
            }
            return None;
        }
        if self.is_parallel(other) {
            return None;
        }

        let p = crossing_point(&oa, &da, &ob, &db)?;
        (self.belongs(&p) && other.belongs(&p)).then_some(p)
    }
}

/// Intersection of two coplanar, non-parallel infinite lines.
///
/// Solves the 2x2 system in the coordinate plane that drops the axis of the
/// largest component of `da × db`, which keeps the determinant away from
/// zero.
fn crossing_point(oa: &Point3, da: &Vec3, ob: &Point3, db: &Vec3) -> Option<Point3> {
    let k = da.cross(db).iamax();
    let (i, j) = ((k + 1) % 3, (k + 2) % 3);
    let r = ob - oa;
    let det = db[i] * da[j] - da[i] * db[j];
    if det == 0.0 {
        return None;
    }
    let m = (da[i] * r[j] - da[j] * r[i]) / det;
    Some(ob + db * m)
}

macro_rules! linear_primitive {
    ($(#[$meta:meta])* $name:ident, $range:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            /// Point at `t = 0`.
            pub origin: Point3,
            /// Direction; its length sets the parameter speed.
            pub direction: Vec3,
        }

        impl $name {
            /// Create from an origin and a (nonzero) direction.
            pub fn new(origin: Point3, direction: Vec3) -> Self {
                Self { origin, direction }
            }

            /// Origin and direction both equal within tolerance.
            pub fn approx_eq(&self, other: &Self) -> bool {
                self.origin.approx_eq(&other.origin) && self.direction.approx_eq(&other.direction)
            }

            /// Apply an affine transform.
            pub fn transformed(&self, m: &Matrix) -> Self {
                Self::new(m.apply_point(&self.origin), m.apply_vector(&self.direction))
            }
        }

        impl Linear for $name {
            #[inline]
            fn origin(&self) -> Point3 {
                self.origin
            }

            #[inline]
            fn direction(&self) -> Vec3 {
                self.direction
            }

            #[inline]
            fn range(&self) -> ParamRange {
                $range
            }
        }
    };
}

linear_primitive!(
    /// An infinite line.
    Line,
    ParamRange::Unbounded
);

linear_primitive!(
    /// A half-line starting at `origin`.
    Ray,
    ParamRange::NonNegative
);

linear_primitive!(
    /// A segment from `origin` to `origin + direction`.
    Segment,
    ParamRange::Unit
);

impl Line {
    /// Line through two points.
    pub fn through(a: Point3, b: Point3) -> Self {
        Self::new(a, b - a)
    }
}

impl Ray {
    /// The infinite line supporting this ray.
    pub fn as_line(&self) -> Line {
        Line::new(self.origin, self.direction)
    }
}

impl Segment {
    /// Segment between two points.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self::new(start, end - start)
    }

    /// End point (`origin + direction`).
    pub fn end(&self) -> Point3 {
        self.origin + self.direction
    }

    /// Euclidean length.
    pub fn length(&self) -> Scalar {
        self.direction.length()
    }

    /// Midpoint.
    pub fn midpoint(&self) -> Point3 {
        self.origin.midpoint(&self.end())
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line with origin: {}    Direction: {}",
            Xyz(self.origin),
            Xyz(self.direction)
        )
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ray with origin: {}    Direction: {}",
            Xyz(self.origin),
            Xyz(self.direction)
        )
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment with start point: {}    End point: {}",
            Xyz(self.origin),
            Xyz(self.end())
        )
    }
}

impl Persist for Line {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.origin.save(w)?;
        self.direction.save(w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let origin = Point3::restore(r)?;
        let direction = Vec3::restore(r)?;
        Ok(Self::new(origin, direction))
    }
}

impl Persist for Ray {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.origin.save(w)?;
        self.direction.save(w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let origin = Point3::restore(r)?;
        let direction = Vec3::restore(r)?;
        Ok(Self::new(origin, direction))
    }
}

impl Persist for Segment {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.origin.save(w)?;
        self.direction.save(w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let origin = Point3::restore(r)?;
        let direction = Vec3::restore(r)?;
        Ok(Self::new(origin, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomlib_math::consts::FRAC_PI_2;

    fn p(x: Scalar, y: Scalar, z: Scalar) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: Scalar, y: Scalar, z: Scalar) -> Vec3 {
        Vec3::new(x, y, z)
    }

    #[test]
    fn test_param_range() {
        assert_eq!(ParamRange::Unbounded.clamp(-3.0), -3.0);
        assert_eq!(ParamRange::NonNegative.clamp(-3.0), 0.0);
        assert_eq!(ParamRange::Unit.clamp(3.0), 1.0);
        assert!(ParamRange::Unit.contains(0.5));
        assert!(!ParamRange::NonNegative.contains(-0.1));
    }

    #[test]
    fn test_parameter_and_nearest() {
        let seg = Segment::new(p(0.0, 0.0, 0.0), v(2.0, 0.0, 0.0));
        assert!((seg.parameter_of(&p(1.0, 5.0, 0.0)) - 0.5).abs() < 1e-12);
        assert!(seg.nearest_point(&p(5.0, 1.0, 0.0)).approx_eq(&p(2.0, 0.0, 0.0)));
        assert!(seg
            .nearest_point_on_line(&p(5.0, 1.0, 0.0))
            .approx_eq(&p(5.0, 0.0, 0.0)));
        assert!((seg.distance(&p(5.0, 4.0, 0.0)) - 5.0).abs() < 1e-12);
        assert!((seg.distance_to_line(&p(5.0, 4.0, 0.0)) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_belongs_at_origin() {
        let o = p(1.0, -2.0, 3.0);
        let d = v(0.3, 0.1, -2.0);
        assert!(Line::new(o, d).belongs(&o));
        assert!(Ray::new(o, d).belongs(&o));
        assert!(Segment::new(o, d).belongs(&o));
    }

    #[test]
    fn test_segment_boundaries() {
        let seg = Segment::new(p(1.0, 1.0, 1.0), v(2.0, -1.0, 0.5));
        let delta = 1e-3;
        assert!(seg.belongs(&seg.point_at(0.0)));
        assert!(seg.belongs(&seg.point_at(1.0)));
        assert!(seg.belongs(&seg.end()));
        assert!(!seg.belongs(&seg.point_at(-delta)));
        assert!(!seg.belongs(&seg.point_at(1.0 + delta)));
    }

    #[test]
    fn test_ray_excludes_points_behind_origin() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        assert!(ray.belongs(&p(100.0, 0.0, 0.0)));
        assert!(!ray.belongs(&p(-1.0, 0.0, 0.0)));
        assert!(ray.as_line().belongs(&p(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_crossing_lines() {
        let a = Line::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let b = Line::new(p(1.0, -1.0, 0.0), v(0.0, 1.0, 0.0));
        let hit = a.find_intersection(&b).unwrap();
        assert!(hit.approx_eq(&p(1.0, 0.0, 0.0)));
        assert!(a.belongs(&hit) && b.belongs(&hit));
        assert!(a.intersects(&b));
        assert!(a.is_orthogonal(&b));
    }

    #[test]
    fn test_crossing_in_tilted_plane() {
        // Both lines lie in x + y + z = 3 and cross at (1, 1, 1).
        let a = Line::through(p(3.0, 0.0, 0.0), p(1.0, 1.0, 1.0));
        let b = Line::through(p(0.0, 0.0, 3.0), p(1.0, 1.0, 1.0));
        let hit = a.find_intersection(&b).unwrap();
        assert!(hit.approx_eq(&p(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_axes_meet_at_origin() {
        let x_axis = Line::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let y_axis = Line::new(p(0.0, 1.0, 0.0), v(0.0, 1.0, 0.0));
        let hit = x_axis.find_intersection(&y_axis).unwrap();
        assert!(hit.approx_eq(&Point3::origin()));
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = Line::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let b = Line::new(p(0.0, 1.0, 0.0), v(-2.0, 0.0, 0.0));
        assert!(a.is_parallel(&b));
        assert!(!a.is_collinear(&b));
        assert!(a.find_intersection(&b).is_none());
    }

    #[test]
    fn test_skew_lines() {
        let a = Line::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let b = Line::new(p(0.0, 0.0, 1.0), v(0.0, 1.0, 0.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_collinear_overlap() {
        let a = Segment::from_points(p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0));
        let b = Segment::from_points(p(1.0, 0.0, 0.0), p(5.0, 0.0, 0.0));
        assert!(a.is_collinear(&b));
        assert!(a.find_intersection(&b).unwrap().approx_eq(&p(1.0, 0.0, 0.0)));
        // Falls back to self's origin when other's origin is outside self.
        assert!(b.find_intersection(&a).unwrap().approx_eq(&p(1.0, 0.0, 0.0)));

        let c = Segment::from_points(p(3.0, 0.0, 0.0), p(5.0, 0.0, 0.0));
        assert!(a.find_intersection(&c).is_none());
    }

    #[test]
    fn test_range_rejects_crossing_point() {
        // The supporting lines cross at (1, 0, 0), behind the ray.
        let ray = Ray::new(p(2.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let seg = Segment::from_points(p(1.0, -1.0, 0.0), p(1.0, 1.0, 0.0));
        assert!(ray.find_intersection(&seg).is_none());
        assert!(ray.as_line().find_intersection(&seg).is_some());

        // Segment too short to reach the line.
        let short = Segment::from_points(p(1.0, 1.0, 0.0), p(1.0, 2.0, 0.0));
        assert!(ray.as_line().find_intersection(&short).is_none());
    }

    #[test]
    fn test_transformed() {
        let seg = Segment::from_points(p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0));
        let m = Matrix::rotation_z(FRAC_PI_2) * Matrix::translation(&v(0.0, 0.0, 1.0));
        let moved = seg.transformed(&m);
        assert!(moved.origin.approx_eq(&p(0.0, 1.0, 1.0)));
        assert!(moved.end().approx_eq(&p(0.0, 2.0, 1.0)));
        assert!((moved.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_persist_and_display() {
        let seg = Segment::from_points(p(1.0, 2.0, 3.0), p(4.0, 5.0, 6.0));
        assert_eq!(Segment::from_bytes(&seg.to_bytes().unwrap()).unwrap(), seg);
        // end - origin would round this direction to 0.20000000000000004
        let short = Segment::new(p(0.1, 0.0, 0.0), v(0.2, 0.0, 0.0));
        assert_eq!(Segment::from_bytes(&short.to_bytes().unwrap()).unwrap(), short);
        assert!(seg.to_string().starts_with("Segment with start point: (1.000000"));

        let ray = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, -1.0));
        assert_eq!(Ray::from_bytes(&ray.to_bytes().unwrap()).unwrap(), ray);
        assert!(ray.to_string().starts_with("Ray with origin"));

        let line = Line::new(p(1.0, 1.0, 1.0), v(1.0, 0.0, 0.0));
        assert_eq!(Line::from_bytes(&line.to_bytes().unwrap()).unwrap(), line);
    }
}
