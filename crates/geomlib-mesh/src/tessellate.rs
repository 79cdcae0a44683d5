//! Triangulation of analytic surfaces into [`TessModel`](crate::TessModel)
//! input.
//!
//! Every function returns a point list and triangles indexing into it, ready
//! for [`TessModel::add_surface`](crate::TessModel::add_surface). Triangles
//! are wound so their normal points out of the surface: along the plane
//! normal, away from the cylinder axis, along the circle axis.

use geomlib_geom::{Circle, Curve, Cylinder, Plane, Surface};
use geomlib_math::consts::TAU;
use geomlib_math::{Point2, Point3, Scalar};

use crate::model::Triangle;

/// Tessellation density.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TessellationParams {
    /// Number of segments around circular features.
    pub circle_segments: u32,
    /// Number of segments along the height of cylinders.
    pub height_segments: u32,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            circle_segments: 32,
            height_segments: 1,
        }
    }
}

impl TessellationParams {
    /// Params with `segments` around circles (at least 3) and one band of
    /// height.
    pub fn from_segments(segments: u32) -> Self {
        Self {
            circle_segments: segments.max(3),
            height_segments: 1,
        }
    }

    fn segments(&self) -> u32 {
        self.circle_segments.max(3)
    }

    fn rings(&self) -> u32 {
        self.height_segments.max(1)
    }
}

/// Two triangles for the quad `a b c d`, counter-clockwise.
fn quad(a: u32, b: u32, c: u32, d: u32) -> [Triangle; 2] {
    [[a, b, c], [a, c, d]]
}

/// Grid over the rectangle `u_range × v_range` of `plane`'s in-plane basis,
/// split into `divisions.0 × divisions.1` cells (each at least 1).
pub fn tessellate_plane_patch(
    plane: &Plane,
    u_range: (Scalar, Scalar),
    v_range: (Scalar, Scalar),
    divisions: (u32, u32),
) -> (Vec<Point3>, Vec<Triangle>) {
    let (e1, e2) = plane.basis();
    let nu = divisions.0.max(1);
    let nv = divisions.1.max(1);
    let row = nu + 1;

    let mut points = Vec::with_capacity((row * (nv + 1)) as usize);
    for j in 0..=nv {
        let v = v_range.0 + (v_range.1 - v_range.0) * j as Scalar / nv as Scalar;
        for i in 0..=nu {
            let u = u_range.0 + (u_range.1 - u_range.0) * i as Scalar / nu as Scalar;
            points.push(plane.origin + e1 * u + e2 * v);
        }
    }

    let mut triangles = Vec::with_capacity((2 * nu * nv) as usize);
    for j in 0..nv {
        for i in 0..nu {
            let a = j * row + i;
            triangles.extend(quad(a, a + 1, a + 1 + row, a + row));
        }
    }
    (points, triangles)
}

/// Side of `cylinder` between axial heights `heights.0` and `heights.1`.
///
/// Rings of `params.circle_segments` points are stacked
/// `params.height_segments` bands high; the seam wraps back to the first
/// point of each ring, so no point is duplicated.
pub fn tessellate_cylinder(
    cylinder: &Cylinder,
    heights: (Scalar, Scalar),
    params: &TessellationParams,
) -> (Vec<Point3>, Vec<Triangle>) {
    let segments = params.segments();
    let rings = params.rings();

    let mut points = Vec::with_capacity((segments * (rings + 1)) as usize);
    for j in 0..=rings {
        let h = heights.0 + (heights.1 - heights.0) * j as Scalar / rings as Scalar;
        for k in 0..segments {
            let angle = TAU * k as Scalar / segments as Scalar;
            points.push(cylinder.point_at(Point2::new(h, angle)));
        }
    }

    let index = |j: u32, k: u32| j * segments + k % segments;
    let mut triangles = Vec::with_capacity((2 * segments * rings) as usize);
    for j in 0..rings {
        for k in 0..segments {
            triangles.extend(quad(
                index(j, k),
                index(j, k + 1),
                index(j + 1, k + 1),
                index(j + 1, k),
            ));
        }
    }
    (points, triangles)
}

/// Fan over the disk bounded by `circle`. The center is point 0.
pub fn tessellate_disk(circle: &Circle, params: &TessellationParams) -> (Vec<Point3>, Vec<Triangle>) {
    let segments = params.segments();
    let mut points = Vec::with_capacity(segments as usize + 1);
    points.push(circle.center);
    for k in 0..segments {
        points.push(circle.point_at(TAU * k as Scalar / segments as Scalar));
    }
    let triangles = (0..segments)
        .map(|k| [0, k + 1, (k + 1) % segments + 1])
        .collect();
    (points, triangles)
}
