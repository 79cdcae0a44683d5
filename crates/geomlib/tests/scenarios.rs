//! End-to-end scenarios across the math, geometry, mesh and pool crates.

use std::sync::Arc;

use approx::assert_relative_eq;
use geomlib::{
    tessellate_cylinder, tessellate_disk, Circle, Cylinder, Line, Linear, Persist, Plane, Point3,
    PointExt, Ray, Scalar, Surface, TessModel, TessellationParams, Triangle, Vec3, VectorExt,
    WorkerPool,
};
use geomlib::geomlib_math::consts::PI;
use proptest::prelude::*;

fn p(x: Scalar, y: Scalar, z: Scalar) -> Point3 {
    Point3::new(x, y, z)
}

fn v(x: Scalar, y: Scalar, z: Scalar) -> Vec3 {
    Vec3::new(x, y, z)
}

// ---------------------------------------------------------------------------
// Line / line
// ---------------------------------------------------------------------------

#[test]
fn x_axis_and_vertical_line_through_y1_meet_at_origin() {
    // Line((0,1,0), dir (0,1,0)) is the y axis itself, so it crosses the x axis.
    let x_axis = Line::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
    let y_line = Line::new(p(0.0, 1.0, 0.0), v(0.0, 1.0, 0.0));
    assert!(!x_axis.is_parallel(&y_line));
    let hit = x_axis.find_intersection(&y_line).unwrap();
    assert!(hit.approx_eq(&Point3::origin()));
}

#[test]
fn parallel_distinct_lines_do_not_intersect() {
    let a = Line::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
    let b = Line::new(p(0.0, 1.0, 0.0), v(1.0, 0.0, 0.0));
    assert!(a.is_parallel(&b));
    assert!(!a.is_collinear(&b));
    assert!(!a.intersects(&b));
    assert!(a.find_intersection(&b).is_none());
}

// ---------------------------------------------------------------------------
// Plane / ray
// ---------------------------------------------------------------------------

#[test]
fn ray_hits_plane_only_when_pointing_at_it() {
    let plane = Plane::new(Point3::origin(), v(0.0, 0.0, 1.0));
    let down = Ray::new(p(0.0, 0.0, 5.0), v(0.0, 0.0, -1.0));
    let hit = plane.find_intersection(&down).unwrap();
    assert!(hit.approx_eq(&Point3::origin()));

    let up = Ray::new(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0));
    assert!(plane.find_intersection(&up).is_none());
}

// ---------------------------------------------------------------------------
// Cylinder
// ---------------------------------------------------------------------------

#[test]
fn line_on_cylinder_surface() {
    let cylinder = Cylinder::new(Point3::origin(), v(0.0, 0.0, 1.0), 2.0);
    let line = Line::new(p(2.0, 0.0, 4.0), v(0.0, 0.0, 1.0));

    let uv = cylinder.parameters(&p(2.0, 0.0, 4.0)).unwrap();
    assert_relative_eq!(uv.x, 4.0, epsilon = 1e-12);
    assert_relative_eq!(uv.y, 0.0, epsilon = 1e-12);

    for t in [-3.0, 0.0, 2.5] {
        assert!(cylinder.belongs(&line.point_at(t)));
    }
    // Parallel to the axis: no discrete intersection points.
    assert!(cylinder.find_intersections(&line).is_empty());
}

#[test]
fn tessellated_cylinder_agrees_with_analytic_hits() {
    let cylinder = Cylinder::new(p(1.0, -1.0, 0.0), v(0.0, 0.0, 1.0), 2.0);
    let params = TessellationParams {
        circle_segments: 64,
        height_segments: 2,
    };
    let (points, triangles) = tessellate_cylinder(&cylinder, (-1.0, 3.0), &params);
    let mut model = TessModel::new();
    model.add_surface(&points, &triangles).unwrap();

    // The chord sagitta bounds how far a facet sits inside the surface.
    let sagitta = 2.0 * (1.0 - (PI / 64.0).cos());
    for angle in [0.3, 1.7, 2.9, 4.4, 6.0] {
        let dir = v(Scalar::cos(angle), Scalar::sin(angle), 0.1);
        let origin = cylinder.origin() + v(0.0, 0.0, 1.0) + dir * 10.0;
        let ray = Ray::new(origin, -dir);

        let analytic = cylinder
            .find_intersections(&ray)
            .into_iter()
            .min_by(|a, b| a.distance_sq_to(&origin).total_cmp(&b.distance_sq_to(&origin)))
            .unwrap();
        let hit = model.find_nearest(&ray).unwrap();
        assert!(hit.point.distance_to(&analytic) <= 2.0 * sagitta, "angle {angle}");
        assert!(hit.normal.dot(&dir) > 0.0);
    }
}

// ---------------------------------------------------------------------------
// Mesh model
// ---------------------------------------------------------------------------

#[test]
fn closed_can_from_surfaces() {
    let axis = v(0.0, 0.0, 1.0);
    let params = TessellationParams::from_segments(16);
    let side = Cylinder::new(Point3::origin(), axis, 1.0);
    let top = Circle::new(p(0.0, 0.0, 2.0), axis, 1.0);
    let bottom = Circle::new(Point3::origin(), -axis, 1.0);

    let mut model = TessModel::new();
    let (points, triangles) = tessellate_cylinder(&side, (0.0, 2.0), &params);
    model.add_surface(&points, &triangles).unwrap();
    let (points, triangles) = tessellate_disk(&top, &params);
    model.add_surface(&points, &triangles).unwrap();
    let (points, triangles) = tessellate_disk(&bottom, &params);
    model.add_surface(&points, &triangles).unwrap();

    // Rim points are shared between side and caps.
    assert_eq!(model.num_points(), 16 * 2 + 2);
    assert_eq!(model.num_triangles(), 32 + 16 + 16);
    assert_eq!(model.surface_ends(), &[32, 48, 64]);

    let ray = Ray::new(p(0.1, 0.2, 10.0), v(0.0, 0.0, -1.0));
    let hit = model.find_nearest(&ray).unwrap();
    assert_eq!(model.surface_of_triangle(hit.triangle), Some(1));
    assert!(hit.normal.approx_eq(&axis));

    let restored = TessModel::from_bytes(&model.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.find_nearest(&ray), Some(hit));
}

// ---------------------------------------------------------------------------
// Parallel nearest hit == sequential nearest hit
// ---------------------------------------------------------------------------

const R: Scalar = 10.0;

fn arb_point() -> impl Strategy<Value = Point3> {
    (-R..R, -R..R, -R..R).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn arb_triangle() -> impl Strategy<Value = [Point3; 3]> {
    (arb_point(), arb_point(), arb_point()).prop_map(|(a, b, c)| [a, b, c])
}

fn soup(triangles: &[[Point3; 3]]) -> Arc<TessModel> {
    let points: Vec<Point3> = triangles.iter().flatten().copied().collect();
    let indices: Vec<Triangle> = (0..triangles.len() as u32)
        .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
        .collect();
    let mut model = TessModel::new();
    model.add_surface(&points, &indices).unwrap();
    Arc::new(model)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn parallel_nearest_hit_matches_sequential(
        triangles in prop::collection::vec(arb_triangle(), 100),
        origin in arb_point(),
        target in 0usize..100,
    ) {
        let model = soup(&triangles);
        let [a, b, c] = triangles[target];
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        // Aimed at one triangle so most cases produce a hit.
        let start = Point3::from(origin.coords * 3.0);
        let dir = centroid - start;
        prop_assume!(dir.length() > 1e-3);
        let ray = Ray::new(start, dir);

        let pool = WorkerPool::new(4).unwrap();
        let sequential = model.find_intersection(&ray, 0..model.num_triangles());
        let parallel = model.find_intersection_parallel(&ray, &pool);
        prop_assert_eq!(parallel, sequential);
    }
}
