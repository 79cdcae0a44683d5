#![warn(missing_docs)]

//! Analytic 3D geometry toolkit with a tessellated-mesh ray query engine.
//!
//! Re-exports the layered crates:
//! - [`geomlib_math`]: scalar type, tolerance policy, vector/point algebra,
//!   [`Matrix`], binary [`Persist`]ence
//! - [`geomlib_geom`]: lines, rays, segments, planes, cylinders, circles, arcs
//! - [`geomlib_pool`]: the fixed [`WorkerPool`]
//! - [`geomlib_mesh`]: [`TessModel`] and its nearest-hit ray queries
//!
//! plus [`GeomConfig`], which sets the tolerance and sizes the pool from a
//! TOML file.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use geomlib::{tessellate_cylinder, Cylinder, GeomConfig, Point3, Ray, TessModel, TessellationParams, Vec3};
//!
//! let config = GeomConfig::from_toml_str("workers = 2").unwrap();
//! let pool = config.build_pool().unwrap();
//!
//! let cylinder = Cylinder::new(Point3::origin(), Vec3::z(), 1.0);
//! let (points, triangles) = tessellate_cylinder(&cylinder, (0.0, 1.0), &TessellationParams::default());
//! let mut model = TessModel::new();
//! model.add_surface(&points, &triangles).unwrap();
//! let model = Arc::new(model);
//!
//! let ray = Ray::new(Point3::new(5.0, 0.0, 0.5), Vec3::new(-1.0, 0.0, 0.0));
//! let hit = model.find_intersection_parallel(&ray, &pool).unwrap();
//! assert!((hit.point.x - 1.0).abs() < 1e-9);
//! ```

pub mod config;

pub use geomlib_geom;
pub use geomlib_math;
pub use geomlib_mesh;
pub use geomlib_pool;

pub use config::{ConfigError, GeomConfig};
pub use geomlib_geom::{
    Arc, Circle, Curve, CurveKind, Cylinder, Line, Linear, ParamRange, Plane, Ray, Segment,
    Surface, SurfaceKind,
};
pub use geomlib_math::{
    epsilon, hardware_concurrency, reset_epsilon, set_epsilon, GeomError, Matrix, Persist,
    Point2, Point3, PointExt, Scalar, Tolerance, Vec3, VectorExt, Xyz,
};
pub use geomlib_mesh::{
    tessellate_cylinder, tessellate_disk, tessellate_plane_patch, MeshError, RayHit, TessModel,
    TessellationParams, Triangle,
};
pub use geomlib_pool::WorkerPool;
