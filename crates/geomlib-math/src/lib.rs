#![warn(missing_docs)]

//! Math types for the geomlib toolkit.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for analytic 3D geometry: points, vectors, affine matrices, the
//! process-wide tolerance policy, and a fixed-order binary persistence
//! contract shared by every higher-level primitive.
//!
//! Points and vectors are plain nalgebra types. The tolerance-aware
//! algebra lives in the [`VectorExt`] and [`PointExt`] extension traits, so
//! every "is zero" / "is equal" / "is parallel" test goes through the same
//! [`tolerance`] policy.

pub mod coords;
pub mod error;
pub mod matrix;
pub mod persist;
pub mod point;
pub mod tolerance;
pub mod vector;

pub use coords::{Coordinates, Xyz};
pub use error::{GeomError, Result};
pub use matrix::Matrix;
pub use persist::Persist;
pub use point::PointExt;
pub use tolerance::{
    epsilon, epsilon_sq, is_zero, reset_epsilon, set_epsilon, Tolerance, DEFAULT_EPSILON,
};
pub use vector::VectorExt;

/// Floating-point type used by every geometric quantity in the build.
#[cfg(not(feature = "f32"))]
pub type Scalar = f64;

/// Floating-point type used by every geometric quantity in the build.
#[cfg(feature = "f32")]
pub type Scalar = f32;

/// Mathematical constants for [`Scalar`].
#[cfg(not(feature = "f32"))]
pub use std::f64::consts;

/// Mathematical constants for [`Scalar`].
#[cfg(feature = "f32")]
pub use std::f32::consts;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<Scalar>;

/// A vector (displacement or direction) in 3D space.
pub type Vec3 = nalgebra::Vector3<Scalar>;

/// A point in 2D surface-parameter space.
pub type Point2 = nalgebra::Point2<Scalar>;

/// Number of hardware threads available to the process (at least 1).
///
/// Used to size worker pools and to pick the chunk count of parallel
/// mesh queries.
pub fn hardware_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
