#![warn(missing_docs)]

//! Tessellated models and ray queries for the geomlib toolkit.
//!
//! A [`TessModel`] is an indexed triangle soup grown one surface at a time.
//! Points are deduplicated on insertion, triangles are stored in a canonical
//! rotation and never duplicated, and each added surface records where its
//! triangles end. Ray queries are a brute-force scan, either sequential
//! ([`TessModel::find_intersection`]) or fanned out over a
//! [`WorkerPool`](geomlib_pool::WorkerPool)
//! ([`TessModel::find_intersection_parallel`]).

pub mod error;
pub mod model;
pub mod query;
pub mod tessellate;

pub use error::{MeshError, Result};
pub use model::{RayHit, TessModel, Triangle};
pub use query::CHUNKS_PER_THREAD;
pub use tessellate::{
    tessellate_cylinder, tessellate_disk, tessellate_plane_patch, TessellationParams,
};
