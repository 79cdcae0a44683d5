//! Error types for mesh construction and persistence.

use geomlib_math::GeomError;
use thiserror::Error;

/// Errors from building or restoring a [`TessModel`](crate::TessModel).
#[derive(Error, Debug)]
pub enum MeshError {
    /// A triangle refers to a point that does not exist.
    #[error("point index {index} out of range for {len} points")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of points available.
        len: usize,
    },

    /// The model cannot address more points with 32-bit indices.
    #[error("mesh point count {0} exceeds the 32-bit index range")]
    TooManyPoints(usize),

    /// Persistence failure or corrupt input.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
