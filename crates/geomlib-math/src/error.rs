//! Error types for the math layer.

use thiserror::Error;

/// Errors raised by persistence and other I/O-facing operations.
///
/// Ordinary geometric failures (no intersection, singular matrix, point not
/// on a surface) are reported as `Option`/empty results, not as errors.
#[derive(Error, Debug)]
pub enum GeomError {
    /// Underlying reader or writer failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Restored data violates an invariant of the type being restored.
    #[error("corrupt data: {0}")]
    CorruptData(String),
}

/// Result type for math-layer operations.
pub type Result<T> = std::result::Result<T, GeomError>;
