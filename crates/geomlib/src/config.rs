//! Toolkit configuration loaded from TOML.
//!
//! ```toml
//! epsilon = 1e-6
//! workers = 8
//! chunks_per_worker = 4
//! ```
//!
//! Every key is optional. `chunks_per_worker` drives
//! [`GeomConfig::find_nearest_hit`].

use std::path::Path;
use std::sync::Arc;

use geomlib_geom::Ray;
use geomlib_math::{hardware_concurrency, Scalar, Tolerance, DEFAULT_EPSILON};
use geomlib_mesh::{RayHit, TessModel, CHUNKS_PER_THREAD};
use geomlib_pool::WorkerPool;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Errors from loading or validating a [`GeomConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Rendering as TOML failed.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tolerance and parallelism settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeomConfig {
    /// Process-wide comparison tolerance.
    pub epsilon: Scalar,
    /// Worker threads; `None` means one per hardware thread.
    pub workers: Option<usize>,
    /// Chunks a parallel ray query submits per worker.
    pub chunks_per_worker: usize,
}

impl Default for GeomConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            workers: None,
            chunks_per_worker: CHUNKS_PER_THREAD,
        }
    }
}

impl GeomConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.chunks_per_worker == 0 {
            return Err(ConfigError::Invalid(
                "chunks_per_worker must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Worker count after resolving the hardware default.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(hardware_concurrency)
    }

    /// Chunk count for a parallel ray query on `pool`.
    pub fn chunk_count(&self, pool: &WorkerPool) -> usize {
        self.chunks_per_worker * pool.size()
    }

    /// Nearest hit of `ray` on `model`, split into
    /// [`GeomConfig::chunk_count`] tasks on `pool`.
    pub fn find_nearest_hit(
        &self,
        model: &Arc<TessModel>,
        ray: &Ray,
        pool: &WorkerPool,
    ) -> Option<RayHit> {
        model.find_intersection_chunked(ray, pool, self.chunk_count(pool))
    }

    /// Install `epsilon` as the process-wide tolerance.
    ///
    /// Call before any parallel work starts; models created earlier keep
    /// their own merge distance.
    pub fn apply(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Tolerance { eps: self.epsilon }.install();
        info!(epsilon = f64::from(self.epsilon), "tolerance configured");
        Ok(())
    }

    /// Spawn a pool sized by [`GeomConfig::worker_count`].
    pub fn build_pool(&self) -> Result<WorkerPool, ConfigError> {
        Ok(WorkerPool::new(self.worker_count())?)
    }
}
