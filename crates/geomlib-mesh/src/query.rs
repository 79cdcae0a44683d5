//! Nearest-hit ray queries fanned out over a [`WorkerPool`].

use std::ops::Range;
use std::sync::{mpsc, Arc};

use geomlib_geom::Ray;
use geomlib_math::hardware_concurrency;
use geomlib_pool::WorkerPool;
use tracing::{debug, instrument};

use crate::model::{RayHit, TessModel};

/// Chunks submitted per hardware thread by
/// [`TessModel::find_intersection_parallel`].
pub const CHUNKS_PER_THREAD: usize = 4;

/// Split `0..len` into at most `chunks` contiguous ranges whose sizes differ
/// by at most one.
pub(crate) fn chunk_ranges(len: usize, chunks: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let chunks = chunks.clamp(1, len);
    let base = len / chunks;
    let extra = len % chunks;
    let mut start = 0;
    (0..chunks)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

impl TessModel {
    /// Nearest hit of `ray` over the whole model, searched in
    /// `CHUNKS_PER_THREAD × hardware threads` chunks on `pool`.
    ///
    /// Returns the same hit as [`TessModel::find_nearest`], ties included.
    #[instrument(level = "debug", skip_all, fields(triangles = self.num_triangles()))]
    pub fn find_intersection_parallel(self: &Arc<Self>, ray: &Ray, pool: &WorkerPool) -> Option<RayHit> {
        self.find_intersection_chunked(ray, pool, CHUNKS_PER_THREAD * hardware_concurrency())
    }

    /// Triangle ranges a query split into `chunks` tasks would scan.
    pub fn query_chunks(&self, chunks: usize) -> Vec<Range<usize>> {
        chunk_ranges(self.num_triangles(), chunks)
    }

    /// Like [`TessModel::find_intersection_parallel`] with an explicit chunk
    /// count.
    ///
    /// Blocks on [`WorkerPool::wait_for_completion`], so it also waits for
    /// any unrelated work already queued on `pool`.
    pub fn find_intersection_chunked(
        self: &Arc<Self>,
        ray: &Ray,
        pool: &WorkerPool,
        chunks: usize,
    ) -> Option<RayHit> {
        let ranges = self.query_chunks(chunks);
        debug!(chunks = ranges.len(), workers = pool.size(), "submitting ray query");

        let (tx, rx) = mpsc::channel();
        for range in ranges {
            let model = Arc::clone(self);
            let ray = *ray;
            let tx = tx.clone();
            pool.submit(move || {
                // The receiver outlives every task.
                let _ = tx.send(model.find_intersection(&ray, range));
            });
        }
        drop(tx);
        pool.wait_for_completion();

        rx.try_iter().flatten().min_by(|a, b| {
            a.distance_sq
                .total_cmp(&b.distance_sq)
                .then(a.triangle.cmp(&b.triangle))
        })
    }
}
