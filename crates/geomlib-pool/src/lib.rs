#![warn(missing_docs)]

//! Fixed-size worker pool.
//!
//! N OS threads pull boxed closures from one FIFO queue. Callers block on
//! [`WorkerPool::wait_for_completion`] until every submitted task has
//! finished; there is no per-task handle. Results travel back through
//! whatever the task captures (a channel, an atomic, a mutex).
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use geomlib_pool::WorkerPool;
//!
//! let pool = WorkerPool::new(2).unwrap();
//! let sum = Arc::new(AtomicUsize::new(0));
//! for i in 1..=10 {
//!     let sum = Arc::clone(&sum);
//!     pool.submit(move || {
//!         sum.fetch_add(i, Ordering::Relaxed);
//!     });
//! }
//! pool.wait_for_completion();
//! assert_eq!(sum.load(Ordering::Relaxed), 55);
//! ```

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use geomlib_math::hardware_concurrency;
use tracing::{debug, error};

type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct State {
    queue: VecDeque<Task>,
    submitted: u64,
    completed: u64,
    stop: bool,
}

struct Shared {
    state: Mutex<State>,
    /// Signalled when a task is queued or the pool is stopping.
    task_available: Condvar,
    /// Signalled whenever a task finishes.
    task_finished: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Tasks run outside the lock and their panics are caught, so the
        // state is consistent even if the mutex is marked poisoned.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fixed set of worker threads consuming a shared FIFO task queue.
///
/// Dropping the pool (or calling [`WorkerPool::shutdown`]) stops the
/// workers: tasks already running finish, tasks still queued are dropped
/// without running.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn a pool of `size` workers (at least one).
    pub fn new(size: usize) -> io::Result<Self> {
        let size = size.max(1);
        let mut pool = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                task_available: Condvar::new(),
                task_finished: Condvar::new(),
            }),
            workers: Vec::with_capacity(size),
        };
        for id in 0..size {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("geomlib-worker-{id}"))
                .spawn(move || worker_loop(id, &shared))?;
            pool.workers.push(handle);
        }
        debug!(size, "worker pool started");
        Ok(pool)
    }

    /// Spawn one worker per hardware thread.
    pub fn with_default_size() -> io::Result<Self> {
        Self::new(hardware_concurrency())
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue `task` and wake one idle worker.
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.shared.lock();
            state.queue.push_back(Box::new(task));
            state.submitted += 1;
        }
        self.shared.task_available.notify_one();
    }

    /// Submitted tasks that have not finished yet.
    pub fn outstanding(&self) -> u64 {
        let state = self.shared.lock();
        state.submitted - state.completed
    }

    /// Block until every task submitted so far has finished.
    pub fn wait_for_completion(&self) {
        let state = self.shared.lock();
        let _state = self
            .shared
            .task_finished
            .wait_while(state, |s| s.completed < s.submitted)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Stop the workers and join them. Queued tasks are dropped.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        let dropped = {
            let mut state = self.shared.lock();
            state.stop = true;
            let dropped = state.queue.len();
            state.queue.clear();
            dropped
        };
        self.shared.task_available.notify_all();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }
        debug!(dropped, "worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

fn worker_loop(id: usize, shared: &Shared) {
    loop {
        let task = {
            let state = shared.lock();
            let mut state = shared
                .task_available
                .wait_while(state, |s| !s.stop && s.queue.is_empty())
                .unwrap_or_else(PoisonError::into_inner);
            if state.stop {
                return;
            }
            match state.queue.pop_front() {
                Some(task) => task,
                None => continue,
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(worker = id, "task panicked");
        }

        shared.lock().completed += 1;
        shared.task_finished.notify_all();
    }
}
