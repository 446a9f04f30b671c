//! Launching concurrent branches.
//!
//! The engine hands every extra child branch to a [`Spawn`] implementation as
//! a boxed [`Job`]. Any `Fn(Job)` closure works, which lets a caller plug in
//! an existing pool:
//!
//! ```
//! use taskdag::{Executor, Job};
//!
//! let executor = Executor::with_spawner(|job: Job| {
//!     std::thread::spawn(job);
//! });
//! # let _ = executor;
//! ```
//!
//! A node visit never blocks on another branch, so a spawner is free to run a
//! job inline on the calling thread. Join semantics do not depend on where a
//! job runs.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::{trace, warn};

/// One branch of a workflow walk.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a [`Job`] concurrently.
pub trait Spawn: Send + Sync + 'static {
    fn spawn(&self, job: Job);
}

impl<F> Spawn for F
where
    F: Fn(Job) + Send + Sync + 'static,
{
    fn spawn(&self, job: Job) {
        self(job)
    }
}

/// Runs every job immediately on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSpawner;

impl Spawn for InlineSpawner {
    fn spawn(&self, job: Job) {
        job()
    }
}

/// One OS thread per job.
///
/// Unbounded by default. With [`max_threads`](Self::max_threads) set, a job
/// that would exceed the cap runs inline on the caller instead. A thread the
/// OS refuses to create is handled the same way.
#[derive(Debug, Default)]
pub struct ThreadSpawner {
    name_prefix: Option<String>,
    stack_size: Option<usize>,
    max_threads: Option<usize>,
    active: Arc<AtomicUsize>,
    spawned: AtomicUsize,
}

impl ThreadSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name branch threads `{prefix}-{n}`.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Cap the number of branch threads alive at once. `0` runs every branch
    /// inline.
    pub fn max_threads(mut self, max: usize) -> Self {
        self.max_threads = Some(max);
        self
    }

    /// Branch threads currently alive.
    pub fn active_threads(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Reserve a slot under the cap.
    fn acquire(&self) -> bool {
        let Some(max) = self.max_threads else {
            self.active.fetch_add(1, Ordering::AcqRel);
            return true;
        };
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .is_ok()
    }

    fn try_spawn(&self, job: Job) -> Result<(), (io::Error, Job)> {
        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
        let mut builder = thread::Builder::new();
        if let Some(prefix) = &self.name_prefix {
            builder = builder.name(format!("{prefix}-{n}"));
        }
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }

        // The job travels through a slot so it can be recovered if the thread
        // never starts.
        let slot = Arc::new(Mutex::new(Some(job)));
        let thread_slot = Arc::clone(&slot);
        let guard = ActiveGuard {
            active: Arc::clone(&self.active),
        };

        match builder.spawn(move || {
            let _guard = guard;
            if let Some(job) = thread_slot.lock().take() {
                job();
            }
        }) {
            Ok(_) => Ok(()),
            Err(err) => match slot.lock().take() {
                Some(job) => Err((err, job)),
                None => Ok(()),
            },
        }
    }
}

impl Spawn for ThreadSpawner {
    fn spawn(&self, job: Job) {
        if !self.acquire() {
            #[cfg(feature = "tracing")]
            trace!(
                active = self.active_threads(),
                "thread cap reached, running branch inline"
            );
            job();
            return;
        }

        if let Err((_err, job)) = self.try_spawn(job) {
            #[cfg(feature = "tracing")]
            warn!(error = %_err, "failed to spawn branch thread, running inline");
            job();
        }
    }
}

// Releases a cap slot when the branch thread exits, or when a thread that
// never started drops its closure.
struct ActiveGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
