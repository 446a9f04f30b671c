//! Cancellation contexts.
//!
//! A [`Context`] is a cheap, cloneable cancellation token. The engine polls it
//! before every node it is about to run; running task bodies are never
//! interrupted.
//!
//! Contexts form a chain: a derived context is done when it is cancelled, when
//! its own deadline passes, or when any ancestor is done. Cancelling a context
//! never affects its parent.
//!
//! ```
//! use std::time::Duration;
//! use taskdag::{Context, WorkflowError};
//!
//! let parent = Context::background();
//! let child = parent.with_timeout(Duration::from_secs(60));
//! assert!(child.err().is_none());
//!
//! parent.cancel();
//! assert!(matches!(child.err(), Some(WorkflowError::Canceled)));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::WorkflowError;

#[derive(Debug, Default)]
struct Inner {
    canceled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

/// Cancellation token with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A context that is never done unless cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    fn child(&self, deadline: Option<Instant>) -> Self {
        // Keep the earliest deadline so `deadline()` stays O(1).
        let deadline = match (self.inner.deadline, deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            inner: Arc::new(Inner {
                canceled: AtomicBool::new(false),
                deadline,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Derive a context that can be cancelled on its own.
    pub fn with_cancel(&self) -> Self {
        self.child(None)
    }

    pub fn with_deadline(&self, deadline: Instant) -> Self {
        self.child(Some(deadline))
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        // An overflowing timeout is as good as no deadline.
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.with_cancel(),
        }
    }

    /// Cancel this context and everything derived from it.
    pub fn cancel(&self) {
        self.inner.canceled.store(true, Ordering::Release);
    }

    /// Earliest deadline along the chain.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Why the context is done, or `None` while it is still live.
    ///
    /// Cancellation anywhere in the chain takes precedence over an expired
    /// deadline.
    pub fn err(&self) -> Option<WorkflowError> {
        let mut current = Some(self);
        while let Some(ctx) = current {
            if ctx.inner.canceled.load(Ordering::Acquire) {
                return Some(WorkflowError::Canceled);
            }
            current = ctx.inner.parent.as_ref();
        }

        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(WorkflowError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }
}
