//! One-shot completion latch.
//!
//! The outcome of a run is written exactly once. [`OnceLock::set`] makes the
//! "record error" and "mark done" pair a single atomic step: only the first
//! caller of [`Outcome::finish`] wins, and its error (if any) is the one every
//! observer sees.
//!
//! The mutex never guards the outcome itself. It only parks blocking waiters
//! and holds the wakers of pending [`Done`] futures.

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;
use std::task::{Context as TaskContext, Poll, Waker};
use std::time::{Duration, Instant};

use futures::future::FusedFuture;
use parking_lot::{Condvar, Mutex};

use crate::error::WorkflowError;

#[derive(Debug, Default)]
pub(crate) struct Outcome {
    state: OnceLock<Option<WorkflowError>>,
    waiters: Mutex<Vec<Waker>>,
    signal: Condvar,
}

impl Outcome {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Transition from running to done. Returns `true` for the winning caller.
    pub(crate) fn finish(&self, error: Option<WorkflowError>) -> bool {
        if self.state.set(error).is_err() {
            return false;
        }

        let wakers = {
            let mut waiters = self.waiters.lock();
            self.signal.notify_all();
            std::mem::take(&mut *waiters)
        };
        for waker in wakers {
            waker.wake();
        }
        true
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state.get().is_some()
    }

    pub(crate) fn error(&self) -> Option<WorkflowError> {
        self.state.get().cloned().flatten()
    }

    pub(crate) fn wait(&self) {
        let mut waiters = self.waiters.lock();
        while !self.is_done() {
            self.signal.wait(&mut waiters);
        }
    }

    /// Returns `true` if the outcome was reached before the timeout.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };

        let mut waiters = self.waiters.lock();
        while !self.is_done() {
            if self.signal.wait_until(&mut waiters, deadline).timed_out() {
                return self.is_done();
            }
        }
        true
    }

    pub(crate) fn done(&self) -> Done<'_> {
        Done {
            outcome: self,
            finished: false,
        }
    }
}

/// Future resolving to the terminal error (or `None`) once the workflow is
/// done.
///
/// Returned by [`Workflow::done`](crate::Workflow::done).
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Done<'a> {
    outcome: &'a Outcome,
    finished: bool,
}

impl Future for Done<'_> {
    type Output = Option<WorkflowError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let outcome = self.outcome;
        if let Some(state) = outcome.state.get() {
            self.finished = true;
            return Poll::Ready(state.clone());
        }

        let mut waiters = outcome.waiters.lock();
        // Re-check under the lock: `finish` drains the wakers while holding it.
        if let Some(state) = outcome.state.get() {
            drop(waiters);
            self.finished = true;
            return Poll::Ready(state.clone());
        }
        if !waiters.iter().any(|w| w.will_wake(cx.waker())) {
            waiters.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

impl FusedFuture for Done<'_> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}
