//! Error types for workflow construction and execution.
//!
//! A run ends with at most one terminal error: whichever branch records it
//! first. The same value is handed to every observer, so the type is `Clone`
//! and keeps task errors behind an `Arc`.

use std::error::Error;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

use crate::types::NodeId;

/// Error returned by a task body.
pub type TaskError = Box<dyn Error + Send + Sync + 'static>;

/// Errors that can occur during workflow construction and execution
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    /// A task body returned an error. [`Error::source`] yields that error.
    #[error("task `{task}` failed: {source}")]
    Task {
        task: String,
        #[source]
        source: TaskFailure,
    },

    /// A task body or one of its hooks panicked
    #[error("task `{task}` panicked during execution: {panic_message}")]
    TaskPanicked { task: String, panic_message: String },

    /// The execution context was cancelled
    #[error("context canceled")]
    Canceled,

    /// The execution context's deadline passed
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// `execute` was called on a workflow that has already been started
    #[error("workflow has already been executed")]
    AlreadyExecuted,

    /// Nothing is connected to the terminal anchor, so a run could never finish
    #[error("no node is connected to the terminal anchor; call auto_connect_to_end() first")]
    NotTerminated,

    /// A node id that does not belong to this workflow
    #[error("node {node} does not belong to this workflow")]
    UnknownNode { node: NodeId },

    /// The terminal anchor was listed as a dependency
    #[error("the terminal anchor cannot be a dependency")]
    TerminalDependency,
}

impl WorkflowError {
    pub(crate) fn task(task: &str, source: TaskError) -> Self {
        WorkflowError::Task {
            task: task.to_string(),
            source: TaskFailure(Arc::from(source)),
        }
    }

    /// True for the two errors a [`Context`](crate::Context) produces.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, WorkflowError::Canceled | WorkflowError::DeadlineExceeded)
    }

    /// Name of the task that failed or panicked, if the error came from a task.
    pub fn task_name(&self) -> Option<&str> {
        match self {
            WorkflowError::Task { task, .. } | WorkflowError::TaskPanicked { task, .. } => {
                Some(task)
            }
            _ => None,
        }
    }
}

/// A task's error, shared between every clone of the terminal error.
///
/// Dereferences to the task's own error. It must not implement [`Error`]
/// itself: [`Error::source`] on [`WorkflowError::Task`] resolves through the
/// deref, so it returns the task's error and downcasts to its concrete type.
#[derive(Debug, Clone)]
pub struct TaskFailure(Arc<dyn Error + Send + Sync + 'static>);

impl Deref for TaskFailure {
    type Target = dyn Error + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
