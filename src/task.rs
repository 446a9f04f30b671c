//! Task type and closure adaptation.
//!
//! A [`Task`] wraps something that implements [`Execute`] together with a name
//! and two optional hooks. Closures returning `Result<(), E>` are adapted with
//! [`task_fn`] or [`Task::from_fn`].

use std::fmt;

use crate::error::{TaskError, WorkflowError, WorkflowResult};

/// A fallible zero-argument unit of work.
///
/// Implement this for types that carry their own state; for one-off work a
/// closure passed to [`Task::from_fn`] is usually enough.
///
/// ```
/// use taskdag::{Execute, Task, TaskError};
///
/// struct Flush;
///
/// impl Execute for Flush {
///     fn execute(&self) -> Result<(), TaskError> {
///         Ok(())
///     }
/// }
///
/// let task = Task::new(Flush).named("flush");
/// assert_eq!(task.name(), "flush");
/// ```
pub trait Execute: Send + Sync {
    fn execute(&self) -> Result<(), TaskError>;
}

/// Adapter turning a closure into an [`Execute`] implementation.
pub struct TaskFn<F> {
    f: F,
}

impl<F, E> Execute for TaskFn<F>
where
    F: Fn() -> Result<(), E> + Send + Sync,
    E: Into<TaskError>,
{
    fn execute(&self) -> Result<(), TaskError> {
        (self.f)().map_err(Into::into)
    }
}

/// Wrap a closure so it can be used as a task body.
pub fn task_fn<F, E>(f: F) -> TaskFn<F>
where
    F: Fn() -> Result<(), E> + Send + Sync + 'static,
    E: Into<TaskError>,
{
    TaskFn { f }
}

type Hook = Box<dyn Fn(&Task) + Send + Sync>;

/// A named unit of work with optional before/after hooks.
///
/// `before` runs immediately before the body. `after` runs immediately after a
/// successful body and is skipped when the body fails. Hooks have no error
/// channel; a panicking hook is reported like a panicking body.
pub struct Task {
    name: String,
    body: Box<dyn Execute>,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl Task {
    pub fn new<Ex>(body: Ex) -> Self
    where
        Ex: Execute + 'static,
    {
        Self {
            name: String::new(),
            body: Box::new(body),
            before: None,
            after: None,
        }
    }

    /// Create a task from a closure.
    ///
    /// ```
    /// use taskdag::Task;
    ///
    /// let task = Task::from_fn(|| Ok::<(), std::io::Error>(())).named("noop");
    /// assert!(task.run().is_ok());
    /// ```
    pub fn from_fn<F, E>(f: F) -> Self
    where
        F: Fn() -> Result<(), E> + Send + Sync + 'static,
        E: Into<TaskError>,
    {
        Self::new(task_fn(f))
    }

    /// Set the informational name. Names need not be unique.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn before<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Task) + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn after<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Task) + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the hooks and the body once.
    pub fn run(&self) -> WorkflowResult<()> {
        if let Some(before) = &self.before {
            before(self);
        }

        self.body
            .execute()
            .map_err(|err| WorkflowError::task(&self.name, err))?;

        if let Some(after) = &self.after {
            after(self);
        }
        Ok(())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish_non_exhaustive()
    }
}
