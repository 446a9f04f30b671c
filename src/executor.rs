//! Workflow execution engine.
//!
//! The engine walks the graph from the root. At every node it:
//!
//! 1. records the arrival and returns unless the node is ready: nodes with
//!    at most one dependency always are, a join is ready for the last
//!    arrival only,
//! 2. returns if the run is already done, or finishes it with the context's
//!    error if the context is done,
//! 3. runs the node: a task (errors and panics finish the run and stop this
//!    branch), nothing for the root anchor, success for the terminal anchor,
//! 4. hands every child but the first to the spawner and continues with the
//!    first child on the current thread.
//!
//! The terminal anchor, a task failure and a cancellation are the only ways a
//! run ends. Whichever gets there first wins; the others are no-ops.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::{debug, error, info, trace};

use crate::context::Context;
use crate::error::{WorkflowError, WorkflowResult};
use crate::node::{Node, NodeKind};
use crate::spawn::{InlineSpawner, Spawn, ThreadSpawner};
use crate::task::Task;
use crate::types::NodeId;
use crate::workflow::Workflow;

/// Runs workflows, spawning concurrent branches through `S`.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
/// use taskdag::{Context, Executor, Task, TaskError, Workflow};
///
/// let total = Arc::new(AtomicI32::new(0));
/// let mut wf = Workflow::new();
///
/// let t = Arc::clone(&total);
/// let add1 = wf.add_task(Task::from_fn(move || {
///     t.fetch_add(1, Ordering::SeqCst);
///     Ok::<(), TaskError>(())
/// }), &[])?;
/// let t = Arc::clone(&total);
/// let add2 = wf.add_task(Task::from_fn(move || {
///     t.fetch_add(2, Ordering::SeqCst);
///     Ok::<(), TaskError>(())
/// }), &[])?;
/// let t = Arc::clone(&total);
/// wf.add_task(Task::from_fn(move || {
///     let v = t.load(Ordering::SeqCst);
///     t.store(v * 4, Ordering::SeqCst);
///     Ok::<(), TaskError>(())
/// }), &[add1, add2])?;
/// wf.auto_connect_to_end();
///
/// let wf = Arc::new(wf);
/// Executor::new().run(&Context::background(), &wf)?;
/// assert_eq!(total.load(Ordering::SeqCst), 12);
/// # Ok::<(), taskdag::WorkflowError>(())
/// ```
#[derive(Debug)]
pub struct Executor<S = ThreadSpawner> {
    spawner: Arc<S>,
}

impl Default for Executor<ThreadSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor<ThreadSpawner> {
    /// One OS thread per extra branch, unbounded.
    pub fn new() -> Self {
        Self::with_spawner(ThreadSpawner::new())
    }
}

impl Executor<InlineSpawner> {
    /// Every branch on the calling thread. `execute` returns only once the
    /// whole walk is over.
    pub fn inline() -> Self {
        Self::with_spawner(InlineSpawner)
    }
}

impl<S: Spawn> Executor<S> {
    pub fn with_spawner(spawner: S) -> Self {
        Self {
            spawner: Arc::new(spawner),
        }
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Start a run and walk the first line of control on the calling thread.
    ///
    /// Returns once that line ends; other branches may still be running. Use
    /// [`Workflow::wait_done`] or [`Workflow::done`] to wait for the outcome.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::AlreadyExecuted`] if the workflow was started before.
    /// - [`WorkflowError::NotTerminated`] if nothing leads to the terminal
    ///   anchor, since such a run could never finish. The workflow stays
    ///   unstarted.
    ///
    /// Task failures and cancellation are not returned here; they become the
    /// workflow's terminal [`error`](Workflow::error).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn execute(&self, ctx: &Context, workflow: &Arc<Workflow>) -> WorkflowResult<()> {
        if workflow.node(workflow.end()).map_or(0, |n| n.dependencies.len()) == 0 {
            #[cfg(feature = "tracing")]
            error!("terminal anchor has no dependencies, refusing to run");
            return Err(WorkflowError::NotTerminated);
        }

        if !workflow.start() {
            #[cfg(feature = "tracing")]
            error!("workflow has already been executed");
            return Err(WorkflowError::AlreadyExecuted);
        }

        #[cfg(feature = "tracing")]
        info!(
            tasks = workflow.len(),
            edges = workflow.edges().len(),
            "starting workflow execution"
        );

        visit(&self.spawner, ctx, workflow, workflow.root());
        Ok(())
    }

    /// Execute, wait for the outcome, and return the terminal error as `Err`.
    pub fn run(&self, ctx: &Context, workflow: &Arc<Workflow>) -> WorkflowResult<()> {
        self.execute(ctx, workflow)?;
        workflow.wait_done();
        match workflow.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// End the run with `error` if nobody else has ended it yet.
fn finish(workflow: &Workflow, error: Option<WorkflowError>) {
    #[cfg(feature = "tracing")]
    let failed = error.clone();

    if workflow.outcome.finish(error) {
        #[cfg(feature = "tracing")]
        match failed {
            Some(err) => error!(%err, "workflow execution failed"),
            None => info!("workflow execution completed successfully"),
        }
    }
}

fn visit<S: Spawn>(spawner: &Arc<S>, ctx: &Context, workflow: &Arc<Workflow>, start: NodeId) {
    let mut id = start;
    loop {
        let node = &workflow.nodes[id.0];

        if !node.dependency_satisfied() {
            #[cfg(feature = "tracing")]
            trace!(
                node_id = id.0,
                arrived = node.completed_dependencies(),
                expected = node.dependencies.len(),
                "join not ready yet"
            );
            return;
        }

        if workflow.is_done() {
            return;
        }

        if let Some(err) = ctx.err() {
            #[cfg(feature = "tracing")]
            debug!(node_id = id.0, %err, "context done, stopping");
            finish(workflow, Some(err));
            return;
        }

        if !run_node(workflow, id, node) {
            return;
        }

        let Some((first, rest)) = node.children.split_first() else {
            return;
        };

        for &edge in rest {
            let child = workflow.edges[edge.0].to;

            #[cfg(feature = "tracing")]
            trace!(node_id = id.0, child_id = child.0, "spawning branch");

            let branch_spawner = Arc::clone(spawner);
            let branch_ctx = ctx.clone();
            let branch_workflow = Arc::clone(workflow);
            spawner.spawn(Box::new(move || {
                visit(&branch_spawner, &branch_ctx, &branch_workflow, child);
            }));
        }

        id = workflow.edges[first.0].to;
    }
}

/// Returns `false` if the branch must stop here.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn run_node(workflow: &Workflow, id: NodeId, node: &Node) -> bool {
    match &node.kind {
        NodeKind::Anchor => true,
        NodeKind::Terminal => {
            finish(workflow, None);
            true
        }
        NodeKind::Task(task) => {
            #[cfg(feature = "tracing")]
            trace!(node_id = id.0, task = task.name(), "running task");

            match run_task(task) {
                Ok(()) => true,
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    error!(node_id = id.0, task = task.name(), %err, "task failed");

                    finish(workflow, Some(err));
                    false
                }
            }
        }
    }
}

fn run_task(task: &Task) -> WorkflowResult<()> {
    catch_unwind(AssertUnwindSafe(|| task.run())).unwrap_or_else(|payload| {
        let panic_message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Err(WorkflowError::TaskPanicked {
            task: task.name().to_string(),
            panic_message,
        })
    })
}
