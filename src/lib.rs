//! In-process Task Graph Executor
//!
//! A lightweight executor for directed acyclic graphs of blocking, fallible
//! tasks. Build a [`Workflow`], declare dependencies, and run it once: independent
//! branches run concurrently, joins run exactly once after their last
//! dependency, the first error wins, and an external [`Context`] can cancel the
//! rest of the run.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use taskdag::{Context, Executor, Task, TaskError, Workflow};
//!
//! let mut wf = Workflow::new();
//!
//! let a = wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("a"), &[])?;
//! let b = wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("b"), &[])?;
//! wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("join"), &[a, b])?;
//! wf.auto_connect_to_end();
//!
//! let wf = Arc::new(wf);
//! Executor::new().execute(&Context::background(), &wf)?;
//! wf.wait_done();
//! assert!(wf.error().is_none());
//! # Ok::<(), taskdag::WorkflowError>(())
//! ```
//!
//! # Core Concepts
//!
//! ## Task
//!
//! A [`Task`] is a named, fallible, zero-argument unit of work with optional
//! `before` and `after` hooks. Wrap a closure with [`Task::from_fn`] or
//! implement [`Execute`] for your own type.
//!
//! ## Workflow
//!
//! A [`Workflow`] owns the graph. Two anchors are created with it:
//!
//! - the **root**: every task added without dependencies hangs off it;
//! - the **terminal anchor** (`end`): reaching it finishes the run.
//!
//! [`Workflow::auto_connect_to_end`] connects every leaf to the terminal
//! anchor once the graph is assembled.
//!
//! ## Executor
//!
//! [`Executor::execute`] walks the graph from the root on the calling thread.
//! For every node with more than one child, all children but the first are
//! handed to a [`Spawn`] implementation (a new OS thread by default) and the
//! first is visited on the current thread.
//!
//! A node with zero or one dependency runs as soon as it is reached. A join
//! (two or more dependencies) counts arrivals atomically and runs only for the
//! last one, so it runs exactly once no matter how the branches race.
//!
//! ## Completion
//!
//! A run ends through exactly one of:
//!
//! 1. the terminal anchor being reached (success),
//! 2. a task returning an error or panicking,
//! 3. the [`Context`] being cancelled or passing its deadline, observed before
//!    a node runs.
//!
//! Only the first of these is recorded. [`Workflow::wait_done`] blocks until
//! then, [`Workflow::done`] is the awaitable equivalent, and
//! [`Workflow::error`] returns the recorded error. Branches already running
//! when the run ends are not interrupted; they stop at their next node.
//!
//! # Cancellation
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use taskdag::{Context, Executor, Task, TaskError, Workflow, WorkflowError};
//!
//! let mut wf = Workflow::new();
//! wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())), &[])?;
//! wf.auto_connect_to_end();
//! let wf = Arc::new(wf);
//!
//! let ctx = Context::background().with_timeout(Duration::ZERO);
//! let result = Executor::new().run(&ctx, &wf);
//! assert!(matches!(result, Err(WorkflowError::DeadlineExceeded)));
//! # Ok::<(), taskdag::WorkflowError>(())
//! ```
//!
//! # Diagnostics
//!
//! [`Workflow::check_dag`] walks the graph breadth-first without running
//! anything and reports whether every edge is reachable in dependency order.
//! [`Workflow::check_dag_with`] also visits each node in topological order.
//!
//! # Optional Tracing Support
//!
//! Enable the `tracing` feature to get instrumentation through the `tracing`
//! crate. Without it, no logging code is compiled in.
//!
//! ```toml
//! [dependencies]
//! taskdag = { version = "0.1", features = ["tracing"] }
//! tracing-subscriber = "0.3"
//! ```
//!
//! - **INFO**: run start and outcome
//! - **DEBUG**: task insertion, auto-connect, graph checks, cancellation
//! - **TRACE**: node visits, join arrivals, spawned branches
//! - **WARN**: a branch thread could not be spawned and ran inline
//! - **ERROR**: task failures and misuse of the executor
//!
//! ```bash
//! RUST_LOG=taskdag=debug cargo run
//! ```

mod context;
mod error;
mod executor;
mod node;
mod outcome;
mod spawn;
mod task;
mod traversal;
mod types;
mod workflow;

pub use context::Context;
pub use error::{TaskError, TaskFailure, WorkflowError, WorkflowResult};
pub use executor::Executor;
pub use node::{Edge, Node, NodeKind};
pub use outcome::Done;
pub use spawn::{InlineSpawner, Job, Spawn, ThreadSpawner};
pub use task::{task_fn, Execute, Task, TaskFn};
pub use types::{EdgeId, NodeId};
pub use workflow::Workflow;
