//! # Getting Started: Your First Workflow
//!
//! Builds the smallest interesting workflow: two independent tasks, a join
//! that waits for both, and a final task that reports the result.
//!
//! ## Running This Example
//! ```bash
//! cargo run --example basic
//! ```
//!
//! ## Expected Output
//! ```text
//! add 1 -> 1
//! add 2 -> 3
//! multiply by 4 -> 12
//! result: 12
//! ```
//!
//! The first two lines may appear in either order.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use taskdag::{Context, Executor, Task, TaskError, Workflow, WorkflowResult};

fn main() -> WorkflowResult<()> {
    let counter = Arc::new(AtomicI32::new(0));
    let mut wf = Workflow::new();

    // Tasks without dependencies start as soon as the run does
    let c = Arc::clone(&counter);
    let add1 = wf.add_task(
        Task::from_fn(move || {
            println!("add 1 -> {}", c.fetch_add(1, Ordering::SeqCst) + 1);
            Ok::<(), TaskError>(())
        })
        .named("add1"),
        &[],
    )?;

    let c = Arc::clone(&counter);
    let add2 = wf.add_task(
        Task::from_fn(move || {
            println!("add 2 -> {}", c.fetch_add(2, Ordering::SeqCst) + 2);
            Ok::<(), TaskError>(())
        })
        .named("add2"),
        &[],
    )?;

    // A join: runs once, after both additions
    let c = Arc::clone(&counter);
    let multiply = wf.add_task(
        Task::from_fn(move || {
            let v = c.load(Ordering::SeqCst) * 4;
            c.store(v, Ordering::SeqCst);
            println!("multiply by 4 -> {v}");
            Ok::<(), TaskError>(())
        })
        .named("multiply"),
        &[add1, add2],
    )?;

    let c = Arc::clone(&counter);
    wf.add_task(
        Task::from_fn(move || {
            println!("result: {}", c.load(Ordering::SeqCst));
            Ok::<(), TaskError>(())
        })
        .named("print"),
        &[multiply],
    )?;

    wf.auto_connect_to_end();
    assert!(wf.check_dag());

    let wf = Arc::new(wf);
    Executor::new().run(&Context::background(), &wf)?;

    assert_eq!(counter.load(Ordering::SeqCst), 12);
    Ok(())
}
