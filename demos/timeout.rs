//! # Deadlines and Cancellation
//!
//! A run is started under a context with a deadline. The slow branch is not
//! interrupted, but once the deadline passes no further node starts and the
//! run ends with `DeadlineExceeded`.
//!
//! ## Running This Example
//! ```bash
//! cargo run --example timeout
//! ```
//!
//! ## Workflow Diagram
//! ```text
//! ┌──────────┐
//! │  quick   │ ─┐
//! └──────────┘  │   ┌──────────┐
//!               ├─► │ combine  │  (never runs)
//! ┌──────────┐  │   └──────────┘
//! │  slow    │ ─┘
//! │ (100ms)  │
//! └──────────┘
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use taskdag::{Context, Executor, Task, TaskError, Workflow, WorkflowError, WorkflowResult};

fn build() -> WorkflowResult<Workflow> {
    let mut wf = Workflow::new();
    let quick = wf.add_task(
        Task::from_fn(|| {
            println!("quick: done");
            Ok::<(), TaskError>(())
        })
        .named("quick"),
        &[],
    )?;
    let slow = wf.add_task(
        Task::from_fn(|| {
            thread::sleep(Duration::from_millis(100));
            println!("slow: done (result discarded)");
            Ok::<(), TaskError>(())
        })
        .named("slow"),
        &[],
    )?;
    wf.add_task(
        Task::from_fn(|| {
            println!("combine: done");
            Ok::<(), TaskError>(())
        })
        .named("combine"),
        &[quick, slow],
    )?;
    wf.auto_connect_to_end();
    Ok(wf)
}

fn main() -> WorkflowResult<()> {
    let executor = Executor::new();

    // 1. Deadline shorter than the slow branch
    let wf = Arc::new(build()?);
    let ctx = Context::background().with_timeout(Duration::from_millis(50));
    let start = Instant::now();
    match executor.run(&ctx, &wf) {
        Err(WorkflowError::DeadlineExceeded) => {
            println!("deadline exceeded after {:?}", start.elapsed())
        }
        other => println!("unexpected outcome: {other:?}"),
    }

    // 2. Generous deadline
    let wf = Arc::new(build()?);
    let ctx = Context::background().with_timeout(Duration::from_secs(1));
    executor.run(&ctx, &wf)?;
    println!("completed within the deadline");

    // 3. Cancelled from another thread while waiting
    let wf = Arc::new(build()?);
    let ctx = Context::background().with_cancel();
    let canceller = ctx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        canceller.cancel();
    });
    executor.execute(&ctx, &wf)?;
    println!("awaiting the run: {:?}", futures::executor::block_on(wf.done()));

    Ok(())
}
