//! # Fan-out and Fan-in
//!
//! One task fans out to several workers on their own threads, and a single
//! join collects their results. Hooks log around every worker.
//!
//! ## Running This Example
//! ```bash
//! cargo run --example fan_in
//! cargo run --example fan_in --features tracing   # with RUST_LOG=taskdag=trace
//! ```
//!
//! ## Workflow Diagram
//! ```text
//!            ┌─► worker-0 ─┐
//! fetch ─────┼─► worker-1 ─┼───► report
//!            └─► worker-2 ─┘
//! ```

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use taskdag::{
    Context, Executor, NodeId, Task, TaskError, ThreadSpawner, Workflow, WorkflowResult,
};

fn main() -> WorkflowResult<()> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let input = Arc::new(Mutex::new(Vec::<u64>::new()));
    let results = Arc::new(Mutex::new(Vec::<(usize, u64)>::new()));
    let mut wf = Workflow::new();

    let sink = Arc::clone(&input);
    let fetch = wf.add_task(
        Task::from_fn(move || {
            sink.lock().extend(1..=30);
            Ok::<(), TaskError>(())
        })
        .named("fetch"),
        &[],
    )?;

    let workers: Vec<NodeId> = (0..3)
        .map(|i| {
            let (input, results) = (Arc::clone(&input), Arc::clone(&results));
            let task = Task::from_fn(move || {
                let chunk: u64 = input.lock().iter().skip(i * 10).take(10).sum();
                thread::sleep(Duration::from_millis(20));
                results.lock().push((i, chunk));
                Ok::<(), TaskError>(())
            })
            .named(format!("worker-{i}"))
            .before(|t| {
                let current = thread::current();
                println!("{} starting on {}", t.name(), current.name().unwrap_or("?"));
            })
            .after(|t| println!("{} done", t.name()));
            wf.add_task(task, &[fetch])
        })
        .collect::<WorkflowResult<_>>()?;

    let collected = Arc::clone(&results);
    wf.add_task(
        Task::from_fn(move || {
            let mut parts = collected.lock().clone();
            parts.sort();
            let total: u64 = parts.iter().map(|(_, v)| v).sum();
            println!("partial sums {parts:?}, total {total}");
            Ok::<(), TaskError>(())
        })
        .named("report"),
        &workers,
    )?;

    wf.auto_connect_to_end();

    let executor = Executor::with_spawner(ThreadSpawner::new().name_prefix("worker"));
    let wf = Arc::new(wf);
    executor.run(&Context::background(), &wf)?;

    let total: u64 = results.lock().iter().map(|(_, v)| v).sum();
    assert_eq!(total, (1..=30).sum::<u64>());
    Ok(())
}
