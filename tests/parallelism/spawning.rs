//! Spawner behaviour tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use taskdag::{Context, Executor, Job, NodeId, Task, TaskError, ThreadSpawner, Workflow, WorkflowResult};

use crate::common::{init_tracing, record, Trace};

fn thread_name_task(name: &str, seen: &Arc<Mutex<Vec<String>>>) -> Task {
    let seen = Arc::clone(seen);
    Task::from_fn(move || {
        let current = thread::current();
        seen.lock().push(current.name().unwrap_or("").to_string());
        Ok::<(), TaskError>(())
    })
    .named(name)
}

#[test]
fn test_first_child_stays_on_caller() -> WorkflowResult<()> {
    init_tracing();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut wf = Workflow::new();
    let a = wf.add_task(thread_name_task("a", &seen), &[])?;
    wf.add_task(thread_name_task("a_child", &seen), &[a])?;
    wf.auto_connect_to_end();
    let wf = Arc::new(wf);

    let caller = thread::Builder::new()
        .name("caller".into())
        .spawn(move || Executor::new().run(&Context::background(), &wf))
        .unwrap();
    caller.join().unwrap()?;

    assert_eq!(*seen.lock(), ["caller", "caller"]);
    Ok(())
}

#[test]
fn test_extra_children_get_named_threads() -> WorkflowResult<()> {
    init_tracing();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut wf = Workflow::new();
    for i in 0..3 {
        wf.add_task(thread_name_task(&format!("t{i}"), &seen), &[])?;
    }
    wf.auto_connect_to_end();
    let wf = Arc::new(wf);

    let executor = Executor::with_spawner(ThreadSpawner::new().name_prefix("branch"));
    executor.run(&Context::background(), &wf)?;

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.iter().filter(|n| n.starts_with("branch-")).count(), 2);
    Ok(())
}

#[test]
fn test_thread_cap_is_respected() -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();
    let executor = Arc::new(Executor::with_spawner(
        ThreadSpawner::new().max_threads(2),
    ));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut wf = Workflow::new();
    let deps: Vec<NodeId> = (0..12)
        .map(|i| {
            let (executor, peak, trace) = (Arc::clone(&executor), Arc::clone(&peak), trace.clone());
            wf.add_task(
                Task::from_fn(move || {
                    peak.fetch_max(executor.spawner().active_threads(), Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    trace.push(format!("t{i}"));
                    Ok::<(), TaskError>(())
                }),
                &[],
            )
        })
        .collect::<WorkflowResult<_>>()?;
    wf.add_task(record("join", &trace), &deps)?;
    wf.auto_connect_to_end();
    let wf = Arc::new(wf);

    executor.run(&Context::background(), &wf)?;

    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(trace.count("join"), 1);
    assert_eq!(trace.len(), 13);
    Ok(())
}

#[test]
fn test_custom_pool_spawner() -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();
    let jobs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&jobs);
    let executor = Executor::with_spawner(move |job: Job| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::spawn(job);
    });

    let mut wf = Workflow::new();
    let a = wf.add_task(record("a", &trace), &[])?;
    let b = wf.add_task(record("b", &trace), &[])?;
    let c = wf.add_task(record("c", &trace), &[])?;
    wf.add_task(record("join", &trace), &[a, b, c])?;
    wf.auto_connect_to_end();
    let wf = Arc::new(wf);

    executor.run(&Context::background(), &wf)?;

    assert_eq!(jobs.load(Ordering::SeqCst), 2);
    assert_eq!(trace.count("join"), 1);
    Ok(())
}
