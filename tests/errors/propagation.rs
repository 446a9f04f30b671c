//! Failure propagation tests

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use taskdag::{Context, Executor, Task, TaskError, Workflow, WorkflowError, WorkflowResult};
use test_case::test_case;

use crate::common::{fail, init_tracing, record, slow, Capped, Counting, Inline, SpawnerCase, Threads, Trace};

#[test_case(Threads)]
#[test_case(Inline)]
#[test_case(Capped(1))]
#[test_case(Counting)]
fn test_descendants_of_failure_never_run(case: impl SpawnerCase) -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();

    let mut wf = Workflow::new();
    let bad = wf.add_task(fail("bad", &trace), &[])?;
    let child = wf.add_task(record("child", &trace), &[bad])?;
    wf.add_task(record("grandchild", &trace), &[child])?;
    let other = wf.add_task(record("other", &trace), &[])?;
    wf.add_task(record("join", &trace), &[bad, other])?;
    wf.auto_connect_to_end();

    let wf = Arc::new(wf);
    let err = case
        .executor()
        .run(&Context::background(), &wf)
        .unwrap_err();

    assert_eq!(err.task_name(), Some("bad"));
    assert_eq!(trace.count("child"), 0);
    assert_eq!(trace.count("grandchild"), 0);
    assert_eq!(trace.count("join"), 0);
    Ok(())
}

#[test]
fn test_error_keeps_source() -> WorkflowResult<()> {
    init_tracing();
    let mut wf = Workflow::new();
    wf.add_task(
        Task::from_fn(|| Err::<(), _>(std::io::Error::other("disk on fire"))).named("write"),
        &[],
    )?;
    wf.auto_connect_to_end();

    let wf = Arc::new(wf);
    let err = Executor::new()
        .run(&Context::background(), &wf)
        .unwrap_err();

    assert!(err.to_string().contains("write"));
    let source = err.source().expect("source error");
    assert_eq!(source.to_string(), "disk on fire");
    assert!(source.downcast_ref::<std::io::Error>().is_some());
    Ok(())
}

#[test]
fn test_only_one_of_concurrent_failures_is_kept() -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();

    let mut wf = Workflow::new();
    for i in 0..16 {
        wf.add_task(fail(&format!("f{i}"), &trace), &[])?;
    }
    wf.auto_connect_to_end();

    let wf = Arc::new(wf);
    let err = Executor::new()
        .run(&Context::background(), &wf)
        .unwrap_err();

    let name = err.task_name().expect("a task error").to_string();
    assert!(name.starts_with('f'));
    assert_eq!(
        wf.error().and_then(|e| e.task_name().map(String::from)),
        Some(name)
    );
    Ok(())
}

#[test]
fn test_failure_wins_over_slow_success() -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();

    let mut wf = Workflow::new();
    wf.add_task(slow("slow", Duration::from_millis(50), &trace), &[])?;
    wf.add_task(fail("fast_fail", &trace), &[])?;
    wf.auto_connect_to_end();

    let wf = Arc::new(wf);
    let err = Executor::new()
        .run(&Context::background(), &wf)
        .unwrap_err();

    assert_eq!(err.task_name(), Some("fast_fail"));
    Ok(())
}

#[test_case(Threads)]
#[test_case(Inline)]
fn test_panic_is_reported(case: impl SpawnerCase) -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();

    let mut wf = Workflow::new();
    let boom = wf.add_task(
        Task::from_fn(|| -> Result<(), TaskError> { panic!("index {} out of range", 7) })
            .named("boom"),
        &[],
    )?;
    wf.add_task(record("after", &trace), &[boom])?;
    wf.auto_connect_to_end();

    let wf = Arc::new(wf);
    let err = case
        .executor()
        .run(&Context::background(), &wf)
        .unwrap_err();

    match err {
        WorkflowError::TaskPanicked {
            task,
            panic_message,
        } => {
            assert_eq!(task, "boom");
            assert_eq!(panic_message, "index 7 out of range");
        }
        other => panic!("expected a panic error, got {other:?}"),
    }
    assert_eq!(trace.count("after"), 0);
    Ok(())
}

#[test]
fn test_panic_on_spawned_branch_still_finishes() -> WorkflowResult<()> {
    init_tracing();
    let trace = Trace::new();

    let mut wf = Workflow::new();
    wf.add_task(slow("slow", Duration::from_millis(20), &trace), &[])?;
    wf.add_task(
        Task::from_fn(|| -> Result<(), TaskError> { panic!("branch panic") }).named("boom"),
        &[],
    )?;
    wf.auto_connect_to_end();

    let wf = Arc::new(wf);
    Executor::new().execute(&Context::background(), &wf)?;

    assert!(wf.wait_done_timeout(Duration::from_secs(5)));
    assert!(matches!(wf.error(), Some(WorkflowError::TaskPanicked { .. })));
    Ok(())
}
