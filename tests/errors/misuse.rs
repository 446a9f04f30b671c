//! Misuse of the workflow and executor API

use std::sync::Arc;

use taskdag::{Context, Executor, Workflow, WorkflowError, WorkflowResult};

use crate::common::{init_tracing, noop};

#[test]
fn test_second_execute_is_rejected() -> WorkflowResult<()> {
    init_tracing();
    let mut wf = Workflow::new();
    wf.add_task(noop("a"), &[])?;
    wf.auto_connect_to_end();
    let wf = Arc::new(wf);

    let executor = Executor::new();
    executor.run(&Context::background(), &wf)?;

    let err = executor.run(&Context::background(), &wf).unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyExecuted));
    // The first outcome is untouched
    assert!(wf.error().is_none());
    Ok(())
}

#[test]
fn test_other_executor_cannot_rerun() -> WorkflowResult<()> {
    init_tracing();
    let mut wf = Workflow::new();
    wf.add_task(noop("a"), &[])?;
    wf.auto_connect_to_end();
    let wf = Arc::new(wf);

    Executor::new().run(&Context::background(), &wf)?;
    let err = Executor::inline()
        .execute(&Context::background(), &wf)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyExecuted));
    Ok(())
}

#[test]
fn test_missing_terminal_connection() -> WorkflowResult<()> {
    init_tracing();
    let mut wf = Workflow::new();
    wf.add_task(noop("a"), &[])?;
    let wf = Arc::new(wf);

    let err = Executor::new()
        .execute(&Context::background(), &wf)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotTerminated));
    assert!(!wf.is_started());
    Ok(())
}

#[test]
fn test_unknown_dependency() {
    let mut wf = Workflow::new();
    let mut other = Workflow::new();
    let foreign = other.add_task(noop("x"), &[]).unwrap();

    let err = wf.add_task(noop("a"), &[foreign]).unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownNode { node } if node == foreign));
    assert_eq!(wf.len(), 0);
}

#[test]
fn test_terminal_cannot_be_a_dependency() {
    let mut wf = Workflow::new();
    let end = wf.end();

    assert!(matches!(
        wf.add_task(noop("a"), &[end]),
        Err(WorkflowError::TerminalDependency)
    ));
    assert!(matches!(
        wf.connect_to_end(end),
        Err(WorkflowError::TerminalDependency)
    ));
}
