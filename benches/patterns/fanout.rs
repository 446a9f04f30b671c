//! Fan-out benchmarks (one source, many dependents, one join)

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use taskdag::{Context, Executor, NodeId, Task, TaskError, ThreadSpawner, Workflow};

fn fanout(width: usize) -> Arc<Workflow> {
    let mut wf = Workflow::new();
    let source = wf
        .add_task(Task::from_fn(|| Ok::<(), TaskError>(())), &[])
        .unwrap();
    let branches: Vec<NodeId> = (0..width)
        .map(|_| {
            wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())), &[source])
                .unwrap()
        })
        .collect();
    wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())), &branches)
        .unwrap();
    wf.auto_connect_to_end();
    Arc::new(wf)
}

pub fn bench_fanout(c: &mut Criterion) {
    let ctx = Context::background();
    let unbounded = Executor::new();
    let capped = Executor::with_spawner(ThreadSpawner::new().max_threads(8));

    let mut group = c.benchmark_group("fanout");
    for width in [10usize, 100] {
        group.bench_with_input(BenchmarkId::new("unbounded", width), &width, |b, &w| {
            b.iter_with_setup(|| fanout(w), |wf| unbounded.run(&ctx, &wf).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("capped_8", width), &width, |b, &w| {
            b.iter_with_setup(|| fanout(w), |wf| capped.run(&ctx, &wf).unwrap());
        });
    }
    group.finish();
}
