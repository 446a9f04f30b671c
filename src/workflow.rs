//! The workflow graph.
//!
//! A [`Workflow`] owns every node and edge, a synthetic root anchor that all
//! dependency-free tasks hang off, a synthetic terminal anchor whose visit ends
//! the run, and the run's [`Outcome`].
//!
//! Construction goes through `&mut self`. Execution goes through
//! `Arc<Workflow>`, so nothing can be inserted once a run has started.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::error::{WorkflowError, WorkflowResult};
use crate::node::{connect, Edge, Node, NodeKind};
use crate::outcome::{Done, Outcome};
use crate::task::Task;
use crate::types::{EdgeId, NodeId};

const ROOT: NodeId = NodeId(0);
const END: NodeId = NodeId(1);

/// A directed acyclic graph of tasks, executed at most once.
///
/// ```
/// use std::sync::Arc;
/// use taskdag::{Context, Executor, Task, TaskError, Workflow};
///
/// let mut wf = Workflow::new();
/// let fetch = wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("fetch"), &[])?;
/// let parse = wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("parse"), &[fetch])?;
/// wf.auto_connect_to_end();
/// assert!(wf.check_dag());
///
/// let wf = Arc::new(wf);
/// Executor::new().run(&Context::background(), &wf)?;
/// assert!(wf.error().is_none());
/// # let _ = parse;
/// # Ok::<(), taskdag::WorkflowError>(())
/// ```
#[derive(Debug)]
pub struct Workflow {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) outcome: Outcome,
    started: AtomicBool,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Anchor), Node::new(NodeKind::Terminal)],
            edges: Vec::new(),
            outcome: Outcome::new(),
            started: AtomicBool::new(false),
        }
    }

    /// The root anchor every dependency-free task is attached to.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// The terminal anchor. Reaching it finishes the run.
    pub fn end(&self) -> NodeId {
        END
    }

    fn check_node(&self, node: NodeId) -> WorkflowResult<()> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(WorkflowError::UnknownNode { node })
        }
    }

    pub(crate) fn connect(&mut self, from: NodeId, to: NodeId) -> EdgeId {
        connect(&mut self.nodes, &mut self.edges, from, to)
    }

    /// Add a task that runs after all of `deps`.
    ///
    /// With no dependencies the task is attached to the root and starts as
    /// soon as the run does. Each listed dependency adds one edge.
    pub fn add_task(&mut self, task: Task, deps: &[NodeId]) -> WorkflowResult<NodeId> {
        for &dep in deps {
            self.check_node(dep)?;
            if dep == END {
                return Err(WorkflowError::TerminalDependency);
            }
        }

        let id = NodeId(self.nodes.len());

        #[cfg(feature = "tracing")]
        debug!(
            node_id = id.0,
            task = task.name(),
            dependency_ids = ?deps.iter().map(|d| d.0).collect::<Vec<_>>(),
            "adding task to workflow"
        );

        self.nodes.push(Node::new(NodeKind::Task(task)));

        if deps.is_empty() {
            self.connect(ROOT, id);
        }
        for &dep in deps {
            self.connect(dep, id);
        }
        Ok(id)
    }

    /// Connect one node to the terminal anchor.
    pub fn connect_to_end(&mut self, node: NodeId) -> WorkflowResult<EdgeId> {
        self.check_node(node)?;
        if node == END {
            return Err(WorkflowError::TerminalDependency);
        }
        Ok(self.connect(node, END))
    }

    /// Connect every current leaf to the terminal anchor.
    ///
    /// Leaves are nodes reached by some edge that have no children yet, in
    /// edge order. Nodes that already lead somewhere are left alone, so a
    /// second call adds nothing. If no task has been added, the root itself
    /// is connected so the run can still finish. Returns the number of edges
    /// added.
    pub fn auto_connect_to_end(&mut self) -> usize {
        let mut seen = HashSet::new();
        let leaves: Vec<NodeId> = self
            .edges
            .iter()
            .map(|edge| edge.to)
            .filter(|&to| to != END && self.nodes[to.0].children.is_empty())
            .filter(|&to| seen.insert(to))
            .collect();

        for &leaf in &leaves {
            self.connect(leaf, END);
        }

        let mut added = leaves.len();
        if self.nodes[ROOT.0].children.is_empty() {
            self.connect(ROOT, END);
            added += 1;
        }

        #[cfg(feature = "tracing")]
        debug!(
            leaf_ids = ?leaves.iter().map(|l| l.0).collect::<Vec<_>>(),
            edges_added = added,
            "connected leaves to terminal anchor"
        );

        added
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// All nodes with their ids, anchors included.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of task nodes, anchors excluded.
    pub fn len(&self) -> usize {
        self.nodes.len() - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claim the single run. Returns `false` if already claimed.
    pub(crate) fn start(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// True once the run has finished through any path.
    pub fn is_done(&self) -> bool {
        self.outcome.is_done()
    }

    /// The terminal error, if the run ended with one.
    pub fn error(&self) -> Option<WorkflowError> {
        self.outcome.error()
    }

    /// Block until the run is done.
    ///
    /// Returns immediately if it already is. Never returns for a workflow that
    /// is not executed.
    pub fn wait_done(&self) {
        self.outcome.wait()
    }

    /// Block until the run is done or `timeout` passes. Returns `true` if the
    /// run is done.
    pub fn wait_done_timeout(&self, timeout: Duration) -> bool {
        self.outcome.wait_timeout(timeout)
    }

    /// Await the run's end. Resolves to the terminal error, if any.
    pub fn done(&self) -> Done<'_> {
        self.outcome.done()
    }
}
