//! Graph nodes and edges.
//!
//! Nodes live in the workflow's arena and refer to edges by [`EdgeId`]; edges
//! refer to nodes by [`NodeId`]. Everything except the join counter is fixed
//! once the workflow is handed to an executor.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::task::Task;
use crate::types::{EdgeId, NodeId};

/// What a node does when the engine reaches it.
#[derive(Debug)]
pub enum NodeKind {
    /// Structural anchor: routes to its children and runs nothing.
    Anchor,
    /// Runs the task.
    Task(Task),
    /// Marks the workflow as successfully finished.
    Terminal,
}

/// A dependency edge: `to` depends on `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

/// A node in the workflow graph.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) dependencies: Vec<EdgeId>,
    pub(crate) children: Vec<EdgeId>,
    completed: AtomicUsize,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            dependencies: Vec::new(),
            children: Vec::new(),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The task name, `"root"` / `"end"` for the two anchors.
    pub fn name(&self) -> &str {
        match &self.kind {
            NodeKind::Anchor => "root",
            NodeKind::Task(task) => task.name(),
            NodeKind::Terminal => "end",
        }
    }

    pub fn task(&self) -> Option<&Task> {
        match &self.kind {
            NodeKind::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn dependencies(&self) -> &[EdgeId] {
        &self.dependencies
    }

    /// Outgoing edges. The first child is visited on the current thread.
    pub fn children(&self) -> &[EdgeId] {
        &self.children
    }

    /// A node with two or more dependencies.
    pub fn is_join(&self) -> bool {
        self.dependencies.len() >= 2
    }

    /// Record one dependency arrival and report whether the node may run.
    ///
    /// Nodes with zero or one dependency are always ready and never touch the
    /// counter. A join is ready exactly once: for the caller whose increment
    /// brings the counter to the dependency count.
    pub(crate) fn dependency_satisfied(&self) -> bool {
        let total = self.dependencies.len();
        if total <= 1 {
            return true;
        }
        self.completed.fetch_add(1, Ordering::AcqRel) + 1 == total
    }

    /// How many dependencies have arrived at this join so far.
    pub fn completed_dependencies(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }
}

/// Create an edge `from -> to`, registering it on both endpoints and in
/// `edges`.
pub(crate) fn connect(
    nodes: &mut [Node],
    edges: &mut Vec<Edge>,
    from: NodeId,
    to: NodeId,
) -> EdgeId {
    let id = EdgeId(edges.len());
    edges.push(Edge { from, to });
    nodes[from.0].children.push(id);
    nodes[to.0].dependencies.push(id);
    id
}
