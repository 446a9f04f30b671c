//! Diagnostic traversal.
//!
//! A breadth-first walk from the root that only enqueues a node once every one
//! of its incoming edges has been walked. The visit order is therefore a valid
//! topological order, and a node whose dependencies can never all be walked
//! (a cycle, or a dependency outside the root's reach) is never visited. The
//! graph is a proper DAG exactly when every registered edge gets walked.
//!
//! Nothing here runs tasks or touches join counters; it is safe to call at
//! any time, including during a run.

use std::collections::{HashSet, VecDeque};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::node::Node;
use crate::types::{EdgeId, NodeId};
use crate::workflow::Workflow;

impl Workflow {
    /// Returns `true` if every edge is reachable from the root in dependency
    /// order.
    pub fn check_dag(&self) -> bool {
        self.check_dag_with(|_, _| {})
    }

    /// Like [`check_dag`](Self::check_dag), calling `visit` once per reachable
    /// node in topological order.
    ///
    /// ```
    /// use taskdag::{Task, TaskError, Workflow};
    ///
    /// let mut wf = Workflow::new();
    /// let a = wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("a"), &[])?;
    /// wf.add_task(Task::from_fn(|| Ok::<(), TaskError>(())).named("b"), &[a])?;
    /// wf.auto_connect_to_end();
    ///
    /// let mut names = Vec::new();
    /// assert!(wf.check_dag_with(|_, node| names.push(node.name().to_string())));
    /// assert_eq!(names, ["root", "a", "b", "end"]);
    /// # Ok::<(), taskdag::WorkflowError>(())
    /// ```
    pub fn check_dag_with<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(NodeId, &Node),
    {
        let (sorted, walked) = self.walk();
        for &id in &sorted {
            visit(id, &self.nodes[id.0]);
        }

        let valid = walked == self.edges.len();

        #[cfg(feature = "tracing")]
        debug!(
            visited_nodes = sorted.len(),
            walked_edges = walked,
            total_edges = self.edges.len(),
            valid,
            "checked workflow graph"
        );

        valid
    }

    /// Nodes reachable from the root, in the order [`check_dag_with`]
    /// visits them.
    ///
    /// [`check_dag_with`]: Self::check_dag_with
    pub fn topological_order(&self) -> Vec<NodeId> {
        self.walk().0
    }

    fn walk(&self) -> (Vec<NodeId>, usize) {
        let mut walked: HashSet<EdgeId> = HashSet::with_capacity(self.edges.len());
        let mut sorted = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root()]);

        while let Some(id) = queue.pop_front() {
            sorted.push(id);
            for &edge in &self.nodes[id.0].children {
                walked.insert(edge);
                let child = self.edges[edge.0].to;
                let ready = self.nodes[child.0]
                    .dependencies
                    .iter()
                    .all(|dep| walked.contains(dep));
                if ready {
                    queue.push_back(child);
                }
            }
        }

        (sorted, walked.len())
    }
}
