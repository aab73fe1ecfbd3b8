// src/dag/graph.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{PipelineError, Result};
use crate::types::TaskId;

/// Static ordering constraints between tasks: `(upstream, downstream)`.
///
/// A bundle may reference compiled stylesheets and copied scripts, so it runs
/// after both whenever they take part in the same run.
const EDGES: &[(TaskId, TaskId)] = &[
    (TaskId::StylesheetCompile, TaskId::AssetBundle),
    (TaskId::ScriptCopy, TaskId::AssetBundle),
];

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies: tasks that must finish before this one can run.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskId>,
}

/// The build graph of one pipeline.
///
/// Only tasks that belong to the pipeline are nodes; edges from the static
/// table are kept when both ends are present.
#[derive(Debug, Clone)]
pub struct BuildGraph {
    nodes: BTreeMap<TaskId, DagNode>,
    order: Vec<TaskId>,
}

impl BuildGraph {
    /// Build the graph restricted to `tasks`.
    pub fn for_tasks(tasks: &[TaskId]) -> Result<Self> {
        Self::with_edges(tasks, EDGES)
    }

    /// Build a graph with an explicit edge list.
    ///
    /// Fails with [`PipelineError::DagCycle`] if the edges form a cycle.
    pub fn with_edges(tasks: &[TaskId], edges: &[(TaskId, TaskId)]) -> Result<Self> {
        let mut nodes: BTreeMap<TaskId, DagNode> = tasks
            .iter()
            .map(|id| (*id, DagNode::default()))
            .collect();

        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for id in nodes.keys() {
            graph.add_node(*id);
        }

        for &(upstream, downstream) in edges {
            if !nodes.contains_key(&upstream) || !nodes.contains_key(&downstream) {
                continue;
            }
            graph.add_edge(upstream, downstream, ());
            if let Some(node) = nodes.get_mut(&downstream) {
                node.deps.push(upstream);
            }
            if let Some(node) = nodes.get_mut(&upstream) {
                node.dependents.push(downstream);
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            PipelineError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                cycle.node_id()
            ))
        })?;

        Ok(Self { nodes, order })
    }

    /// Return all task ids.
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.nodes.contains_key(&task)
    }

    /// Tasks in an order where every task comes after its dependencies.
    pub fn topological_order(&self) -> &[TaskId] {
        &self.order
    }

    /// Position of `task` in [`Self::topological_order`].
    pub fn rank_of(&self, task: TaskId) -> Option<usize> {
        self.order.iter().position(|t| *t == task)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, task: TaskId) -> &[TaskId] {
        self.nodes
            .get(&task)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, task: TaskId) -> &[TaskId] {
        self.nodes
            .get(&task)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}
