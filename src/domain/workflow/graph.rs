//! Workflow graph and execution ordering

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

use super::error::WorkflowError;
use super::node::{WorkflowEdge, WorkflowNode};

/// How the orderer treats nodes that can never become ready
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    /// Silently drop nodes on or downstream of a cycle
    #[default]
    Lenient,
    /// Fail with [`WorkflowError::CyclicGraph`] naming the dropped nodes
    Strict,
}

/// A declarative graph of typed nodes and directed edges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Execution order of this graph's nodes
    pub fn order(&self, mode: OrderingMode) -> Result<Vec<&WorkflowNode>, WorkflowError> {
        execution_order(&self.nodes, &self.edges, mode)
    }
}

/// Topologically sort `nodes` with Kahn's algorithm.
///
/// Ready nodes are queued FIFO, seeded in declaration order, so the result is
/// deterministic. Edges naming undeclared nodes are ignored. A duplicated id
/// keeps the queue slot of its first declaration but runs its last one.
pub fn execution_order<'a>(
    nodes: &'a [WorkflowNode],
    edges: &[WorkflowEdge],
    mode: OrderingMode,
) -> Result<Vec<&'a WorkflowNode>, WorkflowError> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
    let mut participates = vec![false; nodes.len()];
    // Slot position -> index of the declaration that runs there
    let mut declared: Vec<usize> = (0..nodes.len()).collect();

    for (pos, node) in nodes.iter().enumerate() {
        if let Some(&slot) = positions.get(node.id()) {
            warn!(node_id = %node.id(), "Duplicate node id; the later declaration replaces the earlier one");
            declared[slot] = pos;
            continue;
        }
        positions.insert(node.id(), pos);
        participates[pos] = true;
    }

    let mut in_degree = vec![0usize; nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

    for edge in edges {
        match (
            positions.get(edge.source.as_str()),
            positions.get(edge.target.as_str()),
        ) {
            (Some(&source), Some(&target)) => {
                successors[source].push(target);
                in_degree[target] += 1;
            }
            _ => debug!(
                source = %edge.source,
                target = %edge.target,
                "Ignoring edge that references an undeclared node"
            ),
        }
    }

    let mut queue: VecDeque<usize> = (0..nodes.len())
        .filter(|&pos| participates[pos] && in_degree[pos] == 0)
        .collect();
    let mut ordered = Vec::with_capacity(positions.len());

    while let Some(pos) = queue.pop_front() {
        ordered.push(&nodes[declared[pos]]);
        for &next in &successors[pos] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if ordered.len() < positions.len() {
        let excluded: Vec<String> = (0..nodes.len())
            .filter(|&pos| participates[pos] && in_degree[pos] > 0)
            .map(|pos| nodes[pos].id().to_string())
            .collect();

        match mode {
            OrderingMode::Strict => return Err(WorkflowError::cyclic_graph(excluded)),
            OrderingMode::Lenient => {
                warn!(excluded = ?excluded, "Excluding nodes that can never become ready")
            }
        }
    }

    debug!(
        order = ?ordered.iter().map(|n| n.id()).collect::<Vec<_>>(),
        "Computed execution order"
    );

    Ok(ordered)
}
