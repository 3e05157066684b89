// fluidize-core/src/domain/graph/dag.rs

use std::collections::{BTreeMap, VecDeque};

use crate::domain::error::DomainError;
use crate::domain::graph::model::Graph;

/// Result of planning a run over a graph: the flat execution order and,
/// for each node, the sorted ids of its direct upstream nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionPlan {
    pub order: Vec<String>,
    pub predecessors: BTreeMap<String, Vec<String>>,
}

impl ExecutionPlan {
    /// The predecessor whose outputs feed a node's input path. With
    /// fan-in the lexicographically first upstream id wins; callers log
    /// a warning when more than one exists.
    pub fn input_source(&self, node_id: &str) -> Option<&str> {
        self.predecessors
            .get(node_id)
            .and_then(|p| p.first())
            .map(String::as_str)
    }
}

pub struct ExecutionPlanner;

impl ExecutionPlanner {
    /// Calculates the execution order of the graph (topological sort).
    ///
    /// Kahn's algorithm, layered: each BFS layer is sorted by node id
    /// before being appended, so repeated runs of the same graph yield
    /// the same order.
    pub fn plan(graph: &Graph) -> Result<ExecutionPlan, DomainError> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut adj_list: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut predecessors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        // 1. Initialization: every known node starts at degree 0
        for node in graph.nodes() {
            in_degree.insert(&node.id, 0);
            adj_list.insert(&node.id, Vec::new());
            predecessors.insert(node.id.clone(), Vec::new());
        }

        // 2. Graph construction from the edge list
        for edge in graph.edges() {
            adj_list
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
            *in_degree.entry(edge.target.as_str()).or_insert(0) += 1;

            if let Some(upstream) = predecessors.get_mut(edge.target.as_str()) {
                upstream.push(edge.source.clone());
            }
        }

        for upstream in predecessors.values_mut() {
            upstream.sort();
            upstream.dedup();
        }

        // 3. Kahn's algorithm, layer by layer
        let mut order: Vec<String> = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        let mut roots: Vec<&str> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&name, _)| name)
            .collect();
        roots.sort_unstable();
        queue.extend(roots);

        let mut total_resolved = 0;

        while !queue.is_empty() {
            let layer_size = queue.len();
            let mut next_layer: Vec<&str> = Vec::new();

            for _ in 0..layer_size {
                if let Some(current) = queue.pop_front() {
                    order.push(current.to_string());
                    total_resolved += 1;

                    if let Some(neighbors) = adj_list.get(current) {
                        for &neighbor in neighbors {
                            if let Some(degree) = in_degree.get_mut(neighbor) {
                                *degree -= 1;
                                if *degree == 0 {
                                    next_layer.push(neighbor);
                                }
                            }
                        }
                    }
                }
            }

            // Stable tie-breaking: the freed layer executes in id order
            next_layer.sort_unstable();
            next_layer.dedup();
            queue.extend(next_layer);
        }

        // 4. Cycle detection
        let node_count = graph.nodes().count();
        if total_resolved != node_count {
            return Err(DomainError::GraphHasCycle(format!(
                "resolved {}/{} nodes",
                total_resolved, node_count
            )));
        }

        Ok(ExecutionPlan {
            order,
            predecessors,
        })
    }
}
