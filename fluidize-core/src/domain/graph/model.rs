// fluidize-core/src/domain/graph/model.rs

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::error::DomainError;
use crate::domain::graph::types::{GraphData, GraphEdge, GraphNode};
use crate::error::FluidizeError;
use crate::ports::storage::{self, Storage};

/// In-memory representation of a project's simulation graph.
///
/// Nodes and edges are keyed by id; the BTreeMap keeps the on-disk
/// serialization sorted so repeated saves produce identical diffs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<String, GraphNode>,
    edges: BTreeMap<String, GraphEdge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: GraphData) -> Self {
        Self {
            nodes: data.nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
            edges: data.edges.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn to_data(&self) -> GraphData {
        GraphData {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.get(node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    /// Inserts or replaces a node by id. Replacing is how position
    /// updates are expressed.
    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Removes a node and every edge whose source or target is `node_id`.
    pub fn remove_node(&mut self, node_id: &str) {
        if self.nodes.remove(node_id).is_some() {
            self.edges
                .retain(|_, edge| edge.source != node_id && edge.target != node_id);
        }
    }

    /// Inserts or replaces an edge by id. Both endpoints must exist.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Result<(), DomainError> {
        if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
            return Err(DomainError::InvalidEdge {
                edge_id: edge.id,
                source_node: edge.source,
                target: edge.target,
            });
        }
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    /// Removes an edge by id. Removing an absent edge is a no-op.
    pub fn remove_edge(&mut self, edge_id: &str) {
        self.edges.remove(edge_id);
    }

    /// True iff no edge references a missing node.
    pub fn validate(&self) -> bool {
        self.edges.values().all(|e| self.edge_is_valid(e))
    }

    /// Destructively removes orphaned edges.
    pub fn heal(&mut self) {
        let orphaned: Vec<String> = self
            .edges
            .values()
            .filter(|e| !self.edge_is_valid(e))
            .map(|e| e.id.clone())
            .collect();
        for edge_id in orphaned {
            self.edges.remove(&edge_id);
        }
    }

    fn edge_is_valid(&self, edge: &GraphEdge) -> bool {
        self.nodes.contains_key(&edge.source) && self.nodes.contains_key(&edge.target)
    }

    /// Loads a graph from a `graph.json` file. An absent file yields an
    /// empty graph, not an error: projects start without one.
    pub fn load(store: &dyn Storage, path: &Path) -> Result<Self, FluidizeError> {
        if !store.exists(path) {
            return Ok(Self::new());
        }
        let data: GraphData = storage::read_json(store, path)?;
        Ok(Self::from_data(data))
    }

    /// Persists the graph, creating parent directories and writing
    /// atomically so a crash cannot leave a half-written `graph.json`.
    pub fn save(&self, store: &dyn Storage, path: &Path) -> Result<(), FluidizeError> {
        storage::write_json(store, path, &self.to_data())?;
        Ok(())
    }
}
