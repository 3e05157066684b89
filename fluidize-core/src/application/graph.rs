// fluidize-core/src/application/graph.rs

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::graph::{Graph, GraphData, GraphEdge, GraphNode};
use crate::domain::project::{ParametersFile, ProjectSummary, PropertiesFile};
use crate::error::FluidizeError;
use crate::infrastructure::layout::Layout;
use crate::ports::storage::{self, Storage};

/// Project-scoped graph mutations. Every operation follows the same
/// sequence: load (healing on the way in), mutate, save atomically,
/// then apply any workspace side effect.
pub struct GraphProcessor {
    project: ProjectSummary,
    layout: Layout,
    store: Arc<dyn Storage>,
}

impl GraphProcessor {
    pub fn new(project: ProjectSummary, layout: Layout, store: Arc<dyn Storage>) -> Self {
        Self {
            project,
            layout,
            store,
        }
    }

    pub fn project(&self) -> &ProjectSummary {
        &self.project
    }

    /// Read for display: any load failure yields an empty graph rather
    /// than an error.
    pub fn get_graph(&self) -> GraphData {
        match self.load() {
            Ok(graph) => graph.to_data(),
            Err(e) => {
                warn!(project_id = %self.project.id, error = %e, "Falling back to empty graph");
                GraphData::default()
            }
        }
    }

    /// Inserts (or replaces) a node, then materializes its workspace.
    ///
    /// The graph file is written first: the graph is the record of
    /// truth, so a template failure leaves the node marked but
    /// un-materialized rather than silently absent.
    #[instrument(skip(self, node), fields(project_id = %self.project.id, node_id = %node.id))]
    pub fn insert_node(&self, node: GraphNode) -> Result<GraphNode, FluidizeError> {
        let mut graph = self.load()?;
        graph.add_node(node.clone());
        self.save(&graph)?;

        let node_path = self.layout.node_path(&self.project.id, &node.id, None);
        if self.store.exists(&node_path) {
            // Re-inserting an existing node keeps its workspace as-is
            return Ok(node);
        }

        if node.data.simulation_id.is_empty() {
            self.initialize_empty_workspace(&node)?;
        } else {
            self.materialize_template(&node, &node_path)?;
        }
        Ok(node)
    }

    /// Re-inserts the node in place; `add_node` replaces by id.
    pub fn update_node_position(&self, node: GraphNode) -> Result<GraphNode, FluidizeError> {
        let mut graph = self.load()?;
        if !graph.contains_node(&node.id) {
            return Err(DomainError::NodeNotFound(node.id).into());
        }
        graph.add_node(node.clone());
        self.save(&graph)?;
        Ok(node)
    }

    /// Removes the node and every edge touching it, then best-effort
    /// removes its workspace. Graph truth wins: a directory that cannot
    /// be deleted is a warning, not a failure.
    #[instrument(skip(self), fields(project_id = %self.project.id))]
    pub fn delete_node(&self, node_id: &str) -> Result<(), FluidizeError> {
        let mut graph = self.load()?;
        graph.remove_node(node_id);
        self.save(&graph)?;

        let node_path = self.layout.node_path(&self.project.id, node_id, None);
        if let Err(e) = self.store.remove_dir(&node_path) {
            warn!(
                node_id,
                path = %node_path.display(),
                error = %e,
                "Could not remove node workspace"
            );
        }
        Ok(())
    }

    /// Adds or replaces an edge. Both endpoints must already exist;
    /// otherwise the graph on disk is left untouched.
    pub fn upsert_edge(&self, edge: GraphEdge) -> Result<GraphEdge, FluidizeError> {
        let mut graph = self.load()?;
        graph.add_edge(edge.clone())?;
        self.save(&graph)?;
        Ok(edge)
    }

    /// Removing an absent edge is a no-op, matching the in-memory model.
    pub fn delete_edge(&self, edge_id: &str) -> Result<(), FluidizeError> {
        let mut graph = self.load()?;
        graph.remove_edge(edge_id);
        self.save(&graph)
    }

    /// Creates an empty `graph.json` if the project has none yet.
    pub fn ensure_graph_exists(&self) -> Result<(), FluidizeError> {
        let path = self.layout.graph_path(&self.project.id);
        if !self.store.exists(&path) {
            Graph::new().save(self.store.as_ref(), &path)?;
            debug!(project_id = %self.project.id, "Initialized empty graph");
        }
        Ok(())
    }

    pub(crate) fn load(&self) -> Result<Graph, FluidizeError> {
        let mut graph = Graph::load(
            self.store.as_ref(),
            &self.layout.graph_path(&self.project.id),
        )?;
        graph.heal();
        Ok(graph)
    }

    fn save(&self, graph: &Graph) -> Result<(), FluidizeError> {
        graph.save(
            self.store.as_ref(),
            &self.layout.graph_path(&self.project.id),
        )
    }

    /// A node without a template starts from the default skeleton:
    /// empty parameters and properties.
    fn initialize_empty_workspace(&self, node: &GraphNode) -> Result<(), FluidizeError> {
        storage::write_json(
            self.store.as_ref(),
            &self
                .layout
                .node_parameters_path(&self.project.id, &node.id, None),
            &ParametersFile::default(),
        )?;
        storage::write_yaml(
            self.store.as_ref(),
            &self.layout.properties_path(&self.project.id, &node.id, None),
            &PropertiesFile::default(),
        )?;
        Ok(())
    }

    /// Clones the simulation template into the node workspace. The
    /// template's metadata file is the validity marker; without it no
    /// copy is attempted.
    fn materialize_template(
        &self,
        node: &GraphNode,
        node_path: &std::path::Path,
    ) -> Result<(), FluidizeError> {
        let simulation_id = &node.data.simulation_id;
        if !self
            .store
            .exists(&self.layout.simulation_metadata_path(simulation_id))
        {
            return Err(DomainError::TemplateNotFound(simulation_id.clone()).into());
        }
        self.store
            .copy_dir(&self.layout.simulation_path(simulation_id), node_path)?;
        debug!(
            node_id = %node.id,
            simulation_id,
            "Materialized node workspace from template"
        );
        Ok(())
    }
}
