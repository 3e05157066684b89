// fluidize-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Project '{0}' not found")]
    #[diagnostic(
        code(fluidize::domain::project_not_found),
        help("Check the project id, or create it with `project create`.")
    )]
    ProjectNotFound(String),

    #[error("Node '{0}' not found in graph")]
    #[diagnostic(code(fluidize::domain::node_not_found))]
    NodeNotFound(String),

    #[error("Edge '{edge_id}' connects a non-existent node ('{source_node}' -> '{target}')")]
    #[diagnostic(
        code(fluidize::domain::invalid_edge),
        help("Both endpoints must exist in the graph before the edge is added.")
    )]
    InvalidEdge {
        edge_id: String,
        source_node: String,
        target: String,
    },

    #[error("Simulation template '{0}' not found")]
    #[diagnostic(
        code(fluidize::domain::template_not_found),
        help("A valid template directory must contain a metadata.yaml file.")
    )]
    TemplateNotFound(String),

    #[error("Graph contains a cycle: {0}")]
    #[diagnostic(
        code(fluidize::domain::cycle),
        help("Remove the circular edge; only acyclic graphs can be executed.")
    )]
    GraphHasCycle(String),

    #[error("No nodes to run")]
    #[diagnostic(
        code(fluidize::domain::no_nodes),
        help("Add at least one node to the graph before starting a run.")
    )]
    NoNodesToRun,
}
