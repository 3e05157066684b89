// fluidize-core/src/domain/graph/mod.rs

pub mod dag;
pub mod model;
pub mod types;

pub use dag::{ExecutionPlan, ExecutionPlanner};
pub use model::Graph;
pub use types::{GraphData, GraphEdge, GraphNode, NodeData, Position};
