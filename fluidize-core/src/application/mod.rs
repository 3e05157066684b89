// fluidize-core/src/application/mod.rs

pub mod graph;
pub mod orchestrator;
pub mod projects;
pub mod simulations;
pub mod workspace;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write `use fluidize_core::application::{ProjectStore, Runs}`
// without knowing the internal file structure.

pub use graph::GraphProcessor;
pub use orchestrator::{RunSupervisor, Runs};
pub use projects::ProjectStore;
pub use simulations::{TemplateSummary, list_templates};
pub use workspace::RunWorkspace;
