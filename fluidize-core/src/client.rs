// fluidize-core/src/client.rs

// Thin routing surface over the application layer. No logic of its own:
// it wires the local adapters together once and hands out project-scoped
// facets.

use std::sync::Arc;

use crate::application::graph::GraphProcessor;
use crate::application::orchestrator::{RunSupervisor, Runs};
use crate::application::projects::ProjectStore;
use crate::application::simulations::{self, TemplateSummary};
use crate::domain::project::ProjectSummary;
use crate::error::FluidizeError;
use crate::infrastructure::adapters::docker::DockerStrategy;
use crate::infrastructure::config::FluidizeConfig;
use crate::infrastructure::layout::Layout;
use crate::infrastructure::logs::TracingLogSink;
use crate::infrastructure::storage::LocalStorage;
use crate::ports::execution::ExecutionStrategy;
use crate::ports::storage::Storage;

/// Entry point for local mode. Owns the storage, layout and execution
/// strategy every facet shares.
pub struct Fluidize {
    config: FluidizeConfig,
    layout: Layout,
    store: Arc<dyn Storage>,
    strategy: Arc<dyn ExecutionStrategy>,
    supervisor: Arc<RunSupervisor>,
}

impl Fluidize {
    /// Builds a client rooted at the configured base path
    /// (`FLUIDIZE_BASE_PATH`, else `$HOME/.fluidize`).
    pub fn new() -> Result<Self, FluidizeError> {
        Self::from_config(FluidizeConfig::from_env())
    }

    pub fn with_base_path(base: impl Into<std::path::PathBuf>) -> Result<Self, FluidizeError> {
        Self::from_config(FluidizeConfig::new(base))
    }

    fn from_config(config: FluidizeConfig) -> Result<Self, FluidizeError> {
        let store: Arc<dyn Storage> = Arc::new(LocalStorage::new());
        config.ensure_directories(store.as_ref())?;

        let layout = config.layout();
        let strategy: Arc<dyn ExecutionStrategy> = Arc::new(DockerStrategy::new(
            layout.clone(),
            store.clone(),
            Arc::new(TracingLogSink::new()),
        ));

        Ok(Self {
            config,
            layout,
            store,
            strategy,
            supervisor: Arc::new(RunSupervisor::new()),
        })
    }

    /// Swaps the execution strategy (remote VM, cluster job, test fake).
    pub fn with_strategy(mut self, strategy: Arc<dyn ExecutionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &FluidizeConfig {
        &self.config
    }

    pub fn projects(&self) -> ProjectStore {
        ProjectStore::new(self.layout.clone(), self.store.clone())
    }

    pub fn simulations(&self) -> Result<Vec<TemplateSummary>, FluidizeError> {
        simulations::list_templates(self.store.as_ref(), &self.layout)
    }

    /// Resolves a project handle. Attaching guarantees the project has
    /// a graph file, so facet calls never race its creation.
    pub fn project(&self, project_id: &str) -> Result<Project, FluidizeError> {
        let summary = self.projects().get(project_id)?;
        let project = Project {
            summary,
            layout: self.layout.clone(),
            store: self.store.clone(),
            strategy: self.strategy.clone(),
            supervisor: self.supervisor.clone(),
        };
        project.graph().ensure_graph_exists()?;
        Ok(project)
    }
}

/// A project handle carrying its graph and runs facets.
pub struct Project {
    summary: ProjectSummary,
    layout: Layout,
    store: Arc<dyn Storage>,
    strategy: Arc<dyn ExecutionStrategy>,
    supervisor: Arc<RunSupervisor>,
}

impl Project {
    pub fn summary(&self) -> &ProjectSummary {
        &self.summary
    }

    pub fn graph(&self) -> GraphProcessor {
        GraphProcessor::new(self.summary.clone(), self.layout.clone(), self.store.clone())
    }

    pub fn runs(&self) -> Runs {
        Runs::new(
            self.summary.clone(),
            self.layout.clone(),
            self.store.clone(),
            self.strategy.clone(),
            self.supervisor.clone(),
        )
    }
}
