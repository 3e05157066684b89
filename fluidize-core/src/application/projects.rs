// fluidize-core/src/application/projects.rs

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::graph::Graph;
use crate::domain::project::{ParametersFile, ProjectMetadata, ProjectSummary};
use crate::error::FluidizeError;
use crate::infrastructure::layout::Layout;
use crate::ports::storage::{self, Storage};

/// Filesystem-backed project store. Each project is a directory under
/// `projects/` whose `metadata.yaml` is the record of truth.
pub struct ProjectStore {
    layout: Layout,
    store: Arc<dyn Storage>,
}

impl ProjectStore {
    pub fn new(layout: Layout, store: Arc<dyn Storage>) -> Self {
        Self { layout, store }
    }

    /// Creates the project if it is new, otherwise rewrites its
    /// metadata. Idempotent: upserting the same summary twice is
    /// equivalent to once.
    #[instrument(skip(self, project), fields(project_id = %project.id))]
    pub fn upsert(&self, project: ProjectSummary) -> Result<ProjectSummary, FluidizeError> {
        if self
            .store
            .exists(&self.layout.project_metadata_path(&project.id))
        {
            self.write_metadata(&project)?;
        } else {
            self.create_new(&project)?;
        }
        Ok(project)
    }

    pub fn get(&self, project_id: &str) -> Result<ProjectSummary, FluidizeError> {
        let metadata_path = self.layout.project_metadata_path(project_id);
        if !self.store.exists(&metadata_path) {
            return Err(DomainError::ProjectNotFound(project_id.to_string()).into());
        }
        let metadata: ProjectMetadata = storage::read_yaml(self.store.as_ref(), &metadata_path)?;
        Ok(metadata.project)
    }

    /// Scans the store; directories without a readable metadata file
    /// are skipped, not errors.
    pub fn list(&self) -> Result<Vec<ProjectSummary>, FluidizeError> {
        let mut projects = Vec::new();
        for dir in self.store.list_dirs(&self.layout.projects_path())? {
            let Some(project_id) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.get(project_id) {
                Ok(project) => projects.push(project),
                Err(e) => debug!(project_id, error = %e, "Skipping invalid project directory"),
            }
        }
        Ok(projects)
    }

    /// Removes the project directory and everything beneath it: graph,
    /// node workspaces, runs.
    pub fn delete(&self, project_id: &str) -> Result<(), FluidizeError> {
        // Lookup first so a missing project surfaces as NotFound
        let project = self.get(project_id)?;
        self.store.remove_dir(&self.layout.project_path(&project.id))
    }

    fn create_new(&self, project: &ProjectSummary) -> Result<(), FluidizeError> {
        storage::write_json(
            self.store.as_ref(),
            &self.layout.project_parameters_path(&project.id),
            &ParametersFile::default(),
        )?;
        Graph::new().save(self.store.as_ref(), &self.layout.graph_path(&project.id))?;
        self.write_metadata(project)?;
        debug!(project_id = %project.id, "Created project structure");
        Ok(())
    }

    fn write_metadata(&self, project: &ProjectSummary) -> Result<(), FluidizeError> {
        storage::write_yaml(
            self.store.as_ref(),
            &self.layout.project_metadata_path(&project.id),
            &ProjectMetadata {
                project: project.clone(),
            },
        )
    }
}
