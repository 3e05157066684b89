// fluidize-core/src/application/workspace.rs

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::graph::Graph;
use crate::domain::run::{RunFlowPayload, RunMetadata, RunStatus};
use crate::error::FluidizeError;
use crate::infrastructure::layout::Layout;
use crate::ports::storage::{self, Storage};

/// Allocates run numbers and materializes per-run directory trees.
///
/// Execution never touches canonical node workspaces: each run gets its
/// own copy, plus empty `inputs/` and `outputs/` directories per node.
pub struct RunWorkspace {
    layout: Layout,
    store: Arc<dyn Storage>,
}

impl RunWorkspace {
    pub fn new(layout: Layout, store: Arc<dyn Storage>) -> Self {
        Self { layout, store }
    }

    /// Creates `runs/run_<n>/` for the next free `n` and returns it.
    ///
    /// Allocation is race-safe: the run directory is claimed with an
    /// exclusive create, and a lost race advances to the next number.
    /// Existing run directories are never reused or overwritten.
    #[instrument(skip(self, payload, graph))]
    pub fn prepare_run(
        &self,
        project_id: &str,
        payload: &RunFlowPayload,
        graph: &Graph,
    ) -> Result<u32, FluidizeError> {
        let mut run_number = self.last_run_number(project_id)? + 1;
        while !self
            .store
            .create_dir_exclusive(&self.layout.run_path(project_id, run_number))?
        {
            run_number += 1;
        }

        let metadata = RunMetadata::started(payload, chrono::Utc::now().to_rfc3339());
        storage::write_yaml(
            self.store.as_ref(),
            &self.layout.run_metadata_path(project_id, run_number),
            &metadata,
        )?;

        for node in graph.nodes() {
            let canonical = self.layout.node_path(project_id, &node.id, None);
            let run_scoped = self.layout.node_path(project_id, &node.id, Some(run_number));

            if self.store.exists(&canonical) {
                self.store.copy_dir(&canonical, &run_scoped)?;
            } else {
                // Inert graph entry with no workspace: still give the
                // run a directory so downstream wiring has a target.
                self.store.create_dir(&run_scoped)?;
            }
            self.store
                .create_dir(&self.layout.node_inputs_path(project_id, &node.id, run_number))?;
            self.store
                .create_dir(&self.layout.node_outputs_path(project_id, &node.id, run_number))?;
        }

        debug!(project_id, run_number, "Run workspace materialized");
        Ok(run_number)
    }

    /// Run numbers present on disk, ascending.
    pub fn list_runs(&self, project_id: &str) -> Result<Vec<u32>, FluidizeError> {
        let mut runs: Vec<u32> = self
            .store
            .list_dirs(&self.layout.runs_path(project_id))?
            .iter()
            .filter_map(|dir| dir.file_name().and_then(|n| n.to_str()))
            .filter_map(Layout::run_number_of)
            .collect();
        runs.sort_unstable();
        Ok(runs)
    }

    pub fn read_metadata(
        &self,
        project_id: &str,
        run_number: u32,
    ) -> Result<RunMetadata, FluidizeError> {
        storage::read_yaml(
            self.store.as_ref(),
            &self.layout.run_metadata_path(project_id, run_number),
        )
    }

    /// Records the terminal status of a run in its metadata file.
    pub fn finish(
        &self,
        project_id: &str,
        run_number: u32,
        status: RunStatus,
        message: Option<String>,
    ) -> Result<(), FluidizeError> {
        let mut metadata = self.read_metadata(project_id, run_number)?;
        metadata.status = status;
        metadata.message = message;
        storage::write_yaml(
            self.store.as_ref(),
            &self.layout.run_metadata_path(project_id, run_number),
            &metadata,
        )
    }

    fn last_run_number(&self, project_id: &str) -> Result<u32, FluidizeError> {
        Ok(self.list_runs(project_id)?.into_iter().max().unwrap_or(0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::graph::GraphNode;
    use crate::infrastructure::storage::LocalStorage;
    use anyhow::Result;
    use tempfile::{TempDir, tempdir};

    fn workspace(dir: &TempDir) -> RunWorkspace {
        RunWorkspace::new(Layout::new(dir.path()), Arc::new(LocalStorage::new()))
    }

    fn graph_with(nodes: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for id in nodes {
            graph.add_node(GraphNode::new(*id, *id));
        }
        graph
    }

    #[test]
    fn test_prepare_run_materializes_tree() -> Result<()> {
        let dir = tempdir()?;
        let ws = workspace(&dir);

        // A canonical workspace with a file that must be copied
        let canonical = dir.path().join("projects").join("p1").join("a");
        std::fs::create_dir_all(canonical.join("source"))?;
        std::fs::write(canonical.join("main.sh"), "#!/bin/bash\n")?;

        let run = ws.prepare_run("p1", &RunFlowPayload::named("first"), &graph_with(&["a"]))?;

        assert_eq!(run, 1);
        let run_dir = dir.path().join("projects/p1/runs/run_1");
        assert!(run_dir.join("metadata.yaml").exists());
        assert!(run_dir.join("a").join("main.sh").exists());
        assert!(run_dir.join("a").join("inputs").is_dir());
        assert!(run_dir.join("a").join("outputs").is_dir());

        // The whole canonical tree was copied, nothing more
        let copied: Vec<String> = walkdir::WalkDir::new(run_dir.join("a"))
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(copied, vec!["main.sh"]);

        let metadata = ws.read_metadata("p1", run)?;
        assert_eq!(metadata.status, RunStatus::Running);
        assert_eq!(metadata.name, "first");
        Ok(())
    }

    #[test]
    fn test_run_numbers_are_monotonic() -> Result<()> {
        let dir = tempdir()?;
        let ws = workspace(&dir);
        let graph = graph_with(&["a"]);

        let first = ws.prepare_run("p1", &RunFlowPayload::default(), &graph)?;
        let second = ws.prepare_run("p1", &RunFlowPayload::default(), &graph)?;

        assert_eq!((first, second), (1, 2));
        assert!(dir.path().join("projects/p1/runs/run_1").is_dir());
        assert!(dir.path().join("projects/p1/runs/run_2").is_dir());
        Ok(())
    }

    #[test]
    fn test_prepare_run_never_reuses_existing_directories() -> Result<()> {
        let dir = tempdir()?;
        let ws = workspace(&dir);

        // A pre-existing run_7 from some earlier life of the project
        std::fs::create_dir_all(dir.path().join("projects/p1/runs/run_7"))?;

        let run = ws.prepare_run("p1", &RunFlowPayload::default(), &graph_with(&["a"]))?;

        assert_eq!(run, 8);
        Ok(())
    }

    #[test]
    fn test_list_runs_ignores_foreign_directories() -> Result<()> {
        let dir = tempdir()?;
        let ws = workspace(&dir);

        std::fs::create_dir_all(dir.path().join("projects/p1/runs/run_2"))?;
        std::fs::create_dir_all(dir.path().join("projects/p1/runs/run_10"))?;
        std::fs::create_dir_all(dir.path().join("projects/p1/runs/archive"))?;

        assert_eq!(ws.list_runs("p1")?, vec![2, 10]);
        Ok(())
    }

    #[test]
    fn test_finish_updates_status_and_message() -> Result<()> {
        let dir = tempdir()?;
        let ws = workspace(&dir);

        let run = ws.prepare_run("p1", &RunFlowPayload::default(), &graph_with(&["a"]))?;
        ws.finish("p1", run, RunStatus::Failed, Some("failure: boom".into()))?;

        let metadata = ws.read_metadata("p1", run)?;
        assert_eq!(metadata.status, RunStatus::Failed);
        assert_eq!(metadata.message.as_deref(), Some("failure: boom"));
        Ok(())
    }
}
