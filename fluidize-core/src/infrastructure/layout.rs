// fluidize-core/src/infrastructure/layout.rs

// The single place encoding the on-disk layout. Everything else asks
// this resolver; nothing here performs I/O or can fail.

use std::path::{Path, PathBuf};

pub const GRAPH_FILE: &str = "graph.json";
pub const METADATA_FILE: &str = "metadata.yaml";
pub const PARAMETERS_FILE: &str = "parameters.json";
pub const PROPERTIES_FILE: &str = "properties.yaml";
pub const ENTRYPOINT_FILE: &str = "main.sh";

const PROJECTS_DIR: &str = "projects";
const SIMULATIONS_DIR: &str = "simulations";
const RUNS_DIR: &str = "runs";
const RUN_PREFIX: &str = "run_";
const INPUTS_DIR: &str = "inputs";
const OUTPUTS_DIR: &str = "outputs";

#[derive(Debug, Clone)]
pub struct Layout {
    base: PathBuf,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    // --- PROJECTS ---

    pub fn projects_path(&self) -> PathBuf {
        self.base.join(PROJECTS_DIR)
    }

    pub fn project_path(&self, project_id: &str) -> PathBuf {
        self.projects_path().join(project_id)
    }

    pub fn project_metadata_path(&self, project_id: &str) -> PathBuf {
        self.project_path(project_id).join(METADATA_FILE)
    }

    pub fn project_parameters_path(&self, project_id: &str) -> PathBuf {
        self.project_path(project_id).join(PARAMETERS_FILE)
    }

    pub fn graph_path(&self, project_id: &str) -> PathBuf {
        self.project_path(project_id).join(GRAPH_FILE)
    }

    // --- SIMULATION TEMPLATES ---

    pub fn simulations_path(&self) -> PathBuf {
        self.base.join(SIMULATIONS_DIR)
    }

    pub fn simulation_path(&self, simulation_id: &str) -> PathBuf {
        self.simulations_path().join(simulation_id)
    }

    /// Presence of this file is what makes a template directory valid.
    pub fn simulation_metadata_path(&self, simulation_id: &str) -> PathBuf {
        self.simulation_path(simulation_id).join(METADATA_FILE)
    }

    // --- RUNS ---

    pub fn runs_path(&self, project_id: &str) -> PathBuf {
        self.project_path(project_id).join(RUNS_DIR)
    }

    pub fn run_path(&self, project_id: &str, run_number: u32) -> PathBuf {
        self.runs_path(project_id)
            .join(format!("{RUN_PREFIX}{run_number}"))
    }

    pub fn run_metadata_path(&self, project_id: &str, run_number: u32) -> PathBuf {
        self.run_path(project_id, run_number).join(METADATA_FILE)
    }

    /// Parses a run directory name back into its number.
    pub fn run_number_of(dir_name: &str) -> Option<u32> {
        dir_name.strip_prefix(RUN_PREFIX)?.parse().ok()
    }

    // --- NODES ---

    /// Canonical node workspace when `run` is unset, the run-scoped
    /// copy otherwise.
    pub fn node_path(&self, project_id: &str, node_id: &str, run: Option<u32>) -> PathBuf {
        match run {
            None => self.project_path(project_id).join(node_id),
            Some(n) => self.run_path(project_id, n).join(node_id),
        }
    }

    pub fn node_parameters_path(
        &self,
        project_id: &str,
        node_id: &str,
        run: Option<u32>,
    ) -> PathBuf {
        self.node_path(project_id, node_id, run).join(PARAMETERS_FILE)
    }

    pub fn properties_path(&self, project_id: &str, node_id: &str, run: Option<u32>) -> PathBuf {
        self.node_path(project_id, node_id, run).join(PROPERTIES_FILE)
    }

    pub fn node_inputs_path(&self, project_id: &str, node_id: &str, run: u32) -> PathBuf {
        self.node_path(project_id, node_id, Some(run)).join(INPUTS_DIR)
    }

    pub fn node_outputs_path(&self, project_id: &str, node_id: &str, run: u32) -> PathBuf {
        self.node_path(project_id, node_id, Some(run)).join(OUTPUTS_DIR)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new("/data/.fluidize")
    }

    #[test]
    fn test_project_paths() {
        let l = layout();
        assert_eq!(
            l.project_path("p1"),
            PathBuf::from("/data/.fluidize/projects/p1")
        );
        assert_eq!(
            l.graph_path("p1"),
            PathBuf::from("/data/.fluidize/projects/p1/graph.json")
        );
        assert_eq!(
            l.project_metadata_path("p1"),
            PathBuf::from("/data/.fluidize/projects/p1/metadata.yaml")
        );
    }

    #[test]
    fn test_run_paths() {
        let l = layout();
        assert_eq!(
            l.run_path("p1", 3),
            PathBuf::from("/data/.fluidize/projects/p1/runs/run_3")
        );
        assert_eq!(Layout::run_number_of("run_3"), Some(3));
        assert_eq!(Layout::run_number_of("run_x"), None);
        assert_eq!(Layout::run_number_of("archive"), None);
    }

    #[test]
    fn test_node_path_switches_on_run_scope() {
        let l = layout();
        assert_eq!(
            l.node_path("p1", "n1", None),
            PathBuf::from("/data/.fluidize/projects/p1/n1")
        );
        assert_eq!(
            l.node_path("p1", "n1", Some(2)),
            PathBuf::from("/data/.fluidize/projects/p1/runs/run_2/n1")
        );
        assert_eq!(
            l.properties_path("p1", "n1", Some(2)),
            PathBuf::from("/data/.fluidize/projects/p1/runs/run_2/n1/properties.yaml")
        );
        assert_eq!(
            l.node_outputs_path("p1", "n1", 2),
            PathBuf::from("/data/.fluidize/projects/p1/runs/run_2/n1/outputs")
        );
    }

    #[test]
    fn test_simulation_paths() {
        let l = layout();
        assert_eq!(
            l.simulation_metadata_path("heat-2d"),
            PathBuf::from("/data/.fluidize/simulations/heat-2d/metadata.yaml")
        );
    }
}
