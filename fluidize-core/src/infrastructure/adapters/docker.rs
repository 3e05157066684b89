// fluidize-core/src/infrastructure/adapters/docker.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::project::PropertiesFile;
use crate::error::FluidizeError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::layout::{ENTRYPOINT_FILE, Layout};
use crate::infrastructure::process::ProcessExecutor;
use crate::ports::execution::{
    ExecutionOutcome, ExecutionStrategy, NodeEnvironment, NodeExecution,
};
use crate::ports::logs::LogSink;
use crate::ports::storage::{self, Storage};

/// Fixed in-container mount points. User code never sees host paths;
/// the `FLUIDIZE_*` variables always reference these.
pub mod container {
    pub const NODE_PATH: &str = "/fluidize/node";
    pub const SIMULATION_PATH: &str = "/fluidize/node/source";
    pub const OUTPUT_PATH: &str = "/fluidize/outputs";
    pub const INPUT_PATH: &str = "/fluidize/inputs";
    pub const EXECUTION_MODE: &str = "local_docker";
}

/// Local execution strategy: one container per node via a
/// Docker-compatible CLI.
pub struct DockerStrategy {
    layout: Layout,
    store: Arc<dyn Storage>,
    sink: Arc<dyn LogSink>,
    program: String,
}

impl DockerStrategy {
    pub fn new(layout: Layout, store: Arc<dyn Storage>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            layout,
            store,
            sink,
            program: "docker".to_string(),
        }
    }

    /// Swaps the container CLI (e.g. `podman`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, args: Vec<String>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }

    fn pull_args(image: &str) -> Vec<String> {
        vec!["pull".to_string(), image.to_string()]
    }

    /// Environment the node's `main.sh` sees. Stable contract with user
    /// code: five variables always, `FLUIDIZE_INPUT_PATH` only when a
    /// predecessor feeds this node.
    fn environment(request: &NodeExecution, env: &NodeEnvironment) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("FLUIDIZE_NODE_ID".to_string(), request.node_id.clone());
        vars.insert(
            "FLUIDIZE_NODE_PATH".to_string(),
            container::NODE_PATH.to_string(),
        );
        vars.insert(
            "FLUIDIZE_SIMULATION_PATH".to_string(),
            container::SIMULATION_PATH.to_string(),
        );
        vars.insert(
            "FLUIDIZE_OUTPUT_PATH".to_string(),
            container::OUTPUT_PATH.to_string(),
        );
        vars.insert(
            "FLUIDIZE_EXECUTION_MODE".to_string(),
            container::EXECUTION_MODE.to_string(),
        );
        if env.input_dir.is_some() {
            vars.insert(
                "FLUIDIZE_INPUT_PATH".to_string(),
                container::INPUT_PATH.to_string(),
            );
        }
        vars
    }

    /// `docker run` argv: ephemeral container, node/output (and input)
    /// bind mounts, env contract, simulation workdir, bash entrypoint
    /// over the node's `main.sh`.
    fn run_args(request: &NodeExecution, env: &NodeEnvironment) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];

        args.push("-v".to_string());
        args.push(format!("{}:{}", env.node_dir.display(), container::NODE_PATH));

        if let Some(input_dir) = &env.input_dir {
            args.push("-v".to_string());
            args.push(format!("{}:{}", input_dir.display(), container::INPUT_PATH));
        }

        args.push("-v".to_string());
        args.push(format!(
            "{}:{}",
            env.output_dir.display(),
            container::OUTPUT_PATH
        ));

        for (key, value) in Self::environment(request, env) {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }

        args.push("--workdir".to_string());
        args.push(container::SIMULATION_PATH.to_string());
        args.push("--entrypoint".to_string());
        args.push("/bin/bash".to_string());

        args.push(env.container_image.clone());
        args.push(format!("{}/{}", container::NODE_PATH, ENTRYPOINT_FILE));

        args
    }
}

#[async_trait]
impl ExecutionStrategy for DockerStrategy {
    async fn prepare(&self, request: &NodeExecution) -> Result<NodeEnvironment, FluidizeError> {
        let project_id = &request.project.id;
        let run = request.run_number;

        let properties_path =
            self.layout
                .properties_path(project_id, &request.node_id, Some(run));
        let file: PropertiesFile = storage::read_yaml(self.store.as_ref(), &properties_path)?;

        let container_image = file
            .properties
            .container_image
            .filter(|image| !image.is_empty())
            .ok_or_else(|| {
                FluidizeError::InternalError(format!(
                    "node '{}' declares no container_image in {}",
                    request.node_id,
                    properties_path.display()
                ))
            })?;

        Ok(NodeEnvironment {
            container_image,
            node_dir: self.layout.node_path(project_id, &request.node_id, Some(run)),
            output_dir: self
                .layout
                .node_outputs_path(project_id, &request.node_id, run),
            input_dir: request
                .prev_node_id
                .as_deref()
                .map(|prev| self.layout.node_outputs_path(project_id, prev, run)),
        })
    }

    async fn execute_node(
        &self,
        request: &NodeExecution,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome, FluidizeError> {
        let env = self.prepare(request).await?;
        let executor = ProcessExecutor::new(request.run_id(), &request.node_id, self.sink.clone());

        // 1. Image pull is a precondition; a failed pull aborts before
        //    anything runs.
        let pull = executor
            .execute(
                self.command(Self::pull_args(&env.container_image)),
                &format!("Docker pull: {}", env.container_image),
                request.deadline,
                cancel,
            )
            .await
            .map_err(FluidizeError::Infrastructure)?;

        if !pull.success {
            let error = InfrastructureError::ImagePull {
                image: env.container_image.clone(),
            };
            warn!(%error, node_id = %request.node_id, "Aborting node before execution");
            return Ok(ExecutionOutcome::failure("failure: docker pull failed"));
        }

        // 2. Run the container.
        debug!(
            node_id = %request.node_id,
            image = %env.container_image,
            input = ?env.input_dir,
            "Launching container"
        );
        executor
            .execute(
                self.command(Self::run_args(request, &env)),
                &format!("Docker execution: {}", env.container_image),
                request.deadline,
                cancel,
            )
            .await
            .map_err(FluidizeError::Infrastructure)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::project::ProjectSummary;
    use std::path::PathBuf;

    fn request(prev: Option<&str>) -> NodeExecution {
        NodeExecution {
            project: ProjectSummary::new("p1"),
            node_id: "node-b".to_string(),
            prev_node_id: prev.map(str::to_string),
            run_number: 1,
            deadline: None,
        }
    }

    fn env(input: bool) -> NodeEnvironment {
        NodeEnvironment {
            container_image: "ghcr.io/acme/sim:1".to_string(),
            node_dir: PathBuf::from("/base/projects/p1/runs/run_1/node-b"),
            output_dir: PathBuf::from("/base/projects/p1/runs/run_1/node-b/outputs"),
            input_dir: input.then(|| PathBuf::from("/base/projects/p1/runs/run_1/node-a/outputs")),
        }
    }

    #[test]
    fn test_environment_without_predecessor() {
        let vars = DockerStrategy::environment(&request(None), &env(false));

        assert_eq!(vars.get("FLUIDIZE_NODE_ID").unwrap(), "node-b");
        assert_eq!(vars.get("FLUIDIZE_NODE_PATH").unwrap(), "/fluidize/node");
        assert_eq!(
            vars.get("FLUIDIZE_SIMULATION_PATH").unwrap(),
            "/fluidize/node/source"
        );
        assert_eq!(vars.get("FLUIDIZE_OUTPUT_PATH").unwrap(), "/fluidize/outputs");
        assert_eq!(vars.get("FLUIDIZE_EXECUTION_MODE").unwrap(), "local_docker");
        assert!(!vars.contains_key("FLUIDIZE_INPUT_PATH"));
        assert_eq!(vars.len(), 5);
    }

    #[test]
    fn test_environment_with_predecessor_adds_input_path() {
        let vars = DockerStrategy::environment(&request(Some("node-a")), &env(true));

        assert_eq!(vars.get("FLUIDIZE_INPUT_PATH").unwrap(), "/fluidize/inputs");
        assert_eq!(vars.len(), 6);
    }

    #[test]
    fn test_run_args_shape() {
        let args = DockerStrategy::run_args(&request(Some("node-a")), &env(true));

        assert_eq!(args[0], "run");
        assert_eq!(args[1], "--rm");
        assert!(args.contains(&format!(
            "/base/projects/p1/runs/run_1/node-b:{}",
            container::NODE_PATH
        )));
        assert!(args.contains(&format!(
            "/base/projects/p1/runs/run_1/node-a/outputs:{}",
            container::INPUT_PATH
        )));
        assert!(args.contains(&format!(
            "/base/projects/p1/runs/run_1/node-b/outputs:{}",
            container::OUTPUT_PATH
        )));

        // Workdir is the in-container simulation path
        let workdir = args.iter().position(|a| a == "--workdir").unwrap();
        assert_eq!(args[workdir + 1], container::SIMULATION_PATH);

        // Entrypoint override runs the node's main.sh under bash
        let entrypoint = args.iter().position(|a| a == "--entrypoint").unwrap();
        assert_eq!(args[entrypoint + 1], "/bin/bash");
        assert_eq!(args[args.len() - 2], "ghcr.io/acme/sim:1");
        assert_eq!(args[args.len() - 1], "/fluidize/node/main.sh");
    }

    #[test]
    fn test_run_args_without_input_mount() {
        let args = DockerStrategy::run_args(&request(None), &env(false));

        assert!(!args.iter().any(|a| a.contains(container::INPUT_PATH)));
        assert!(!args.iter().any(|a| a.contains("FLUIDIZE_INPUT_PATH")));
    }

    fn strategy_in(dir: &std::path::Path) -> DockerStrategy {
        use crate::infrastructure::logs::TracingLogSink;
        use crate::infrastructure::storage::LocalStorage;
        DockerStrategy::new(
            Layout::new(dir),
            Arc::new(LocalStorage::new()),
            Arc::new(TracingLogSink::new()),
        )
    }

    #[tokio::test]
    async fn test_prepare_resolves_run_scoped_paths() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let properties = dir
            .path()
            .join("projects/p1/runs/run_1/node-b/properties.yaml");
        std::fs::create_dir_all(properties.parent().unwrap())?;
        std::fs::write(
            &properties,
            "properties:\n  container_image: ghcr.io/acme/sim:1\n",
        )?;

        let env = strategy_in(dir.path()).prepare(&request(Some("node-a"))).await?;

        assert_eq!(env.container_image, "ghcr.io/acme/sim:1");
        assert_eq!(
            env.node_dir,
            dir.path().join("projects/p1/runs/run_1/node-b")
        );
        assert_eq!(
            env.output_dir,
            dir.path().join("projects/p1/runs/run_1/node-b/outputs")
        );
        // The input directory is the predecessor's outputs
        assert_eq!(
            env.input_dir.as_deref(),
            Some(
                dir.path()
                    .join("projects/p1/runs/run_1/node-a/outputs")
                    .as_path()
            )
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_prepare_rejects_node_without_image() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let properties = dir
            .path()
            .join("projects/p1/runs/run_1/node-b/properties.yaml");
        std::fs::create_dir_all(properties.parent().unwrap())?;
        std::fs::write(&properties, "properties: {}\n")?;

        let result = strategy_in(dir.path()).prepare(&request(None)).await;

        assert!(matches!(result, Err(FluidizeError::InternalError(_))));
        Ok(())
    }
}
