// fluidize-core/src/ports/execution.rs

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::project::ProjectSummary;
use crate::error::FluidizeError;

/// One node execution request, as the orchestrator hands it to a
/// strategy: which node, which (single) upstream node feeds its inputs,
/// and which run workspace to operate in.
#[derive(Debug, Clone)]
pub struct NodeExecution {
    pub project: ProjectSummary,
    pub node_id: String,
    pub prev_node_id: Option<String>,
    pub run_number: u32,
    /// Optional per-node deadline, propagated to the container runtime.
    pub deadline: Option<Duration>,
}

impl NodeExecution {
    pub fn run_id(&self) -> String {
        format!("run_{}", self.run_number)
    }
}

/// Host-side environment a strategy resolves before launching anything.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEnvironment {
    pub container_image: String,
    /// Run-scoped node directory (the copied workspace).
    pub node_dir: PathBuf,
    /// Where the node must deposit its results.
    pub output_dir: PathBuf,
    /// The predecessor's output directory, when one exists.
    pub input_dir: Option<PathBuf>,
}

/// Terminal result of one node execution. Expected failures (pull
/// errors, nonzero exits) are outcomes, not `Err`: the run continues to
/// exist and records the message.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub message: String,
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl ExecutionOutcome {
    pub fn succeeded() -> Self {
        Self {
            message: "success".to_string(),
            success: true,
            exit_code: Some(0),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
            exit_code: None,
        }
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }
}

/// Policy turning a node into a concrete process invocation. One
/// implementation per execution target (local container, remote VM,
/// cluster job); the orchestrator receives one by injection.
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    /// Resolves the node's image and host paths from its on-disk
    /// specification, without side effects.
    async fn prepare(&self, request: &NodeExecution) -> Result<NodeEnvironment, FluidizeError>;

    /// Runs the node to completion, streaming its output. Cancellation
    /// is best-effort: the active child is signalled and the outcome
    /// reports failure.
    async fn execute_node(
        &self,
        request: &NodeExecution,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome, FluidizeError>;
}
