// fluidize-core/src/domain/run/mod.rs

use serde::{Deserialize, Serialize};

/// Caller-supplied description of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFlowPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RunFlowPayload {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Persisted `metadata.yaml` of a run. Written once at start, updated
/// in place by the background flow as the run progresses; never touched
/// after the run finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub status: RunStatus,
    /// Failure detail, present only for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RunMetadata {
    pub fn started(payload: &RunFlowPayload, created_at: String) -> Self {
        Self {
            name: payload.name.clone(),
            description: payload.description.clone(),
            tags: payload.tags.clone(),
            created_at,
            status: RunStatus::Running,
            message: None,
        }
    }
}

/// What `run_flow` hands back synchronously: the run has been admitted
/// and numbered, and proceeds in the background.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowResponse {
    pub flow_status: RunStatus,
    pub run_number: u32,
}
