// fluidize-core/src/application/orchestrator.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::application::workspace::RunWorkspace;
use crate::domain::error::DomainError;
use crate::domain::graph::{ExecutionPlan, ExecutionPlanner, Graph};
use crate::domain::project::ProjectSummary;
use crate::domain::run::{FlowResponse, RunFlowPayload, RunMetadata, RunStatus};
use crate::error::FluidizeError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::layout::Layout;
use crate::ports::execution::{ExecutionStrategy, NodeExecution};
use crate::ports::storage::Storage;

type RunKey = (String, u32);

struct ActiveRun {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// Keeps a handle per in-flight run so callers can cancel or join a
/// background flow after `run_flow` has already returned.
#[derive(Default)]
pub struct RunSupervisor {
    active: Mutex<HashMap<RunKey, ActiveRun>>,
}

impl RunSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, key: RunKey, token: CancellationToken, handle: JoinHandle<()>) {
        if let Ok(mut active) = self.active.lock() {
            active.insert(
                key,
                ActiveRun {
                    token,
                    handle: Some(handle),
                },
            );
        }
    }

    fn finish(&self, key: &RunKey) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(key);
        }
    }

    /// Signals the run's active container and lets the flow mark itself
    /// failed. Returns false for unknown or already-finished runs.
    pub fn cancel(&self, project_id: &str, run_number: u32) -> bool {
        let key = (project_id.to_string(), run_number);
        match self.active.lock() {
            Ok(active) => match active.get(&key) {
                Some(run) => {
                    run.token.cancel();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Joins the background flow, if it is still tracked. Used by tests
    /// and by callers that want a blocking run.
    pub async fn wait(&self, project_id: &str, run_number: u32) {
        let key = (project_id.to_string(), run_number);
        let handle = match self.active.lock() {
            Ok(mut active) => active.get_mut(&key).and_then(|run| run.handle.take()),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(project_id, run_number, error = %e, "Run task panicked");
            }
        }
    }
}

/// Project-scoped run facet: admits runs, lists them, reads status.
pub struct Runs {
    project: ProjectSummary,
    layout: Layout,
    store: Arc<dyn Storage>,
    strategy: Arc<dyn ExecutionStrategy>,
    supervisor: Arc<RunSupervisor>,
    node_deadline: Option<Duration>,
}

impl Runs {
    pub fn new(
        project: ProjectSummary,
        layout: Layout,
        store: Arc<dyn Storage>,
        strategy: Arc<dyn ExecutionStrategy>,
        supervisor: Arc<RunSupervisor>,
    ) -> Self {
        Self {
            project,
            layout,
            store,
            strategy,
            supervisor,
            node_deadline: None,
        }
    }

    /// Applies a per-node deadline, propagated to the container runtime.
    pub fn with_node_deadline(mut self, deadline: Duration) -> Self {
        self.node_deadline = Some(deadline);
        self
    }

    /// Admits a run and returns immediately.
    ///
    /// Load -> plan -> reject empty -> materialize workspace -> spawn.
    /// The caller gets the run number; the flow proceeds on a background
    /// task that records its terminal status in the run's metadata.
    #[instrument(skip(self, payload), fields(project_id = %self.project.id))]
    pub async fn run_flow(&self, payload: RunFlowPayload) -> Result<FlowResponse, FluidizeError> {
        let mut graph = Graph::load(
            self.store.as_ref(),
            &self.layout.graph_path(&self.project.id),
        )?;
        graph.heal();

        let plan = ExecutionPlanner::plan(&graph)?;
        if plan.order.is_empty() {
            return Err(DomainError::NoNodesToRun.into());
        }

        let workspace = RunWorkspace::new(self.layout.clone(), self.store.clone());
        let run_number = workspace.prepare_run(&self.project.id, &payload, &graph)?;
        info!(
            run_number,
            nodes = plan.order.len(),
            "Run admitted, executing in background"
        );

        let token = CancellationToken::new();
        let flow = Flow {
            project: self.project.clone(),
            plan,
            strategy: self.strategy.clone(),
            workspace,
            supervisor: self.supervisor.clone(),
            run_number,
            token: token.clone(),
            node_deadline: self.node_deadline,
        };
        let handle = tokio::spawn(flow.execute());
        self.supervisor
            .register((self.project.id.clone(), run_number), token, handle);

        Ok(FlowResponse {
            flow_status: RunStatus::Running,
            run_number,
        })
    }

    pub fn list(&self) -> Result<Vec<u32>, FluidizeError> {
        RunWorkspace::new(self.layout.clone(), self.store.clone()).list_runs(&self.project.id)
    }

    pub fn get_status(&self, run_number: u32) -> Result<RunMetadata, FluidizeError> {
        RunWorkspace::new(self.layout.clone(), self.store.clone())
            .read_metadata(&self.project.id, run_number)
    }

    /// Best-effort cancellation of an in-flight run.
    pub fn cancel(&self, run_number: u32) -> bool {
        self.supervisor.cancel(&self.project.id, run_number)
    }

    /// Blocks until the background flow of `run_number` finishes.
    pub async fn wait(&self, run_number: u32) {
        self.supervisor.wait(&self.project.id, run_number).await;
    }
}

/// One background run: owns everything it needs, executes nodes
/// sequentially in planner order, short-circuits on failure.
struct Flow {
    project: ProjectSummary,
    plan: ExecutionPlan,
    strategy: Arc<dyn ExecutionStrategy>,
    workspace: RunWorkspace,
    supervisor: Arc<RunSupervisor>,
    run_number: u32,
    token: CancellationToken,
    node_deadline: Option<Duration>,
}

impl Flow {
    async fn execute(self) {
        let key = (self.project.id.clone(), self.run_number);
        let (status, message) = self.execute_nodes().await;
        if let Err(e) = self
            .workspace
            .finish(&self.project.id, self.run_number, status, message)
        {
            error!(
                project_id = %self.project.id,
                run_number = self.run_number,
                error = %e,
                "Could not record run status"
            );
        }
        self.supervisor.finish(&key);
    }

    async fn execute_nodes(&self) -> (RunStatus, Option<String>) {
        for node_id in &self.plan.order {
            if self.token.is_cancelled() {
                warn!(node_id = %node_id, "Run cancelled, skipping remaining nodes");
                return (RunStatus::Failed, Some("failure: run cancelled".into()));
            }

            if let Some(upstream) = self.plan.predecessors.get(node_id) {
                if upstream.len() > 1 {
                    warn!(
                        node_id = %node_id,
                        upstream = ?upstream,
                        "Node has multiple predecessors; inputs come from the first by id"
                    );
                }
            }

            let request = NodeExecution {
                project: self.project.clone(),
                node_id: node_id.clone(),
                prev_node_id: self.plan.input_source(node_id).map(str::to_string),
                run_number: self.run_number,
                deadline: self.node_deadline,
            };

            match self.strategy.execute_node(&request, &self.token).await {
                Ok(outcome) if outcome.success => {
                    debug!(node_id = %node_id, "Node completed");
                }
                Ok(outcome) => {
                    if let Some(code) = outcome.exit_code.filter(|&c| c != 0) {
                        let error = InfrastructureError::ContainerExit { code };
                        warn!(node_id = %node_id, %error, "Aborting run");
                    } else {
                        warn!(node_id = %node_id, message = %outcome.message, "Aborting run");
                    }
                    return (RunStatus::Failed, Some(outcome.message));
                }
                Err(e) => {
                    error!(node_id = %node_id, error = %e, "Node execution errored, aborting run");
                    return (RunStatus::Failed, Some(format!("failure: {e}")));
                }
            }
        }
        (RunStatus::Completed, None)
    }
}
