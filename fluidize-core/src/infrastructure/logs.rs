// fluidize-core/src/infrastructure/logs.rs

use tracing::{error, info};

use crate::ports::logs::{LogLevel, LogSink};

/// Default sink: forwards run output into the process-wide `tracing`
/// subscriber, keyed by run and node so lines stay attributable.
#[derive(Debug, Default, Clone)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingLogSink {
    fn broadcast(&self, run_id: &str, node_id: &str, level: LogLevel, line: &str) {
        match level {
            LogLevel::Info => info!(target: "container", run_id, node_id, "{line}"),
            LogLevel::Error => error!(target: "container", run_id, node_id, "{line}"),
        }
    }
}
