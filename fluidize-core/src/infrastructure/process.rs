// fluidize-core/src/infrastructure/process.rs

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::error::InfrastructureError;
use crate::ports::execution::ExecutionOutcome;
use crate::ports::logs::{LogLevel, LogSink};

/// Runs a child process and streams every output line to the log sink,
/// tagged with the owning run and node.
pub struct ProcessExecutor {
    run_id: String,
    node_id: String,
    sink: Arc<dyn LogSink>,
}

enum Waited {
    Finished(std::process::ExitStatus),
    Cancelled,
    TimedOut,
}

impl ProcessExecutor {
    pub fn new(
        run_id: impl Into<String>,
        node_id: impl Into<String>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            node_id: node_id.into(),
            sink,
        }
    }

    /// Executes `command` to completion.
    ///
    /// Emits `Starting: <description>`, one event per stdout/stderr
    /// line, then `Completed: <description>` or an error line. Expected
    /// failures (nonzero exit, cancellation, deadline) come back as
    /// unsuccessful outcomes; only spawn-level faults are `Err`.
    pub async fn execute(
        &self,
        mut command: Command,
        description: &str,
        deadline: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome, InfrastructureError> {
        self.emit(LogLevel::Info, &format!("Starting: {description}"));

        command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // The child moves into this future; dropping it on cancel or
        // timeout kills the process (kill_on_drop).
        let work = async move {
            tokio::join!(self.stream_lines(stdout), self.stream_lines(stderr));
            child.wait().await
        };
        tokio::pin!(work);

        let waited = tokio::select! {
            status = &mut work => Waited::Finished(status?),
            _ = cancel.cancelled() => Waited::Cancelled,
            _ = sleep_until_deadline(deadline) => Waited::TimedOut,
        };

        match waited {
            Waited::Finished(status) if status.success() => {
                self.emit(LogLevel::Info, &format!("Completed: {description}"));
                Ok(ExecutionOutcome::succeeded())
            }
            Waited::Finished(status) => {
                let code = status.code().unwrap_or(-1);
                let message = format!("{description} failed with return code: {code}");
                self.emit(LogLevel::Error, &message);
                Ok(ExecutionOutcome::failure(format!("failure: {message}")).with_exit_code(code))
            }
            Waited::Cancelled => {
                let message = format!("{description} cancelled");
                self.emit(LogLevel::Error, &message);
                Ok(ExecutionOutcome::failure(format!("failure: {message}")))
            }
            Waited::TimedOut => {
                let message = format!("{description} timed out");
                self.emit(LogLevel::Error, &message);
                Ok(ExecutionOutcome::failure(format!("failure: {message}")))
            }
        }
    }

    async fn stream_lines(&self, pipe: Option<impl AsyncRead + Unpin>) {
        let Some(pipe) = pipe else { return };
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !line.is_empty() {
                self.emit(LogLevel::Info, &line);
            }
        }
    }

    fn emit(&self, level: LogLevel, line: &str) {
        self.sink.broadcast(&self.run_id, &self.node_id, level, line);
    }
}

async fn sleep_until_deadline(deadline: Option<Duration>) {
    match deadline {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}
