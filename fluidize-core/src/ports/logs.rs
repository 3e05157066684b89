// fluidize-core/src/ports/logs.rs

/// Severity tag attached to every forwarded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Delivery seam for per-node run output. The core emits lines in the
/// order it reads them from the child process; where they go (stdout,
/// file, pub-sub) is the sink's business.
pub trait LogSink: Send + Sync {
    fn broadcast(&self, run_id: &str, node_id: &str, level: LogLevel, line: &str);
}
