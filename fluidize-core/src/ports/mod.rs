// fluidize-core/src/ports/mod.rs

pub mod execution;
pub mod logs;
pub mod storage;

pub use execution::{ExecutionOutcome, ExecutionStrategy, NodeEnvironment, NodeExecution};
pub use logs::{LogLevel, LogSink};
pub use storage::Storage;
