// fluidize-core/src/lib.rs

#![allow(missing_docs)]

// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the core depends on (Storage, ExecutionStrategy, LogSink).
pub mod ports;

// 2. Domain (Core model)
// Graph container, execution planner, project and run types.
pub mod domain;

// 3. Infrastructure (Adapters)
// Local filesystem storage, path layout, process execution, Docker.
pub mod infrastructure;

// 4. Application (Use Cases)
// Project store, graph processor, run workspace, run orchestrator.
pub mod application;

// --- CLIENT FACADE ---
// Thin routing surface: `Fluidize` -> `Project` -> `.graph()` / `.runs()`.
pub mod client;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use client::{Fluidize, Project};
pub use error::FluidizeError;
