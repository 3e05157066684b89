// fluidize-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FluidizeError {
    // --- DOMAIN ERRORS (graph invariants, planning, lookups) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, container runtime) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementations to avoid duplicate enum variants but keep ergonomics
impl From<std::io::Error> for FluidizeError {
    fn from(err: std::io::Error) -> Self {
        FluidizeError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_yaml::Error> for FluidizeError {
    fn from(err: serde_yaml::Error) -> Self {
        FluidizeError::Infrastructure(InfrastructureError::Yaml(err))
    }
}

impl From<serde_json::Error> for FluidizeError {
    fn from(err: serde_json::Error) -> Self {
        FluidizeError::Infrastructure(InfrastructureError::Json(err))
    }
}
