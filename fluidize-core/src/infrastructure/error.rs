// fluidize-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(fluidize::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("Directory Copy Error: {0}")]
    #[diagnostic(code(fluidize::infra::copy))]
    Copy(#[from] fs_extra::error::Error),

    // --- SERIALIZATION ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(fluidize::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON Parsing Error: {0}")]
    #[diagnostic(code(fluidize::infra::json))]
    Json(#[from] serde_json::Error),

    // --- CONTAINER RUNTIME ---
    #[error("Container image pull failed for '{image}'")]
    #[diagnostic(
        code(fluidize::infra::image_pull),
        help("Is the Docker daemon running, and is the image name correct?")
    )]
    ImagePull { image: String },

    #[error("Node execution failed with exit code {code}")]
    #[diagnostic(code(fluidize::infra::container_exit))]
    ContainerExit { code: i32 },
}
