// fluidize-core/src/domain/project/summary.rs

use serde::{Deserialize, Serialize};

fn default_metadata_version() -> String {
    "1.0".to_string()
}

/// A project as listed and persisted in its `metadata.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default = "default_metadata_version")]
    pub metadata_version: String,
}

impl ProjectSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            description: String::new(),
            location: String::new(),
            status: String::new(),
            metadata_version: default_metadata_version(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// On-disk wrapper: `metadata.yaml` nests the summary under a `project:` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub project: ProjectSummary,
}
