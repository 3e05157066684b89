// fluidize-core/src/application/simulations.rs

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::FluidizeError;
use crate::infrastructure::layout::Layout;
use crate::ports::storage::{self, Storage};

/// One entry of the local simulation template library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Enumerates `simulations/`. A directory is a template iff it carries
/// a `metadata.yaml`; anything else is skipped. Metadata contents are
/// read leniently: templates author their own schema, the engine only
/// surfaces a label and description when present.
pub fn list_templates(
    store: &dyn Storage,
    layout: &Layout,
) -> Result<Vec<TemplateSummary>, FluidizeError> {
    let mut templates = Vec::new();

    for dir in store.list_dirs(&layout.simulations_path())? {
        let Some(id) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let metadata_path = layout.simulation_metadata_path(id);
        if !store.exists(&metadata_path) {
            debug!(id, "Skipping directory without template metadata");
            continue;
        }

        let value: serde_yaml::Value = match storage::read_yaml(store, &metadata_path) {
            Ok(value) => value,
            Err(e) => {
                warn!(id, error = %e, "Skipping template with unreadable metadata");
                continue;
            }
        };

        templates.push(TemplateSummary {
            id: id.to_string(),
            label: lookup(&value, "label"),
            description: lookup(&value, "description"),
        });
    }

    Ok(templates)
}

/// Finds a string field at the top level or nested under `metadata:`.
fn lookup(value: &serde_yaml::Value, key: &str) -> Option<String> {
    if let Some(found) = value.get(key).and_then(|v| v.as_str()) {
        return Some(found.to_string());
    }
    value
        .get("metadata")
        .and_then(|m| m.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
