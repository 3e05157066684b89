// fluidize-core/src/domain/project/node.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// User-authored properties of a node's workspace, read by the executor.
/// Lives in `properties.yaml` under a `properties:` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeProperties {
    /// Image the node's container is launched from. Execution fails
    /// without it; graph editing does not require it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_id: Option<String>,
}

/// On-disk wrapper for `properties.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertiesFile {
    #[serde(default)]
    pub properties: NodeProperties,
}

/// User-tunable values the container reads at runtime; `parameters.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeParameters {
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// `parameters.json` and the node parameters share the same shape; the
/// alias keeps call sites readable where the project-level file is meant.
pub type ParametersFile = NodeParameters;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_yaml_shape() {
        let yaml = "\
properties:
  container_image: ghcr.io/acme/sim:1.2
  node_type: simulation
";
        let file: PropertiesFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            file.properties.container_image.as_deref(),
            Some("ghcr.io/acme/sim:1.2")
        );
    }

    #[test]
    fn test_empty_properties_round_trip() {
        let file = PropertiesFile::default();
        let yaml = serde_yaml::to_string(&file).unwrap();
        assert!(yaml.contains("properties"));

        let back: PropertiesFile = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_default_parameters_json_shape() {
        let json = serde_json::to_string(&NodeParameters::default()).unwrap();
        assert_eq!(json, r#"{"metadata":{},"parameters":{}}"#);
    }
}
