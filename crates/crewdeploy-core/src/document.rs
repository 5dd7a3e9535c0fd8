//! Loading configuration documents from JSON or YAML files.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{DeployError, Result};

/// Parse a document, picking the format from the file extension.
/// `.yaml`/`.yml` are read as YAML, everything else as JSON.
pub fn from_path<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        DeployError::Io(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => from_yaml(&content),
        _ => serde_json::from_str(&content).map_err(|e| {
            DeployError::Serialization(format!(
                "Failed to parse JSON '{}': {}",
                path.display(),
                e
            ))
        }),
    }
}

pub fn from_yaml<T: DeserializeOwned>(yaml: &str) -> Result<T> {
    serde_yaml::from_str(yaml)
        .map_err(|e| DeployError::Serialization(format!("Failed to parse YAML: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_path_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("doc.json");
        std::fs::write(&json_path, r#"{"a": "1"}"#).unwrap();
        let doc: HashMap<String, String> = from_path(&json_path).unwrap();
        assert_eq!(doc["a"], "1");

        let yaml_path = dir.path().join("doc.yml");
        std::fs::write(&yaml_path, "a: \"2\"\n").unwrap();
        let doc: HashMap<String, String> = from_path(&yaml_path).unwrap();
        assert_eq!(doc["a"], "2");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = from_path::<HashMap<String, String>>("/nonexistent/crew.json").unwrap_err();
        assert!(matches!(err, DeployError::Io(_)));
    }
}
