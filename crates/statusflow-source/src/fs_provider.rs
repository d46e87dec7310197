use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use statusflow_workflow::is_valid_workflow_id;

use crate::error::ProviderError;
use crate::provider::DefinitionProvider;

/// Extensions looked up for a workflow, in order.
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Filesystem-based definition provider.
///
/// Each workflow is a single file named after its id:
/// ```text
/// {root}/
/// ├── Order.json
/// └── Invoice.yaml
/// ```
/// A missing file means the workflow does not exist.
#[derive(Debug, Clone)]
pub struct FsDefinitionProvider {
  root: PathBuf,
}

impl FsDefinitionProvider {
  /// Create a new provider reading from the given directory.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Ids of every workflow with a definition file under the root, sorted.
  pub fn workflow_ids(&self) -> Result<Vec<String>, ProviderError> {
    let io_error = |source: std::io::Error| ProviderError::Io {
      path: self.root.clone(),
      source,
    };

    let mut ids = Vec::new();
    for entry in fs::read_dir(&self.root).map_err(io_error)? {
      let path = entry.map_err(io_error)?.path();
      if !path.is_file() {
        continue;
      }
      let (Some(stem), Some(extension)) = (
        path.file_stem().and_then(|s| s.to_str()),
        path.extension().and_then(|e| e.to_str()),
      ) else {
        continue;
      };
      if EXTENSIONS.contains(&extension) && is_valid_workflow_id(stem) {
        ids.push(stem.to_string());
      }
    }

    ids.sort();
    ids.dedup();
    Ok(ids)
  }

  /// First existing definition file for `workflow_id`.
  fn definition_path(&self, workflow_id: &str) -> Option<PathBuf> {
    EXTENSIONS
      .iter()
      .map(|extension| self.root.join(format!("{workflow_id}.{extension}")))
      .find(|path| path.is_file())
  }
}

impl DefinitionProvider for FsDefinitionProvider {
  fn fetch(&self, workflow_id: &str) -> Result<Option<Value>, ProviderError> {
    // Ids never contain path separators, so the lookup stays under the root.
    if !is_valid_workflow_id(workflow_id) {
      return Ok(None);
    }
    let Some(path) = self.definition_path(workflow_id) else {
      return Ok(None);
    };

    let content = fs::read_to_string(&path).map_err(|source| ProviderError::Io {
      path: path.clone(),
      source,
    })?;

    let parsed: Result<Value, String> = if path.extension().is_some_and(|e| e == "json") {
      serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
      serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed
      .map(Some)
      .map_err(|message| ProviderError::Parse { path, message })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_fetch_json_and_yaml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
      dir.path().join("Order.json"),
      r#"{ "initialStatusId": "new", "status": ["new"] }"#,
    )
    .unwrap();
    fs::write(
      dir.path().join("Invoice.yaml"),
      "initialStatusId: draft\nstatus:\n  draft:\n    transition: sent\n  sent: ~\n",
    )
    .unwrap();

    let provider = FsDefinitionProvider::new(dir.path());

    assert_eq!(
      provider.fetch("Order").unwrap(),
      Some(json!({ "initialStatusId": "new", "status": ["new"] }))
    );
    assert_eq!(
      provider.fetch("Invoice").unwrap(),
      Some(json!({
        "initialStatusId": "draft",
        "status": { "draft": { "transition": "sent" }, "sent": null }
      }))
    );
  }

  #[test]
  fn test_missing_definition_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FsDefinitionProvider::new(dir.path());

    assert!(provider.fetch("Order").unwrap().is_none());
    assert!(provider.fetch("../Order").unwrap().is_none());
  }

  #[test]
  fn test_unparsable_definition_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Order.json"), "{ not json").unwrap();

    let provider = FsDefinitionProvider::new(dir.path());
    assert!(matches!(
      provider.fetch("Order"),
      Err(ProviderError::Parse { .. })
    ));
  }

  #[test]
  fn test_workflow_ids() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Order.json"), "{}").unwrap();
    fs::write(dir.path().join("Invoice.yml"), "{}").unwrap();
    fs::write(dir.path().join("Order.yaml"), "{}").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::write(dir.path().join("1bad.json"), "{}").unwrap();
    fs::create_dir(dir.path().join("nested.json")).unwrap();

    let provider = FsDefinitionProvider::new(dir.path());
    assert_eq!(provider.workflow_ids().unwrap(), vec!["Invoice", "Order"]);
  }

  #[test]
  fn test_workflow_ids_missing_root() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FsDefinitionProvider::new(dir.path().join("absent"));
    assert!(matches!(
      provider.workflow_ids(),
      Err(ProviderError::Io { .. })
    ));
  }
}
