use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::Properties;
use crate::id::StatusId;

/// A status of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
  pub id: StatusId,
  /// Explicit label, or the humanized local id.
  pub label: String,
  #[serde(default)]
  pub metadata: Properties,
  #[serde(default)]
  pub properties: Properties,
}

impl Status {
  pub fn workflow_id(&self) -> &str {
    self.id.workflow_id()
  }

  pub fn local_id(&self) -> &str {
    self.id.local_id()
  }

  pub fn metadata_value(&self, key: &str) -> Option<&Value> {
    self.metadata.get(key)
  }
}
