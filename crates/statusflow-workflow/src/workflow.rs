use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::definition::Properties;
use crate::id::StatusId;

/// A workflow resolved from its normalized definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub id: String,
  pub initial_status_id: StatusId,
  #[serde(default)]
  pub metadata: Properties,
  #[serde(default)]
  pub properties: Properties,
}

impl Workflow {
  pub fn metadata_value(&self, key: &str) -> Option<&Value> {
    self.metadata.get(key)
  }
}
