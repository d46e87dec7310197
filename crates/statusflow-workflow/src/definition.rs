use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::StatusId;

/// Opaque string-keyed data carried through normalization untouched.
pub type Properties = serde_json::Map<String, Value>;

/// Canonical, validated form of a workflow definition.
///
/// Produced once per workflow id by normalization and never mutated
/// afterwards; replacing the definition is the only way to change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
  pub initial_status_id: StatusId,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Properties>,
  /// Top-level keys other than the initial status, the status collection
  /// and the metadata.
  #[serde(default, skip_serializing_if = "Properties::is_empty")]
  pub properties: Properties,
  pub statuses: BTreeMap<StatusId, StatusDefinition>,
}

/// Normalized definition of one status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusDefinition {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Properties>,
  #[serde(default, skip_serializing_if = "Properties::is_empty")]
  pub properties: Properties,
  /// End status id -> per-transition configuration.
  #[serde(default)]
  pub transitions: BTreeMap<StatusId, Properties>,
}

impl WorkflowDefinition {
  pub fn status(&self, id: &StatusId) -> Option<&StatusDefinition> {
    self.statuses.get(id)
  }

  pub fn contains_status(&self, id: &StatusId) -> bool {
    self.statuses.contains_key(id)
  }

  pub fn status_ids(&self) -> impl Iterator<Item = &StatusId> {
    self.statuses.keys()
  }
}
