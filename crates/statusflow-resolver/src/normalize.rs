use std::collections::BTreeMap;

use serde_json::Value;
use statusflow_config::{RawDefinition, StatusConfig};
use statusflow_workflow::{
  IdContext, StatusDefinition, StatusId, WorkflowDefinition, validate_workflow_id,
};
use tracing::warn;

use crate::error::DefinitionError;

/// Normalize the raw definition of `workflow_id`.
///
/// Every id is canonicalized with `workflow_id` as the fallback workflow,
/// then the graph is checked:
/// 1. the initial status is declared
/// 2. every transition target in `workflow_id` is declared
///
/// Targets in other workflows are not checked here.
pub fn normalize(workflow_id: &str, raw: Value) -> Result<WorkflowDefinition, DefinitionError> {
  normalize_raw(workflow_id, RawDefinition::from_value(raw)?)
}

/// Same as [`normalize`], for an already decoded definition.
pub fn normalize_raw(
  workflow_id: &str,
  raw: RawDefinition,
) -> Result<WorkflowDefinition, DefinitionError> {
  validate_workflow_id(workflow_id)?;
  let context = IdContext::Workflow(workflow_id);

  let initial = raw
    .initial_status_id
    .ok_or(DefinitionError::MissingInitialStatus)?;
  let initial_status_id = StatusId::parse(&initial, context)?;

  let entries = raw.statuses.ok_or(DefinitionError::MissingStatuses)?;

  let mut statuses = BTreeMap::new();
  for entry in entries {
    let (raw_id, config) = entry.into_parts();
    let id = StatusId::parse(&raw_id, context)?;
    if !id.belongs_to(workflow_id) {
      return Err(DefinitionError::ForeignStatus {
        id,
        workflow_id: workflow_id.to_string(),
      });
    }
    let status = normalize_status(&id, config, context)?;
    if statuses.insert(id.clone(), status).is_some() {
      return Err(DefinitionError::DuplicateStatus { id });
    }
  }

  let definition = WorkflowDefinition {
    initial_status_id,
    metadata: raw.metadata,
    properties: raw.properties,
    statuses,
  };
  validate(workflow_id, &definition)?;
  Ok(definition)
}

fn normalize_status(
  id: &StatusId,
  config: StatusConfig,
  context: IdContext<'_>,
) -> Result<StatusDefinition, DefinitionError> {
  let mut transitions = BTreeMap::new();
  if let Some(spec) = config.transitions {
    for (raw_end, transition_config) in spec.into_targets() {
      let end = StatusId::parse(&raw_end, context)?;
      if transitions.insert(end.clone(), transition_config).is_some() {
        warn!(start = %id, end = %end, "duplicate transition target, keeping the last one");
      }
    }
  }

  Ok(StatusDefinition {
    label: config.label,
    metadata: config.metadata,
    properties: config.properties,
    transitions,
  })
}

/// Check that the initial status and every same-workflow transition target
/// are declared.
fn validate(workflow_id: &str, definition: &WorkflowDefinition) -> Result<(), DefinitionError> {
  if !definition.contains_status(&definition.initial_status_id) {
    return Err(DefinitionError::InitialStatusNotDeclared {
      id: definition.initial_status_id.clone(),
    });
  }

  for (start, status) in &definition.statuses {
    for end in status.transitions.keys() {
      if end.belongs_to(workflow_id) && !definition.contains_status(end) {
        return Err(DefinitionError::UndeclaredTarget {
          start: start.clone(),
          end: end.clone(),
        });
      }
    }
  }

  Ok(())
}
