use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::IdContext;
use crate::error::IdError;

/// Separates the workflow id from the local id in a canonical status id.
pub const SEPARATOR: char = '/';

/// A letter followed by zero or more letters, digits or hyphens.
fn is_valid_id(id: &str) -> bool {
  let mut chars = id.chars();
  match chars.next() {
    Some(first) if first.is_ascii_alphabetic() => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
    _ => false,
  }
}

pub fn is_valid_workflow_id(id: &str) -> bool {
  is_valid_id(id)
}

pub fn is_valid_status_local_id(id: &str) -> bool {
  is_valid_id(id)
}

/// True if `raw` is a fully qualified status id (`workflowId/localId`).
pub fn is_valid_status_id(raw: &str) -> bool {
  StatusId::parse(raw, IdContext::None).is_ok()
}

/// Fails with [`IdError::InvalidWorkflowId`] unless `id` is a valid workflow id.
pub fn validate_workflow_id(id: &str) -> Result<(), IdError> {
  if is_valid_workflow_id(id) {
    Ok(())
  } else {
    Err(IdError::InvalidWorkflowId {
      raw: id.to_string(),
    })
  }
}

/// Canonical status identifier: a `(workflowId, localId)` pair, written
/// `workflowId/localId`. Unique across every workflow of a source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StatusId {
  workflow_id: String,
  local_id: String,
}

impl StatusId {
  /// Build a status id from its two parts, validating both.
  pub fn new(workflow_id: impl Into<String>, local_id: impl Into<String>) -> Result<Self, IdError> {
    let workflow_id = workflow_id.into();
    let local_id = local_id.into();
    if !is_valid_workflow_id(&workflow_id) || !is_valid_status_local_id(&local_id) {
      return Err(IdError::InvalidStatusId {
        raw: format!("{workflow_id}{SEPARATOR}{local_id}"),
      });
    }
    Ok(Self {
      workflow_id,
      local_id,
    })
  }

  /// Parse `raw` into a canonical status id.
  ///
  /// A raw value without separator is a local id; its workflow id comes
  /// from `context`. More than one separator is always invalid.
  pub fn parse(raw: &str, context: IdContext<'_>) -> Result<Self, IdError> {
    let invalid = || IdError::InvalidStatusId {
      raw: raw.to_string(),
    };
    if raw.is_empty() {
      return Err(invalid());
    }

    let mut parts = raw.split(SEPARATOR);
    let (workflow_id, local_id) = match (parts.next(), parts.next(), parts.next()) {
      (Some(workflow_id), Some(local_id), None) => (workflow_id, local_id),
      (Some(local_id), None, None) => {
        let workflow_id = context
          .workflow_id()
          .ok_or_else(|| IdError::UnresolvedWorkflow {
            raw: raw.to_string(),
          })?;
        (workflow_id, local_id)
      }
      _ => return Err(invalid()),
    };

    if !is_valid_workflow_id(workflow_id) || !is_valid_status_local_id(local_id) {
      return Err(invalid());
    }

    Ok(Self {
      workflow_id: workflow_id.to_string(),
      local_id: local_id.to_string(),
    })
  }

  pub fn workflow_id(&self) -> &str {
    &self.workflow_id
  }

  pub fn local_id(&self) -> &str {
    &self.local_id
  }

  /// True if this status belongs to `workflow_id`.
  pub fn belongs_to(&self, workflow_id: &str) -> bool {
    self.workflow_id == workflow_id
  }
}

impl fmt::Display for StatusId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}{}", self.workflow_id, SEPARATOR, self.local_id)
  }
}

impl FromStr for StatusId {
  type Err = IdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s, IdContext::None)
  }
}

impl TryFrom<String> for StatusId {
  type Error = IdError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<StatusId> for String {
  fn from(id: StatusId) -> Self {
    id.to_string()
  }
}
