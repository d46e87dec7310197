use std::path::PathBuf;

use statusflow_resolver::DefinitionError;
use statusflow_workflow::{IdError, StatusId};
use thiserror::Error;

use crate::class_map::EntityKind;

/// Errors raised by a [`Source`](crate::Source).
#[derive(Debug, Error)]
pub enum SourceError {
  #[error(transparent)]
  Id(#[from] IdError),

  /// The definition of the workflow is malformed. This is the only variant
  /// caused by the content of a definition; see [`SourceError::is_validation`].
  #[error("invalid definition for workflow '{workflow_id}': {source}")]
  Definition {
    workflow_id: String,
    #[source]
    source: DefinitionError,
  },

  #[error("workflow not found: {workflow_id}")]
  WorkflowNotFound { workflow_id: String },

  #[error("status not found: {id}")]
  StatusNotFound { id: StatusId },

  #[error("failed to load the definition of workflow '{workflow_id}'")]
  Provider {
    workflow_id: String,
    #[source]
    source: ProviderError,
  },

  #[error("invalid class map: {0}")]
  InvalidClassMap(String),

  #[error("no {kind} factory registered for selector '{selector}'")]
  UnknownFactory { kind: EntityKind, selector: String },
}

impl SourceError {
  /// True if the error comes from a malformed definition rather than from a
  /// lookup or a misuse.
  pub fn is_validation(&self) -> bool {
    matches!(self, SourceError::Definition { .. })
  }
}

/// Errors raised by a [`DefinitionProvider`](crate::DefinitionProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("failed to read {}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {}: {message}", .path.display())]
  Parse { path: PathBuf, message: String },

  #[error("definition provider unavailable: {0}")]
  Unavailable(String),
}
