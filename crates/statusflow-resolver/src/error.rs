use statusflow_config::ShapeError;
use statusflow_workflow::{IdError, StatusId};
use thiserror::Error;

/// A raw definition that cannot be normalized into a well-formed workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
  #[error("missing 'initialStatusId'")]
  MissingInitialStatus,

  #[error("missing status collection")]
  MissingStatuses,

  #[error(transparent)]
  Shape(#[from] ShapeError),

  #[error(transparent)]
  InvalidId(#[from] IdError),

  /// The same canonical status id is declared twice.
  #[error("duplicate status id: {id}")]
  DuplicateStatus { id: StatusId },

  /// A status declared in the definition of another workflow.
  #[error("status '{id}' does not belong to workflow '{workflow_id}'")]
  ForeignStatus { id: StatusId, workflow_id: String },

  #[error("initial status '{id}' is not declared")]
  InitialStatusNotDeclared { id: StatusId },

  #[error("transition from '{start}' targets undeclared status '{end}'")]
  UndeclaredTarget { start: StatusId, end: StatusId },
}
