use thiserror::Error;

/// A raw definition whose data does not match any accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
  #[error("workflow definition must be an object")]
  NotAnObject,

  #[error("'initialStatusId' must be a string")]
  InvalidInitialStatus,

  #[error("status collection must be a list or a map")]
  InvalidStatusCollection,

  #[error("invalid status entry: {0}")]
  InvalidStatusEntry(String),

  #[error("invalid definition for status '{status}': expected null, a status id or an object")]
  InvalidStatusConfig { status: String },

  #[error("invalid metadata for '{owner}': must be a map with string keys")]
  InvalidMetadata { owner: String },

  #[error("invalid transition definition for status '{status}': {reason}")]
  InvalidTransition { status: String, reason: String },

  #[error("label of status '{status}' must be a string")]
  InvalidLabel { status: String },
}
