use thiserror::Error;

/// Errors raised while parsing or completing identifiers.
///
/// Every variant carries the raw value that was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
  #[error("invalid status id: '{raw}'")]
  InvalidStatusId { raw: String },

  #[error("invalid workflow id: '{raw}'")]
  InvalidWorkflowId { raw: String },

  /// A local status id was given and no workflow id could be resolved
  /// from the context.
  #[error("no workflow id can be resolved for status id '{raw}'")]
  UnresolvedWorkflow { raw: String },
}
