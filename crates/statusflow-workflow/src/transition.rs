use std::sync::Arc;

use crate::definition::Properties;
use crate::id::StatusId;
use crate::status::Status;

/// A directed edge between two statuses.
///
/// Both ends are shared with the status cache they were resolved from, so a
/// status reachable through several transitions exists only once.
#[derive(Debug, Clone)]
pub struct Transition {
  pub start: Arc<Status>,
  pub end: Arc<Status>,
  /// Per-transition configuration, interpreted by the host.
  pub properties: Properties,
}

impl Transition {
  pub fn start_id(&self) -> &StatusId {
    &self.start.id
  }

  pub fn end_id(&self) -> &StatusId {
    &self.end.id
  }

  pub fn label(&self) -> Option<&str> {
    self.properties.get("label").and_then(|label| label.as_str())
  }
}
