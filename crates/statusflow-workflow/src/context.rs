use std::fmt;

/// A host entity that can sit in a workflow status.
///
/// Only used to complete status ids given without their workflow part.
pub trait StatusHolder {
  /// Workflow id of the status the entity currently sits in, or `None` if
  /// the entity has no status yet.
  fn current_workflow_id(&self) -> Option<&str>;

  /// Workflow the entity enters when it has no status.
  fn default_workflow_id(&self) -> Option<&str>;

  fn has_workflow_status(&self) -> bool {
    self.current_workflow_id().is_some()
  }
}

/// Where the workflow id of a local status id (no `/`) comes from.
#[derive(Clone, Copy, Default)]
pub enum IdContext<'a> {
  /// Only fully qualified ids are accepted.
  #[default]
  None,
  /// Explicit fallback workflow id.
  Workflow(&'a str),
  /// A live host entity: its current workflow, else its default workflow.
  Holder(&'a dyn StatusHolder),
}

impl<'a> IdContext<'a> {
  /// The workflow id this context resolves to, if any.
  pub fn workflow_id(&self) -> Option<&'a str> {
    match *self {
      IdContext::None => None,
      IdContext::Workflow(workflow_id) => Some(workflow_id),
      IdContext::Holder(holder) => {
        if holder.has_workflow_status() {
          holder.current_workflow_id()
        } else {
          holder.default_workflow_id()
        }
      }
    }
  }
}

impl<'a> From<&'a str> for IdContext<'a> {
  fn from(workflow_id: &'a str) -> Self {
    IdContext::Workflow(workflow_id)
  }
}

impl<'a> From<Option<&'a str>> for IdContext<'a> {
  fn from(workflow_id: Option<&'a str>) -> Self {
    workflow_id.map_or(IdContext::None, IdContext::Workflow)
  }
}

impl fmt::Debug for IdContext<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      IdContext::None => f.write_str("None"),
      IdContext::Workflow(workflow_id) => f.debug_tuple("Workflow").field(workflow_id).finish(),
      IdContext::Holder(holder) => f
        .debug_struct("Holder")
        .field("current_workflow_id", &holder.current_workflow_id())
        .field("default_workflow_id", &holder.default_workflow_id())
        .finish(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Entity {
    current: Option<&'static str>,
    default: Option<&'static str>,
  }

  impl StatusHolder for Entity {
    fn current_workflow_id(&self) -> Option<&str> {
      self.current
    }

    fn default_workflow_id(&self) -> Option<&str> {
      self.default
    }
  }

  #[test]
  fn test_holder_prefers_current_workflow() {
    let entity = Entity {
      current: Some("Order"),
      default: Some("Invoice"),
    };
    assert_eq!(IdContext::Holder(&entity).workflow_id(), Some("Order"));
  }

  #[test]
  fn test_holder_falls_back_to_default_workflow() {
    let entity = Entity {
      current: None,
      default: Some("Invoice"),
    };
    assert_eq!(IdContext::Holder(&entity).workflow_id(), Some("Invoice"));

    let bare = Entity {
      current: None,
      default: None,
    };
    assert_eq!(IdContext::Holder(&bare).workflow_id(), None);
  }

  #[test]
  fn test_from_optional_workflow_id() {
    assert_eq!(IdContext::from(Some("Order")).workflow_id(), Some("Order"));
    assert_eq!(IdContext::from(None).workflow_id(), None);
  }
}
