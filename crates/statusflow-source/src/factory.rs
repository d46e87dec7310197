use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use statusflow_workflow::{Status, Transition, Workflow};

use crate::class_map::{ClassMap, DEFAULT_SELECTOR, EntityKind};
use crate::error::SourceError;

/// Builds the cached workflow from the one assembled out of its definition.
pub type WorkflowFactory = Arc<dyn Fn(Workflow) -> Workflow + Send + Sync>;
/// Builds the cached status from the one assembled out of its definition.
pub type StatusFactory = Arc<dyn Fn(Status) -> Status + Send + Sync>;
/// Builds the cached transition from the one assembled out of its definition.
///
/// The start and end statuses are already cached; a factory must keep them.
pub type TransitionFactory = Arc<dyn Fn(Transition) -> Transition + Send + Sync>;

/// Entity implementations available to a source, by selector.
///
/// The built-in implementations are registered under
/// [`DEFAULT_SELECTOR`]. A [`ClassMap`] picks one selector per kind when the
/// source is built.
#[derive(Clone)]
pub struct EntityFactories {
  workflow: HashMap<String, WorkflowFactory>,
  status: HashMap<String, StatusFactory>,
  transition: HashMap<String, TransitionFactory>,
}

impl EntityFactories {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_workflow(
    mut self,
    selector: impl Into<String>,
    factory: impl Fn(Workflow) -> Workflow + Send + Sync + 'static,
  ) -> Self {
    self.workflow.insert(selector.into(), Arc::new(factory));
    self
  }

  pub fn with_status(
    mut self,
    selector: impl Into<String>,
    factory: impl Fn(Status) -> Status + Send + Sync + 'static,
  ) -> Self {
    self.status.insert(selector.into(), Arc::new(factory));
    self
  }

  pub fn with_transition(
    mut self,
    selector: impl Into<String>,
    factory: impl Fn(Transition) -> Transition + Send + Sync + 'static,
  ) -> Self {
    self.transition.insert(selector.into(), Arc::new(factory));
    self
  }

  /// Registered selectors for one kind, sorted.
  pub fn selectors(&self, kind: EntityKind) -> Vec<&str> {
    let mut selectors: Vec<&str> = match kind {
      EntityKind::Workflow => self.workflow.keys().map(String::as_str).collect(),
      EntityKind::Status => self.status.keys().map(String::as_str).collect(),
      EntityKind::Transition => self.transition.keys().map(String::as_str).collect(),
    };
    selectors.sort_unstable();
    selectors
  }

  /// Pick the factory of every kind named by `class_map`.
  pub(crate) fn select(&self, class_map: &ClassMap) -> Result<SelectedFactories, SourceError> {
    Ok(SelectedFactories {
      workflow: lookup(&self.workflow, class_map, EntityKind::Workflow)?,
      status: lookup(&self.status, class_map, EntityKind::Status)?,
      transition: lookup(&self.transition, class_map, EntityKind::Transition)?,
    })
  }
}

fn lookup<F: Clone>(
  factories: &HashMap<String, F>,
  class_map: &ClassMap,
  kind: EntityKind,
) -> Result<F, SourceError> {
  let selector = class_map.selector(kind);
  factories
    .get(selector)
    .cloned()
    .ok_or_else(|| SourceError::UnknownFactory {
      kind,
      selector: selector.to_string(),
    })
}

impl Default for EntityFactories {
  fn default() -> Self {
    let defaults = SelectedFactories::default();
    Self {
      workflow: HashMap::from([(DEFAULT_SELECTOR.to_string(), defaults.workflow)]),
      status: HashMap::from([(DEFAULT_SELECTOR.to_string(), defaults.status)]),
      transition: HashMap::from([(DEFAULT_SELECTOR.to_string(), defaults.transition)]),
    }
  }
}

impl fmt::Debug for EntityFactories {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("EntityFactories")
      .field("workflow", &self.selectors(EntityKind::Workflow))
      .field("status", &self.selectors(EntityKind::Status))
      .field("transition", &self.selectors(EntityKind::Transition))
      .finish()
  }
}

/// The one factory per kind a source builds with.
#[derive(Clone)]
pub(crate) struct SelectedFactories {
  pub workflow: WorkflowFactory,
  pub status: StatusFactory,
  pub transition: TransitionFactory,
}

impl Default for SelectedFactories {
  fn default() -> Self {
    Self {
      workflow: Arc::new(|workflow: Workflow| workflow),
      status: Arc::new(|status: Status| status),
      transition: Arc::new(|transition: Transition| transition),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_factories_cover_default_class_map() {
    let factories = EntityFactories::default();
    assert!(factories.select(&ClassMap::default()).is_ok());
    for kind in EntityKind::ALL {
      assert_eq!(factories.selectors(kind), vec![DEFAULT_SELECTOR]);
    }
  }

  #[test]
  fn test_unknown_selector_is_rejected() {
    let factories = EntityFactories::default();
    let class_map = ClassMap::new([
      (EntityKind::Workflow, "default"),
      (EntityKind::Status, "audited"),
      (EntityKind::Transition, "default"),
    ])
    .unwrap();

    match factories.select(&class_map) {
      Err(SourceError::UnknownFactory { kind, selector }) => {
        assert_eq!(kind, EntityKind::Status);
        assert_eq!(selector, "audited");
      }
      _ => panic!("expected an unknown factory error"),
    }
  }

  #[test]
  fn test_registered_selector_is_selected() {
    let factories = EntityFactories::new().with_status("audited", |mut status: Status| {
      status.label = format!("{} (audited)", status.label);
      status
    });
    let class_map = ClassMap::new([
      (EntityKind::Workflow, "default"),
      (EntityKind::Status, "audited"),
      (EntityKind::Transition, "default"),
    ])
    .unwrap();

    let selected = factories.select(&class_map).unwrap();
    let status = (selected.status)(Status {
      id: "Order/new".parse().unwrap(),
      label: "New".to_string(),
      metadata: Default::default(),
      properties: Default::default(),
    });
    assert_eq!(status.label, "New (audited)");
  }
}
