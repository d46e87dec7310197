//! Lazy, identity-caching resolution of workflows, statuses and transitions.
//!
//! Definitions are fetched from the provider and normalized the first time a
//! workflow is needed. Entities are built the first time they are queried
//! and cached by canonical id: repeated lookups return the same `Arc`.
//!
//! Builds never hold a lock while building. Concurrent first builds of the
//! same id race, and the first one inserted wins; the others are dropped and
//! the cached instance is returned instead. A build whose workflow
//! definition was replaced while it ran is dropped and redone.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use statusflow_resolver::normalize;
use statusflow_workflow::{
  IdContext, Status, StatusId, Transition, Workflow, WorkflowDefinition, humanize,
  validate_workflow_id,
};
use tracing::{debug, info};

use crate::class_map::ClassMap;
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::factory::{EntityFactories, SelectedFactories};
use crate::provider::DefinitionProvider;

/// Transitions leaving one status.
pub type TransitionList = Arc<[Arc<Transition>]>;

/// Resolves the workflow graph described by the definitions of a provider.
pub struct Source {
  provider: Box<dyn DefinitionProvider>,
  class_map: ClassMap,
  factories: SelectedFactories,
  definitions: RwLock<HashMap<String, Arc<WorkflowDefinition>>>,
  workflows: RwLock<HashMap<String, Arc<Workflow>>>,
  statuses: RwLock<HashMap<StatusId, Arc<Status>>>,
  transitions: RwLock<HashMap<StatusId, TransitionList>>,
}

impl Source {
  /// Create a source using the built-in entity implementations.
  pub fn new(provider: impl DefinitionProvider + 'static) -> Self {
    Self::from_parts(
      Box::new(provider),
      ClassMap::default(),
      SelectedFactories::default(),
    )
  }

  pub fn builder(provider: impl DefinitionProvider + 'static) -> SourceBuilder {
    SourceBuilder {
      provider: Box::new(provider),
      class_map: ClassMap::default(),
      factories: EntityFactories::default(),
    }
  }

  fn from_parts(
    provider: Box<dyn DefinitionProvider>,
    class_map: ClassMap,
    factories: SelectedFactories,
  ) -> Self {
    Self {
      provider,
      class_map,
      factories,
      definitions: RwLock::default(),
      workflows: RwLock::default(),
      statuses: RwLock::default(),
      transitions: RwLock::default(),
    }
  }

  /// The entity implementation selected for each kind.
  pub fn class_map(&self) -> &ClassMap {
    &self.class_map
  }

  /// Normalized definition of a workflow, fetched from the provider on
  /// first use.
  pub fn get_workflow_definition(
    &self,
    workflow_id: &str,
  ) -> Result<Arc<WorkflowDefinition>, SourceError> {
    validate_workflow_id(workflow_id)?;
    if let Some(definition) = read(&self.definitions).get(workflow_id) {
      return Ok(Arc::clone(definition));
    }

    let raw = self
      .provider
      .fetch(workflow_id)
      .map_err(|source| SourceError::Provider {
        workflow_id: workflow_id.to_string(),
        source,
      })?
      .ok_or_else(|| SourceError::WorkflowNotFound {
        workflow_id: workflow_id.to_string(),
      })?;

    let definition = normalize(workflow_id, raw).map_err(|source| SourceError::Definition {
      workflow_id: workflow_id.to_string(),
      source,
    })?;
    debug!(
      workflow_id,
      statuses = definition.statuses.len(),
      "workflow definition loaded"
    );

    Ok(insert_first(
      &self.definitions,
      workflow_id.to_string(),
      Arc::new(definition),
    ))
  }

  /// The workflow, or `None` if the provider has no definition for it.
  pub fn get_workflow(&self, workflow_id: &str) -> Result<Option<Arc<Workflow>>, SourceError> {
    validate_workflow_id(workflow_id)?;
    if let Some(workflow) = read(&self.workflows).get(workflow_id) {
      return Ok(Some(Arc::clone(workflow)));
    }

    loop {
      let definition = match self.get_workflow_definition(workflow_id) {
        Ok(definition) => definition,
        Err(SourceError::WorkflowNotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
      };

      let workflow = (self.factories.workflow)(Workflow {
        id: workflow_id.to_string(),
        initial_status_id: definition.initial_status_id.clone(),
        metadata: definition.metadata.clone().unwrap_or_default(),
        properties: definition.properties.clone(),
      });
      debug!(workflow_id, "workflow built");

      let cached = insert_current(
        &self.workflows,
        workflow_id.to_string(),
        Arc::new(workflow),
        || self.is_current_definition(workflow_id, &definition),
      );
      match cached {
        Some(workflow) => return Ok(Some(workflow)),
        None => debug!(workflow_id, "workflow definition replaced during build, rebuilding"),
      }
    }
  }

  /// The status `id`; a local id is completed from `context`.
  pub fn get_status(&self, id: &str, context: IdContext<'_>) -> Result<Arc<Status>, SourceError> {
    let id = StatusId::parse(id, context)?;
    self.status(&id)
  }

  /// The status with canonical id `id`.
  pub fn status(&self, id: &StatusId) -> Result<Arc<Status>, SourceError> {
    if let Some(status) = read(&self.statuses).get(id) {
      return Ok(Arc::clone(status));
    }

    loop {
      let definition = self.get_workflow_definition(id.workflow_id())?;
      let status_definition = definition
        .status(id)
        .ok_or_else(|| SourceError::StatusNotFound { id: id.clone() })?;

      let status = (self.factories.status)(Status {
        id: id.clone(),
        label: status_definition
          .label
          .clone()
          .unwrap_or_else(|| humanize(id.local_id())),
        metadata: status_definition.metadata.clone().unwrap_or_default(),
        properties: status_definition.properties.clone(),
      });
      debug!(status_id = %id, "status built");

      let cached = insert_current(&self.statuses, id.clone(), Arc::new(status), || {
        self.is_current_definition(id.workflow_id(), &definition)
      });
      match cached {
        Some(status) => return Ok(status),
        None => debug!(status_id = %id, "workflow definition replaced during build, rebuilding"),
      }
    }
  }

  /// Transitions leaving the status `status_id`, building every end status
  /// on the way. A status without transitions yields an empty list.
  pub fn get_transitions(
    &self,
    status_id: &str,
    context: IdContext<'_>,
  ) -> Result<TransitionList, SourceError> {
    let start_id = StatusId::parse(status_id, context)?;
    self.transitions(&start_id)
  }

  /// Transitions leaving the status with canonical id `start_id`.
  pub fn transitions(&self, start_id: &StatusId) -> Result<TransitionList, SourceError> {
    if let Some(transitions) = read(&self.transitions).get(start_id) {
      return Ok(Arc::clone(transitions));
    }

    loop {
      let start = self.status(start_id)?;
      let definition = self.get_workflow_definition(start_id.workflow_id())?;
      let status_definition = definition
        .status(start_id)
        .ok_or_else(|| SourceError::StatusNotFound {
          id: start_id.clone(),
        })?;

      let mut transitions = Vec::with_capacity(status_definition.transitions.len());
      for (end_id, config) in &status_definition.transitions {
        let end = self.status(end_id)?;
        let transition = (self.factories.transition)(Transition {
          start: Arc::clone(&start),
          end,
          properties: config.clone(),
        });
        transitions.push(Arc::new(transition));
      }
      debug!(
        status_id = %start_id,
        transitions = transitions.len(),
        "transitions built"
      );

      let transitions = TransitionList::from(transitions);
      let cached = insert_current(
        &self.transitions,
        start_id.clone(),
        Arc::clone(&transitions),
        || {
          self.is_current_definition(start_id.workflow_id(), &definition)
            && transitions
              .iter()
              .all(|t| self.is_cached_status(&t.start) && self.is_cached_status(&t.end))
        },
      );
      match cached {
        Some(transitions) => return Ok(transitions),
        None => debug!(status_id = %start_id, "workflow definition replaced during build, rebuilding"),
      }
    }
  }

  /// The transition from `start_id` to `end_id`, or `None` if the start
  /// status has no such transition.
  ///
  /// A local end id is completed from `context`, or else from the workflow
  /// of the start status.
  pub fn get_transition(
    &self,
    start_id: &str,
    end_id: &str,
    context: IdContext<'_>,
  ) -> Result<Option<Arc<Transition>>, SourceError> {
    let start_id = StatusId::parse(start_id, context)?;
    let end_context = match context.workflow_id() {
      Some(_) => context,
      None => IdContext::Workflow(start_id.workflow_id()),
    };
    let end_id = StatusId::parse(end_id, end_context)?;

    let transitions = self.transitions(&start_id)?;
    Ok(
      transitions
        .iter()
        .find(|transition| transition.end_id() == &end_id)
        .cloned(),
    )
  }

  /// Every status declared by a workflow, in canonical id order.
  pub fn get_all_statuses(&self, workflow_id: &str) -> Result<Vec<Arc<Status>>, SourceError> {
    let definition = self.get_workflow_definition(workflow_id)?;
    definition.status_ids().map(|id| self.status(id)).collect()
  }

  pub fn get_initial_status(&self, workflow_id: &str) -> Result<Arc<Status>, SourceError> {
    let definition = self.get_workflow_definition(workflow_id)?;
    self.status(&definition.initial_status_id)
  }

  /// Normalize and store the definition of `workflow_id`.
  ///
  /// Returns `Ok(false)` without storing anything if a definition is already
  /// loaded and `overwrite` is false. Replacing a definition drops every
  /// entity cached from the previous one.
  pub fn add_workflow_definition(
    &self,
    workflow_id: &str,
    raw: Value,
    overwrite: bool,
  ) -> Result<bool, SourceError> {
    validate_workflow_id(workflow_id)?;
    let definition = normalize(workflow_id, raw).map_err(|source| SourceError::Definition {
      workflow_id: workflow_id.to_string(),
      source,
    })?;

    let replaced = {
      let mut definitions = write(&self.definitions);
      if definitions.contains_key(workflow_id) && !overwrite {
        debug!(workflow_id, "workflow definition already loaded, not overwritten");
        return Ok(false);
      }
      definitions
        .insert(workflow_id.to_string(), Arc::new(definition))
        .is_some()
    };

    if replaced {
      self.invalidate(workflow_id);
    }
    info!(workflow_id, replaced, "workflow definition added");
    Ok(true)
  }

  /// Drop every cached entity built from the definition of `workflow_id`,
  /// including transitions of other workflows that end in it.
  fn invalidate(&self, workflow_id: &str) {
    write(&self.workflows).remove(workflow_id);
    write(&self.statuses).retain(|id, _| !id.belongs_to(workflow_id));
    write(&self.transitions).retain(|start_id, transitions| {
      !start_id.belongs_to(workflow_id)
        && !transitions
          .iter()
          .any(|transition| transition.end_id().belongs_to(workflow_id))
    });
    info!(workflow_id, "cached entities invalidated");
  }

  fn is_current_definition(&self, workflow_id: &str, definition: &Arc<WorkflowDefinition>) -> bool {
    read(&self.definitions)
      .get(workflow_id)
      .is_some_and(|current| Arc::ptr_eq(current, definition))
  }

  fn is_cached_status(&self, status: &Arc<Status>) -> bool {
    read(&self.statuses)
      .get(&status.id)
      .is_some_and(|cached| Arc::ptr_eq(cached, status))
  }

  /// Drop every cached definition and entity.
  pub fn clear(&self) {
    write(&self.definitions).clear();
    write(&self.workflows).clear();
    write(&self.statuses).clear();
    write(&self.transitions).clear();
  }
}

/// Builds a [`Source`] with a custom class map or entity factories.
pub struct SourceBuilder {
  provider: Box<dyn DefinitionProvider>,
  class_map: ClassMap,
  factories: EntityFactories,
}

impl SourceBuilder {
  pub fn class_map(mut self, class_map: ClassMap) -> Self {
    self.class_map = class_map;
    self
  }

  pub fn config(mut self, config: SourceConfig) -> Self {
    self.class_map = config.class_map;
    self
  }

  pub fn factories(mut self, factories: EntityFactories) -> Self {
    self.factories = factories;
    self
  }

  /// Fails if the class map selects a factory that is not registered.
  pub fn build(self) -> Result<Source, SourceError> {
    let selected = self.factories.select(&self.class_map)?;
    Ok(Source::from_parts(self.provider, self.class_map, selected))
  }
}

// Cached values are immutable once inserted, so a poisoned lock still
// guards consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
  lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
  lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Insert `value` unless `key` is already cached; return the cached value.
fn insert_first<K: Hash + Eq, V: Clone>(cache: &RwLock<HashMap<K, V>>, key: K, value: V) -> V {
  write(cache).entry(key).or_insert(value).clone()
}

/// Like [`insert_first`], but `value` is only inserted if `is_current` holds
/// while the cache is locked. Returns `None` for a stale build.
///
/// Invalidation swaps the definition before it clears the caches, so a
/// build that passes the check here is either current or cleared later.
fn insert_current<K: Hash + Eq, V: Clone>(
  cache: &RwLock<HashMap<K, V>>,
  key: K,
  value: V,
  is_current: impl FnOnce() -> bool,
) -> Option<V> {
  let mut cache = write(cache);
  if let Some(cached) = cache.get(&key) {
    return Some(cached.clone());
  }
  if !is_current() {
    return None;
  }
  cache.insert(key, value.clone());
  Some(value)
}
