use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::error::ProviderError;

/// Supplies the raw definition of a workflow.
///
/// Called at most once per workflow id by a [`Source`](crate::Source), the
/// first time the workflow is needed. Lookups are expected to be fast and
/// local; nothing is retried.
pub trait DefinitionProvider: Send + Sync {
  /// Fetch the raw definition of `workflow_id`, or `None` if the provider
  /// has no such workflow.
  fn fetch(&self, workflow_id: &str) -> Result<Option<Value>, ProviderError>;
}

impl<P: DefinitionProvider + ?Sized> DefinitionProvider for Arc<P> {
  fn fetch(&self, workflow_id: &str) -> Result<Option<Value>, ProviderError> {
    (**self).fetch(workflow_id)
  }
}

/// In-memory provider, for definitions built in code and for tests.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
  definitions: RwLock<HashMap<String, Value>>,
}

impl InMemoryProvider {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_definition(self, workflow_id: impl Into<String>, raw: Value) -> Self {
    self.insert(workflow_id, raw);
    self
  }

  /// Store the raw definition of a workflow, returning the previous one.
  pub fn insert(&self, workflow_id: impl Into<String>, raw: Value) -> Option<Value> {
    self
      .definitions
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(workflow_id.into(), raw)
  }
}

impl DefinitionProvider for InMemoryProvider {
  fn fetch(&self, workflow_id: &str) -> Result<Option<Value>, ProviderError> {
    let definitions = self.definitions.read().unwrap_or_else(PoisonError::into_inner);
    Ok(definitions.get(workflow_id).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_in_memory_provider() {
    let provider = InMemoryProvider::new().with_definition("Order", json!({ "status": [] }));

    assert_eq!(provider.fetch("Order").unwrap(), Some(json!({ "status": [] })));
    assert_eq!(provider.fetch("Invoice").unwrap(), None);

    let previous = provider.insert("Order", json!({}));
    assert_eq!(previous, Some(json!({ "status": [] })));
    assert_eq!(provider.fetch("Order").unwrap(), Some(json!({})));
  }

  #[test]
  fn test_shared_provider() {
    let provider = Arc::new(InMemoryProvider::new());
    let shared: Arc<InMemoryProvider> = Arc::clone(&provider);

    provider.insert("Order", json!({}));
    assert_eq!(shared.fetch("Order").unwrap(), Some(json!({})));
  }
}
