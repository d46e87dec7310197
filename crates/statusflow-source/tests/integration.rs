//! Integration tests for statusflow-source, resolving definition files from
//! a temp directory.

use std::fs;
use std::sync::Arc;

use serde_json::json;
use statusflow_source::{
  ClassMap, EntityFactories, EntityKind, FsDefinitionProvider, InMemoryProvider, Source,
  SourceConfig, SourceError,
};
use statusflow_workflow::{IdContext, Status, StatusHolder, Transition};

const ORDER_JSON: &str = r#"{
  "initialStatusId": "new",
  "label": "Order",
  "status": {
    "new": { "transition": "paid, cancelled" },
    "paid": { "transition": { "Shipping/ready": { "label": "Ship" } } },
    "cancelled": null
  }
}"#;

const SHIPPING_YAML: &str = "\
initialStatusId: ready
status:
  ready:
    label: Ready to ship
    transition: [shipped]
  shipped: ~
";

/// Create a provider over a temp directory holding the Order and Shipping
/// workflows.
fn create_provider() -> (FsDefinitionProvider, tempfile::TempDir) {
  let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
  fs::write(temp_dir.path().join("Order.json"), ORDER_JSON).expect("failed to write Order");
  fs::write(temp_dir.path().join("Shipping.yaml"), SHIPPING_YAML)
    .expect("failed to write Shipping");
  (FsDefinitionProvider::new(temp_dir.path()), temp_dir)
}

struct Order {
  status: Option<String>,
}

impl StatusHolder for Order {
  fn current_workflow_id(&self) -> Option<&str> {
    self
      .status
      .as_deref()
      .and_then(|status| status.split_once('/'))
      .map(|(workflow_id, _)| workflow_id)
  }

  fn default_workflow_id(&self) -> Option<&str> {
    Some("Order")
  }
}

#[test]
fn test_order_workflow_end_to_end() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  let transitions = source.get_transitions("Order/new", IdContext::None).unwrap();
  assert_eq!(transitions.len(), 2);
  let ends: Vec<String> = transitions.iter().map(|t| t.end_id().to_string()).collect();
  assert_eq!(ends, vec!["Order/cancelled", "Order/paid"]);

  let paid = source
    .get_transition("Order/new", "Order/paid", IdContext::None)
    .unwrap();
  assert!(paid.is_some());

  let back = source
    .get_transition("Order/paid", "Order/new", IdContext::None)
    .unwrap();
  assert!(back.is_none());
}

#[test]
fn test_statuses_are_shared() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  let new = source.get_status("Order/new", IdContext::None).unwrap();
  let paid = source.get_status("paid", IdContext::Workflow("Order")).unwrap();

  let transition = source
    .get_transition("new", "paid", IdContext::Workflow("Order"))
    .unwrap()
    .unwrap();
  assert!(Arc::ptr_eq(&transition.start, &new));
  assert!(Arc::ptr_eq(&transition.end, &paid));

  let workflow = source.get_workflow("Order").unwrap().unwrap();
  let initial = source.get_status(workflow.initial_status_id.local_id(), "Order".into()).unwrap();
  assert!(Arc::ptr_eq(&initial, &new));
  assert!(Arc::ptr_eq(
    &workflow,
    &source.get_workflow("Order").unwrap().unwrap()
  ));
}

#[test]
fn test_transition_into_other_workflow() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  let ship = source
    .get_transition("Order/paid", "Shipping/ready", IdContext::None)
    .unwrap()
    .unwrap();
  assert_eq!(ship.label(), Some("Ship"));
  assert_eq!(ship.end.label, "Ready to ship");

  let ready = source.get_status("Shipping/ready", IdContext::None).unwrap();
  assert!(Arc::ptr_eq(&ship.end, &ready));

  let onward = source.get_transitions("Shipping/ready", IdContext::None).unwrap();
  assert_eq!(onward[0].end_id().to_string(), "Shipping/shipped");
}

#[test]
fn test_holder_context() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  let fresh = Order { status: None };
  let status = source.get_status("new", IdContext::Holder(&fresh)).unwrap();
  assert_eq!(status.id.to_string(), "Order/new");

  let shipping = Order {
    status: Some("Shipping/ready".to_string()),
  };
  let status = source.get_status("shipped", IdContext::Holder(&shipping)).unwrap();
  assert_eq!(status.id.to_string(), "Shipping/shipped");
}

#[test]
fn test_concurrent_first_access_yields_one_instance() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  let statuses: Vec<Arc<Status>> = std::thread::scope(|scope| {
    let handles: Vec<_> = (0..8)
      .map(|_| scope.spawn(|| source.get_status("Order/paid", IdContext::None).unwrap()))
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  for status in &statuses[1..] {
    assert!(Arc::ptr_eq(&statuses[0], status));
  }

  let transitions: Vec<Arc<Transition>> = std::thread::scope(|scope| {
    let handles: Vec<_> = (0..8)
      .map(|_| {
        scope.spawn(|| {
          source
            .get_transition("Order/new", "paid", IdContext::None)
            .unwrap()
            .unwrap()
        })
      })
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
  });

  for transition in &transitions {
    assert!(Arc::ptr_eq(&transitions[0], transition));
    assert!(Arc::ptr_eq(&transition.end, &statuses[0]));
  }
}

#[test]
fn test_overwrite_definition() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  // Load Order from the provider and cache a transition ending in it.
  let before = source.get_status("Order/paid", IdContext::None).unwrap();
  let definition = json!({ "initialStatusId": "new", "status": { "new": { "transition": "paid" }, "paid": { "label": "Settled" } } });

  assert!(!source.add_workflow_definition("Order", definition.clone(), false).unwrap());
  assert!(Arc::ptr_eq(
    &before,
    &source.get_status("Order/paid", IdContext::None).unwrap()
  ));

  assert!(source.add_workflow_definition("Order", definition, true).unwrap());
  let after = source.get_status("Order/paid", IdContext::None).unwrap();
  assert!(!Arc::ptr_eq(&before, &after));
  assert_eq!(after.label, "Settled");

  let transitions = source.get_transitions("Order/new", IdContext::None).unwrap();
  assert_eq!(transitions.len(), 1);
  assert!(Arc::ptr_eq(&transitions[0].end, &after));
}

#[test]
fn test_overwrite_drops_transitions_ending_in_workflow() {
  let (provider, _temp_dir) = create_provider();
  let source = Source::new(provider);

  let ship = source
    .get_transition("Order/paid", "Shipping/ready", IdContext::None)
    .unwrap()
    .unwrap();
  assert_eq!(ship.end.label, "Ready to ship");

  source
    .add_workflow_definition(
      "Shipping",
      json!({ "initialStatusId": "ready", "status": { "ready": { "label": "Packed" } } }),
      true,
    )
    .unwrap();

  let ship = source
    .get_transition("Order/paid", "Shipping/ready", IdContext::None)
    .unwrap()
    .unwrap();
  assert_eq!(ship.end.label, "Packed");
}

#[test]
fn test_missing_and_invalid_definitions() {
  let (provider, temp_dir) = create_provider();
  fs::write(temp_dir.path().join("Broken.json"), r#"{ "status": ["a"] }"#).unwrap();
  fs::write(temp_dir.path().join("Garbled.yaml"), "status: [unclosed").unwrap();
  let source = Source::new(provider);

  assert!(source.get_workflow("Invoice").unwrap().is_none());

  let err = source.get_workflow("Broken").unwrap_err();
  assert!(err.is_validation());

  let err = source.get_workflow("Garbled").unwrap_err();
  assert!(matches!(err, SourceError::Provider { .. }));
  assert!(!err.is_validation());

  let err = source.get_status("Order/", IdContext::None).unwrap_err();
  assert!(matches!(err, SourceError::Id(_)));
}

#[test]
fn test_source_from_config() {
  let config: SourceConfig = serde_json::from_value(json!({
    "class_map": { "workflow": "default", "status": "tagged", "transition": "default" }
  }))
  .unwrap();
  let factories = EntityFactories::new().with_status("tagged", |mut status: Status| {
    status
      .properties
      .insert("tagged".to_string(), json!(true));
    status
  });

  let (provider, _temp_dir) = create_provider();
  let source = Source::builder(provider)
    .factories(factories)
    .config(config)
    .build()
    .unwrap();

  let transitions = source.get_transitions("Order/new", IdContext::None).unwrap();
  for transition in transitions.iter() {
    assert_eq!(transition.end.properties.get("tagged"), Some(&json!(true)));
  }
  assert_eq!(source.class_map().selector(EntityKind::Status), "tagged");
}

#[test]
fn test_class_map_without_factory_fails_to_build() {
  let class_map = ClassMap::new([
    (EntityKind::Workflow, "versioned"),
    (EntityKind::Status, "default"),
    (EntityKind::Transition, "default"),
  ])
  .unwrap();

  let result = Source::builder(InMemoryProvider::new())
    .class_map(class_map)
    .build();
  assert!(matches!(result, Err(SourceError::UnknownFactory { .. })));
}
