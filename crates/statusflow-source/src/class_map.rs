use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Selector of the built-in implementation of every entity kind.
pub const DEFAULT_SELECTOR: &str = "default";

/// The kinds of entity a source builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Workflow,
  Status,
  Transition,
}

impl EntityKind {
  pub const ALL: [EntityKind; 3] = [EntityKind::Workflow, EntityKind::Status, EntityKind::Transition];

  pub fn as_str(self) -> &'static str {
    match self {
      EntityKind::Workflow => "workflow",
      EntityKind::Status => "status",
      EntityKind::Transition => "transition",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which implementation is used for each entity kind.
///
/// Always covers the three kinds with a non-empty selector; this is checked
/// when the map is built or deserialized:
///
/// ```json
/// { "workflow": "default", "status": "audited", "transition": "default" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  try_from = "BTreeMap<EntityKind, String>",
  into = "BTreeMap<EntityKind, String>"
)]
pub struct ClassMap {
  workflow: String,
  status: String,
  transition: String,
}

impl ClassMap {
  pub fn new<S: Into<String>>(
    entries: impl IntoIterator<Item = (EntityKind, S)>,
  ) -> Result<Self, SourceError> {
    let mut entries: BTreeMap<EntityKind, String> = entries
      .into_iter()
      .map(|(kind, selector)| (kind, selector.into()))
      .collect();

    let mut take = |kind: EntityKind| match entries.remove(&kind) {
      None => Err(SourceError::InvalidClassMap(format!(
        "missing selector for {kind}"
      ))),
      Some(selector) if selector.trim().is_empty() => Err(SourceError::InvalidClassMap(
        format!("empty selector for {kind}"),
      )),
      Some(selector) => Ok(selector),
    };

    Ok(Self {
      workflow: take(EntityKind::Workflow)?,
      status: take(EntityKind::Status)?,
      transition: take(EntityKind::Transition)?,
    })
  }

  pub fn selector(&self, kind: EntityKind) -> &str {
    match kind {
      EntityKind::Workflow => &self.workflow,
      EntityKind::Status => &self.status,
      EntityKind::Transition => &self.transition,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &str)> {
    EntityKind::ALL
      .into_iter()
      .map(|kind| (kind, self.selector(kind)))
  }
}

impl Default for ClassMap {
  fn default() -> Self {
    Self {
      workflow: DEFAULT_SELECTOR.to_string(),
      status: DEFAULT_SELECTOR.to_string(),
      transition: DEFAULT_SELECTOR.to_string(),
    }
  }
}

impl TryFrom<BTreeMap<EntityKind, String>> for ClassMap {
  type Error = SourceError;

  fn try_from(entries: BTreeMap<EntityKind, String>) -> Result<Self, Self::Error> {
    Self::new(entries)
  }
}

impl From<ClassMap> for BTreeMap<EntityKind, String> {
  fn from(map: ClassMap) -> Self {
    BTreeMap::from([
      (EntityKind::Workflow, map.workflow),
      (EntityKind::Status, map.status),
      (EntityKind::Transition, map.transition),
    ])
  }
}
