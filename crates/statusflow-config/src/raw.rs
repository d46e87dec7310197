use serde_json::{Map, Value};

use crate::error::ShapeError;

pub const INITIAL_STATUS_KEY: &str = "initialStatusId";
pub const STATUS_KEY: &str = "status";
pub const METADATA_KEY: &str = "metadata";
pub const TRANSITION_KEY: &str = "transition";
pub const LABEL_KEY: &str = "label";

/// Separator of the string transition shorthand (`"paid, cancelled"`).
pub const TRANSITION_LIST_SEPARATOR: char = ',';

/// A workflow definition as written by the host, decoded from untyped data.
///
/// Ids are still raw strings here; nothing is canonicalized or cross-checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDefinition {
  pub initial_status_id: Option<String>,
  pub statuses: Option<Vec<StatusEntry>>,
  pub metadata: Option<Map<String, Value>>,
  /// Every other top-level key.
  pub properties: Map<String, Value>,
}

/// One status of the status collection.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEntry {
  /// `["draft"]`, or `{"0": "draft"}` where the key is only a position.
  BareId(String),
  /// `{"draft": null}`, `{"draft": []}` or `{"draft": {...}}`.
  Configured {
    id: String,
    config: Option<StatusConfig>,
  },
}

/// Configuration object of a status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusConfig {
  pub label: Option<String>,
  pub metadata: Option<Map<String, Value>>,
  pub transitions: Option<TransitionSpec>,
  /// Every other key, passed through verbatim.
  pub properties: Map<String, Value>,
}

/// The three accepted shapes of a status `transition` entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionSpec {
  /// `"paid, cancelled"`
  IdList(String),
  /// `["paid", "cancelled"]`
  Ids(Vec<String>),
  /// `{"paid": {...}, "cancelled": null}`
  IdToConfig(Vec<(String, Map<String, Value>)>),
}

impl StatusEntry {
  pub fn id(&self) -> &str {
    match self {
      StatusEntry::BareId(id) | StatusEntry::Configured { id, .. } => id,
    }
  }

  /// Split into the raw id and its configuration (empty if none was given).
  pub fn into_parts(self) -> (String, StatusConfig) {
    match self {
      StatusEntry::BareId(id) => (id, StatusConfig::default()),
      StatusEntry::Configured { id, config } => (id, config.unwrap_or_default()),
    }
  }
}

impl TransitionSpec {
  /// Flatten into `(raw target id, config)` pairs.
  ///
  /// Tokens of the string shorthand are trimmed; targets without a
  /// configuration get an empty one.
  pub fn into_targets(self) -> Vec<(String, Map<String, Value>)> {
    match self {
      TransitionSpec::IdList(list) => list
        .split(TRANSITION_LIST_SEPARATOR)
        .map(|token| (token.trim().to_string(), Map::new()))
        .collect(),
      TransitionSpec::Ids(ids) => ids.into_iter().map(|id| (id, Map::new())).collect(),
      TransitionSpec::IdToConfig(entries) => entries,
    }
  }
}

impl RawDefinition {
  /// Decode the shorthand from untyped data.
  ///
  /// A missing (or null) initial status or status collection is left as
  /// `None`; deciding whether that is an error belongs to normalization.
  pub fn from_value(value: Value) -> Result<Self, ShapeError> {
    let Value::Object(fields) = value else {
      return Err(ShapeError::NotAnObject);
    };

    let mut definition = RawDefinition::default();
    for (key, value) in fields {
      match key.as_str() {
        INITIAL_STATUS_KEY => {
          definition.initial_status_id = match value {
            Value::Null => None,
            Value::String(id) => Some(id),
            _ => return Err(ShapeError::InvalidInitialStatus),
          };
        }
        STATUS_KEY => definition.statuses = decode_statuses(value)?,
        METADATA_KEY => definition.metadata = decode_metadata(value, "workflow")?,
        _ => {
          definition.properties.insert(key, value);
        }
      }
    }
    Ok(definition)
  }
}

impl TryFrom<Value> for RawDefinition {
  type Error = ShapeError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    Self::from_value(value)
  }
}

fn decode_statuses(value: Value) -> Result<Option<Vec<StatusEntry>>, ShapeError> {
  match value {
    Value::Null => Ok(None),
    Value::Array(items) => items
      .into_iter()
      .map(|item| match item {
        Value::String(id) => Ok(StatusEntry::BareId(id)),
        other => Err(ShapeError::InvalidStatusEntry(other.to_string())),
      })
      .collect::<Result<Vec<_>, _>>()
      .map(Some),
    Value::Object(entries) => entries
      .into_iter()
      .map(|(key, value)| decode_status_entry(key, value))
      .collect::<Result<Vec<_>, _>>()
      .map(Some),
    _ => Err(ShapeError::InvalidStatusCollection),
  }
}

fn decode_status_entry(key: String, value: Value) -> Result<StatusEntry, ShapeError> {
  match value {
    Value::String(id) if is_position(&key) => Ok(StatusEntry::BareId(id)),
    Value::Null => Ok(StatusEntry::Configured {
      id: key,
      config: None,
    }),
    Value::Array(items) if items.is_empty() => Ok(StatusEntry::Configured {
      id: key,
      config: None,
    }),
    Value::Object(config) => {
      let config = decode_status_config(&key, config)?;
      Ok(StatusEntry::Configured {
        id: key,
        config: Some(config),
      })
    }
    _ => Err(ShapeError::InvalidStatusConfig { status: key }),
  }
}

/// True for the index keys of a list encoded as a map (`{"0": "draft"}`).
fn is_position(key: &str) -> bool {
  !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn decode_status_config(
  status: &str,
  fields: Map<String, Value>,
) -> Result<StatusConfig, ShapeError> {
  let mut config = StatusConfig::default();
  for (key, value) in fields {
    match key.as_str() {
      METADATA_KEY => config.metadata = decode_metadata(value, status)?,
      TRANSITION_KEY => config.transitions = decode_transitions(status, value)?,
      LABEL_KEY => {
        config.label = match value {
          Value::Null => None,
          Value::String(label) => Some(label),
          _ => {
            return Err(ShapeError::InvalidLabel {
              status: status.to_string(),
            });
          }
        };
      }
      _ => {
        config.properties.insert(key, value);
      }
    }
  }
  Ok(config)
}

/// Metadata must be a string-keyed map; a positional list is rejected.
fn decode_metadata(value: Value, owner: &str) -> Result<Option<Map<String, Value>>, ShapeError> {
  match value {
    Value::Null => Ok(None),
    Value::Object(metadata) => Ok(Some(metadata)),
    _ => Err(ShapeError::InvalidMetadata {
      owner: owner.to_string(),
    }),
  }
}

fn decode_transitions(status: &str, value: Value) -> Result<Option<TransitionSpec>, ShapeError> {
  let invalid = |reason: String| ShapeError::InvalidTransition {
    status: status.to_string(),
    reason,
  };

  match value {
    Value::Null => Ok(None),
    Value::String(list) => Ok(Some(TransitionSpec::IdList(list))),
    Value::Array(items) => items
      .into_iter()
      .map(|item| match item {
        Value::String(id) => Ok(id),
        other => Err(invalid(format!("target id must be a string, got {other}"))),
      })
      .collect::<Result<Vec<_>, _>>()
      .map(|ids| Some(TransitionSpec::Ids(ids))),
    Value::Object(entries) => entries
      .into_iter()
      .map(|(target, config)| match config {
        Value::Null => Ok((target, Map::new())),
        Value::Array(items) if items.is_empty() => Ok((target, Map::new())),
        Value::Object(config) => Ok((target, config)),
        other => Err(invalid(format!(
          "configuration of transition to '{target}' must be an object, got {other}"
        ))),
      })
      .collect::<Result<Vec<_>, _>>()
      .map(|entries| Some(TransitionSpec::IdToConfig(entries))),
    other => Err(invalid(format!(
      "expected a string, a list or a map, got {other}"
    ))),
  }
}
