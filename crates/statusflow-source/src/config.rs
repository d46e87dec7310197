use serde::{Deserialize, Serialize};

use crate::class_map::ClassMap;

/// Host configuration of a [`Source`](crate::Source).
///
/// ```json
/// { "class_map": { "workflow": "default", "status": "default", "transition": "default" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
  #[serde(default)]
  pub class_map: ClassMap,
}
