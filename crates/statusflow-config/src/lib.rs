//! Statusflow Config
//!
//! This crate decodes the shorthand a host uses to describe a workflow into
//! typed, but not yet validated, structures. The same logical graph can be
//! written several ways:
//!
//! ```json
//! {
//!   "initialStatusId": "new",
//!   "status": {
//!     "new": { "transition": "paid, cancelled" },
//!     "paid": null,
//!     "cancelled": null
//!   }
//! }
//! ```
//!
//! Statuses may be a list of ids, a map from id to `null` or a
//! configuration object, or a map from position to id; transitions may be a comma separated string, a
//! list of ids or a map from id to configuration. Each field is decoded
//! into a small tagged union here, so later stages never look at the
//! original shape again.

mod error;
mod raw;

pub use error::ShapeError;
pub use raw::{
  INITIAL_STATUS_KEY, LABEL_KEY, METADATA_KEY, RawDefinition, STATUS_KEY, StatusConfig,
  StatusEntry, TRANSITION_KEY, TRANSITION_LIST_SEPARATOR, TransitionSpec,
};
