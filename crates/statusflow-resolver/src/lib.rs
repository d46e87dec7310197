//! Statusflow Resolver
//!
//! Turns a raw, shorthand workflow definition into its canonical
//! [`WorkflowDefinition`](statusflow_workflow::WorkflowDefinition):
//! - every status and transition target id is canonicalized
//! - the initial status must be declared
//! - transition targets in the same workflow must be declared
//!
//! Any failure is a [`DefinitionError`].

mod error;
mod normalize;

pub use error::DefinitionError;
pub use normalize::{normalize, normalize_raw};
