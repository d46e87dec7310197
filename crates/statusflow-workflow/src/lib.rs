//! Statusflow Workflow
//!
//! Core types shared by every statusflow crate:
//! - [`StatusId`], the canonical `workflowId/localId` identifier, and the
//!   id-format predicates
//! - [`IdContext`] and [`StatusHolder`], used to complete local status ids
//! - [`WorkflowDefinition`], the normalized form of a raw definition
//! - the graph entities [`Workflow`], [`Status`] and [`Transition`]

mod context;
mod definition;
mod error;
mod id;
mod label;
mod status;
mod transition;
mod workflow;

pub use context::{IdContext, StatusHolder};
pub use definition::{Properties, StatusDefinition, WorkflowDefinition};
pub use error::IdError;
pub use id::{
  SEPARATOR, StatusId, is_valid_status_id, is_valid_status_local_id, is_valid_workflow_id,
  validate_workflow_id,
};
pub use label::humanize;
pub use status::Status;
pub use transition::Transition;
pub use workflow::Workflow;
