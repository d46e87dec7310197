//! Statusflow Source
//!
//! Resolves workflow graphs out of raw definitions:
//! - [`DefinitionProvider`] supplies raw definitions, from memory
//!   ([`InMemoryProvider`]) or from a directory of JSON/YAML files
//!   ([`FsDefinitionProvider`])
//! - [`Source`] normalizes them on first use and builds workflows, statuses
//!   and transitions lazily, caching each one by canonical id
//! - [`ClassMap`] and [`EntityFactories`] select how each entity kind is
//!   built
//!
//! ```ignore
//! let source = Source::new(FsDefinitionProvider::new("workflows"));
//! for transition in source.get_transitions("Order/new", IdContext::None)?.iter() {
//!   println!("{} -> {}", transition.start_id(), transition.end_id());
//! }
//! ```

mod class_map;
mod config;
mod error;
mod factory;
mod fs_provider;
mod provider;
mod source;

pub use class_map::{ClassMap, DEFAULT_SELECTOR, EntityKind};
pub use config::SourceConfig;
pub use error::{ProviderError, SourceError};
pub use factory::{EntityFactories, StatusFactory, TransitionFactory, WorkflowFactory};
pub use fs_provider::FsDefinitionProvider;
pub use provider::{DefinitionProvider, InMemoryProvider};
pub use source::{Source, SourceBuilder, TransitionList};
