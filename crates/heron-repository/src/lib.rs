//! # Heron Repository
//!
//! The resource registry and the bridge between the engine and user-written
//! repositories.
//!
//! - [`ResourceRegistry`] - Registered resource types and their relationships
//! - [`Repository`] / [`RepositoryMethod`] - The capability-tagged method contract
//! - [`MethodTable`] - Lazy, cached capability discovery
//! - [`ParametersFactory`] / [`ParameterProviders`] - Argument assembly
//! - [`ResourceRepositoryAdapter`] / [`RelationshipRepositoryAdapter`] - Typed
//!   access used by controllers
//! - [`fixtures`] - In-memory repositories for development and tests
//!
//! # Example
//!
//! ```rust
//! use heron_core::{Capability, RequestContext, Resource};
//! use heron_repository::{
//!     ParamSlot, Repository, RepositoryMethod, ResourceDefinition, ResourceRegistry, Returned,
//! };
//! use std::sync::Arc;
//!
//! struct Greetings;
//!
//! impl Repository for Greetings {
//!     fn name(&self) -> &str {
//!         "greetings"
//!     }
//!
//!     fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
//!         vec![RepositoryMethod::new(Capability::FindOne, [ParamSlot::Id], |args| {
//!             let id = args.id(0)?.clone();
//!             Ok(Returned::Resource(
//!                 Resource::new("greetings").with_id(id).with_attribute("text", "hello"),
//!             ))
//!         })]
//!     }
//! }
//!
//! let registry = ResourceRegistry::new();
//! registry.register(ResourceDefinition::builder("greetings").repository(Arc::new(Greetings)));
//!
//! let adapter = registry.resource_adapter("greetings").unwrap();
//! let greeting = adapter.find_one("1", &RequestContext::new()).unwrap();
//! assert_eq!(greeting.attribute("text").unwrap(), "hello");
//! ```

#![doc(html_root_url = "https://docs.rs/heron-repository/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod definition;
mod discovery;
pub mod fixtures;
mod method;
mod parameters;
mod provider;
mod registry;

pub use adapter::{RelationshipRepositoryAdapter, ResourceRepositoryAdapter};
pub use definition::{
    Cardinality, EntityShape, RelationshipField, ResourceDefinition, ResourceDefinitionBuilder,
};
pub use discovery::MethodTable;
pub use method::{Arg, Args, ParamSlot, Repository, RepositoryMethod, Returned};
pub use parameters::ParametersFactory;
pub use provider::{FnProvider, ParameterProvider, ParameterProviders};
pub use registry::ResourceRegistry;
