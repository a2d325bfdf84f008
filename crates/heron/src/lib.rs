//! # Heron
//!
//! **A resource-oriented API protocol engine**
//!
//! Heron serves JSON:API-style requests against user-written repositories:
//!
//! - **Path parsing** - `/tasks/1/relationships/project` becomes a typed path,
//!   validated against the registered resource types
//! - **Controllers** - exactly one of nine controllers serves each path and verb
//! - **Repository adapters** - repositories declare capability-tagged methods;
//!   the engine discovers them lazily and assembles their arguments
//! - **Error documents** - every failure becomes a protocol error document
//!
//! The engine is transport-agnostic: an HTTP layer decodes requests into
//! [`RequestBody`](heron_core::RequestBody) values and encodes the
//! [`Document`](heron_dispatch::Document) it gets back.
//!
//! ## Quick Start
//!
//! ```rust
//! use heron::prelude::*;
//! use heron::fixtures::Fixtures;
//!
//! let engine = Engine::builder()
//!     .config(HeronConfig::development())
//!     .resources(Fixtures::new().definitions())
//!     .build()
//!     .unwrap();
//!
//! let ctx = RequestContext::new();
//! let response = engine.dispatch(&Method::GET, "/tasks/1", &ctx, None);
//! assert_eq!(response.status, StatusCode::NOT_FOUND);
//!
//! let response = engine.dispatch(&Method::GET, "/tasks/1/relationships/project", &ctx, None);
//! assert!(response.data().unwrap().is_null());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! method + path + body
//!   -> base path strip -> PathBuilder -> ControllerRegistry::find
//!   -> Controller -> Resource/Relationship adapters -> Repository methods
//!   -> Response or ErrorMapperRegistry -> Document
//! ```

#![doc(html_root_url = "https://docs.rs/heron/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod error;

pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, EngineResult};

// Re-export core types
pub use heron_core as core;

// Re-export path types
pub use heron_path as path;

// Re-export repository types
pub use heron_repository as repository;

// Re-export the fixture repositories
pub use heron_repository::fixtures;

// Re-export dispatch types
pub use heron_dispatch as dispatch;

// Re-export configuration types
pub use heron_config as config;

// Re-export telemetry types
pub use heron_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
///
/// let ctx = RequestContext::new();
/// assert!(ctx.params().is_empty());
/// ```
pub mod prelude {
    pub use crate::{Engine, EngineBuilder, EngineError};

    pub use heron_core::{
        Capability, DataBody, ErrorData, ErrorResponse, HeronError, HeronResult, IdType, Linkage,
        Method, Principal, RequestBody, RequestContext, RequestParams, Resource, ResourceId,
        ResourceIdentifier, StatusCode,
    };

    // Re-export DI types
    pub use heron_core::di::Container;

    pub use heron_repository::{
        ParamSlot, ParameterProvider, Repository, RepositoryMethod, ResourceDefinition,
        ResourceRegistry, Returned,
    };

    pub use heron_dispatch::{Controller, Document, PrimaryData, Response};

    pub use heron_config::{ConfigLoader, HeronConfig};
}
