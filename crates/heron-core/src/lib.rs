//! # Heron Core
//!
//! Core types shared by every Heron crate.
//!
//! - [`HeronError`] - The engine's error taxonomy, with [`ErrorCategory`] classification
//! - [`ErrorData`] / [`ErrorMapperRegistry`] - Protocol error documents and how errors become them
//! - [`Resource`], [`ResourceId`], [`IdType`] - Engine-side view of domain objects
//! - [`RequestBody`] - Decoded request documents
//! - [`RequestContext`] - Per-request parameters and security principal
//! - [`Capability`] - Operation tags for repository methods
//! - [`di::Container`] - Typed services handed to repositories

#![doc(html_root_url = "https://docs.rs/heron-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod capability;
mod context;
pub mod di;
mod error;
mod error_data;
mod identity;
mod mapper;
mod resource;

pub use body::{DataBody, Linkage, PrimaryBody, RequestBody};
pub use capability::Capability;
pub use context::{RequestContext, RequestId, RequestParams};
pub use error::{ErrorCategory, FieldErrors, HeronError, HeronResult};
pub use error_data::{ErrorData, ErrorDataBuilder};
pub use identity::Principal;
pub use mapper::{ErrorMapper, ErrorMapperRegistry, ErrorResponse, HandlerErrorMapper};
pub use resource::{IdType, Resource, ResourceId, ResourceIdentifier};

// Re-export http types used in public signatures
pub use http::{Method, StatusCode};
