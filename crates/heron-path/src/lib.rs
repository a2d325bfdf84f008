//! Path model and parser for Heron.
//!
//! Every request names its target with a slash-delimited path. This crate
//! parses such paths into a [`JsonPath`], validating resource types and
//! relationship names against a live [`PathSchema`] (implemented by the
//! resource registry).
//!
//! # Example
//!
//! ```rust
//! use heron_core::{HeronError, HeronResult};
//! use heron_path::{JsonPath, PathBuilder, PathKind, PathSchema};
//!
//! struct Schema;
//!
//! impl PathSchema for Schema {
//!     fn check_type(&self, resource_type: &str) -> HeronResult<()> {
//!         match resource_type {
//!             "tasks" | "projects" => Ok(()),
//!             other => Err(HeronError::unknown_resource_type(other)),
//!         }
//!     }
//!
//!     fn check_relationship(&self, resource_type: &str, name: &str) -> HeronResult<()> {
//!         match (resource_type, name) {
//!             ("tasks", "project") => Ok(()),
//!             _ => Err(HeronError::unknown_relationship(resource_type, name)),
//!         }
//!     }
//! }
//!
//! let path = PathBuilder::new(&Schema).build("/tasks/1/relationships/project").unwrap();
//! assert_eq!(path.kind(), PathKind::Relationships);
//! assert_eq!(path, JsonPath::relationships("tasks", "1", "project"));
//! ```

#![doc(html_root_url = "https://docs.rs/heron-path/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod path;

pub use builder::{PathBuilder, PathSchema};
pub use path::{JsonPath, PathIds, PathKind};
