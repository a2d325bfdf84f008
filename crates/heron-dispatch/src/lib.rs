//! # Heron Dispatch
//!
//! Turns a decoded request into a response document.
//!
//! - [`RequestDispatcher`] - Strips the base path, parses the path, selects
//!   a controller and maps errors
//! - [`ControllerRegistry`] - The ordered controller set; exactly one
//!   controller must accept each path and verb
//! - [`controller`] - The nine standard controllers
//! - [`Response`] / [`PrimaryData`] - Controller results
//!
//! The crate never touches bytes or sockets. A transport decodes the
//! request into a [`heron_core::RequestBody`] and encodes the
//! [`Document`] it gets back.

#![doc(html_root_url = "https://docs.rs/heron-dispatch/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod controller;
mod dispatcher;
mod registry;
mod response;

pub use controller::{default_controllers, Controller};
pub use dispatcher::{RequestDispatcher, RequestDispatcherBuilder, DEFAULT_MAX_IDS_PER_REQUEST};
pub use registry::ControllerRegistry;
pub use response::{Document, PrimaryData, Response};
