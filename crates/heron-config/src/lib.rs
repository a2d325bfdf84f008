//! Typed configuration for Heron.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides, optionally seeded from a `.env` file
//! - Strict parsing (unknown fields are rejected)
//! - Layered loading (defaults → file → env), then validation
//!
//! # Configuration File Format
//!
//! ```toml
//! [engine]
//! base_path = "/api"
//! verify_on_startup = true
//! expose_internal_errors = false
//! max_ids_per_request = 100
//!
//! [telemetry.logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values are overridden with variables named `PREFIX__SECTION__KEY`:
//!
//! - `HERON__ENGINE__BASE_PATH=/api`
//! - `HERON__TELEMETRY__LOGGING__LEVEL=debug`
//! - `HERON__TELEMETRY__METRICS__ENABLED=false`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{HeronConfig, HeronConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{EngineConfig, LogFormat, LoggingConfig, MetricsConfig, TelemetryConfigSection};
