//! Logging and metrics for the Heron engine.
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter` and JSON or pretty output
//! - **Metrics**: the `metrics` facade backed by a Prometheus recorder
//!
//! The engine itself only emits `tracing` events and `metrics` samples. This
//! crate installs the global subscriber and recorder that collect them.
//!
//! # Example
//!
//! ```rust,no_run
//! use heron_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let telemetry = init_telemetry(&TelemetryConfig::production()).unwrap();
//! if let Some(metrics) = telemetry.metrics() {
//!     println!("{}", metrics.render());
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{init_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Handles to the installed telemetry.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    metrics: Option<MetricsRegistry>,
}

impl Telemetry {
    /// Returns the metrics registry, if metrics are enabled.
    #[must_use]
    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_ref()
    }
}

/// Installs logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to install.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Telemetry> {
    init_logging(&config.logging)?;
    let metrics = init_metrics(&config.metrics)?;
    Ok(Telemetry { metrics })
}
