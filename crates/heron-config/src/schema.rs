//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Engine configuration section.
///
/// # Example
///
/// ```
/// use heron_config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.base_path, "/");
/// assert!(config.verify_on_startup);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Prefix stripped from every request path before parsing (e.g. "/api").
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Verify every registered resource type when the engine is built.
    #[serde(default = "default_true")]
    pub verify_on_startup: bool,

    /// Include internal detail in server-class error documents.
    #[serde(default)]
    pub expose_internal_errors: bool,

    /// Largest id list accepted in a single resource path.
    #[serde(default = "default_max_ids_per_request")]
    pub max_ids_per_request: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            verify_on_startup: true,
            expose_internal_errors: false,
            max_ids_per_request: default_max_ids_per_request(),
        }
    }
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_max_ids_per_request() -> usize {
    100
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in pretty output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable metrics collection.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram bucket boundaries for request duration, in seconds.
    #[serde(default = "default_histogram_buckets")]
    pub histogram_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            histogram_buckets: default_histogram_buckets(),
        }
    }
}

fn default_histogram_buckets() -> Vec<f64> {
    heron_telemetry::MetricsConfig::default().duration_buckets
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfigSection {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl From<&TelemetryConfigSection> for heron_telemetry::TelemetryConfig {
    fn from(section: &TelemetryConfigSection) -> Self {
        let logging = &section.logging;
        Self {
            logging: heron_telemetry::LogConfig {
                enabled: logging.enabled,
                level: logging.level.clone(),
                json_format: logging.format == LogFormat::Json,
                span_events: logging.format == LogFormat::Pretty,
                file_line_info: logging.include_location,
                ansi: logging.ansi_enabled,
                include_target: true,
            },
            metrics: heron_telemetry::MetricsConfig {
                enabled: section.metrics.enabled,
                duration_buckets: section.metrics.histogram_buckets.clone(),
            },
        }
    }
}

fn default_true() -> bool {
    true
}
