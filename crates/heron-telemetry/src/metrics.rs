//! Engine metrics.
//!
//! Metrics are emitted through the `metrics` facade. [`init_metrics`] installs
//! a Prometheus recorder without an HTTP listener; the transport that embeds
//! the engine serves [`render_metrics`] wherever it likes.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heron_requests_total` | Counter | `controller`, `status` | Dispatched requests |
//! | `heron_request_duration_seconds` | Histogram | `controller` | Dispatch latency |
//! | `heron_repository_invocations_total` | Counter | `capability`, `outcome` | Repository method calls |
//!
//! Recording before [`init_metrics`] is a no-op.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Requests counter name.
pub const REQUESTS_TOTAL: &str = "heron_requests_total";

/// Request latency histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "heron_request_duration_seconds";

/// Repository invocation counter name.
pub const REPOSITORY_INVOCATIONS_TOTAL: &str = "heron_repository_invocations_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are recorded.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ],
        }
    }
}

/// Renders the installed recorder in Prometheus text format.
#[derive(Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

impl MetricsRegistry {
    /// Wraps a recorder handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders every metric.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// Returns `None` when metrics are disabled. Calling it again after a
/// successful install returns the existing registry.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for an empty bucket list and
/// `TelemetryError::MetricsInit` if another recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(Some(MetricsRegistry::new(handle.clone())));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();
    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Renders metrics, or `None` before [`init_metrics`].
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(
        REQUEST_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent dispatching a request"
    );
    describe_counter!(
        REPOSITORY_INVOCATIONS_TOTAL,
        "Total number of repository method invocations"
    );
}

/// Records a dispatched request.
pub fn record_request(controller: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "controller" => controller.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        REQUEST_DURATION_SECONDS,
        "controller" => controller.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a repository method invocation. `outcome` is `ok` or an error
/// category label.
pub fn record_repository_invocation(capability: &str, outcome: &str) {
    counter!(
        REPOSITORY_INVOCATIONS_TOTAL,
        "capability" => capability.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
