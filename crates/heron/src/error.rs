//! Engine start-up errors.

use heron_config::ConfigError;
use heron_core::HeronError;
use heron_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while building an [`Engine`](crate::Engine).
///
/// Request-time failures never surface here; the dispatcher turns them into
/// error documents.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Resource definitions or controllers are declared incorrectly.
    #[error("invalid engine setup: {0}")]
    Setup(#[from] HeronError),

    /// Logging or metrics could not be installed.
    #[error("telemetry initialization failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Result alias for engine start-up.
pub type EngineResult<T> = Result<T, EngineError>;
