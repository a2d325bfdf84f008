//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, EngineConfig, LogFormat, TelemetryConfigSection};

/// Complete Heron configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use heron_config::HeronConfig;
///
/// let config = HeronConfig::default();
/// assert_eq!(config.engine.max_ids_per_request, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeronConfig {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetryConfigSection,
}

impl HeronConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> HeronConfigBuilder {
        HeronConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Constraint` if:
    /// - `engine.base_path` does not start with `/`
    /// - `engine.max_ids_per_request` is zero
    /// - `telemetry.logging.level` is blank
    /// - `telemetry.metrics.histogram_buckets` is empty while metrics are enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.engine.base_path.starts_with('/') {
            return Err(ConfigError::constraint(
                "engine.base_path",
                format!("must start with '/', got {:?}", self.engine.base_path),
            ));
        }

        if self.engine.max_ids_per_request == 0 {
            return Err(ConfigError::constraint(
                "engine.max_ids_per_request",
                "must be greater than zero",
            ));
        }

        if self.telemetry.logging.level.trim().is_empty() {
            return Err(ConfigError::constraint(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }

        if self.telemetry.metrics.enabled && self.telemetry.metrics.histogram_buckets.is_empty() {
            return Err(ConfigError::constraint(
                "telemetry.metrics.histogram_buckets",
                "must not be empty when metrics are enabled",
            ));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, internal error detail exposed.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::HeronConfig;
    ///
    /// let config = HeronConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// assert!(config.engine.expose_internal_errors);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.ansi_enabled = true;
        config.telemetry.logging.include_location = true;

        config.engine.expose_internal_errors = true;

        config
    }

    /// Production preset: JSON info logs, internal error detail hidden.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.logging.ansi_enabled = false;

        config.engine.expose_internal_errors = false;
        config.engine.verify_on_startup = true;

        config
    }
}

/// Builder for [`HeronConfig`].
#[derive(Debug, Default)]
pub struct HeronConfigBuilder {
    engine: Option<EngineConfig>,
    telemetry: Option<TelemetryConfigSection>,
}

impl HeronConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration.
    #[must_use]
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfigSection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> HeronConfig {
        HeronConfig {
            engine: self.engine.unwrap_or_default(),
            telemetry: self.telemetry.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HeronConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggingConfig, MetricsConfig};

    #[test]
    fn test_default_config() {
        let config = HeronConfig::default();
        assert_eq!(config.engine.base_path, "/");
        assert!(config.engine.verify_on_startup);
        assert!(!config.engine.expose_internal_errors);
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_builder_sections() {
        let config = HeronConfig::builder()
            .engine(EngineConfig {
                base_path: "/api".to_string(),
                ..Default::default()
            })
            .build();

        assert_eq!(config.engine.base_path, "/api");
        assert_eq!(config.telemetry, TelemetryConfigSection::default());
    }

    #[test]
    fn test_validate_base_path() {
        let result = HeronConfig::builder()
            .engine(EngineConfig {
                base_path: "api".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("engine.base_path"));
    }

    #[test]
    fn test_validate_max_ids() {
        let config = HeronConfig::builder()
            .engine(EngineConfig {
                max_ids_per_request: 0,
                ..Default::default()
            })
            .build();

        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_ids_per_request"));
    }

    #[test]
    fn test_validate_log_level() {
        let config = HeronConfig::builder()
            .telemetry(TelemetryConfigSection {
                logging: LoggingConfig {
                    level: "  ".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .build();

        assert!(config.validate().unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_validate_histogram_buckets() {
        let mut config = HeronConfig::default();
        config.telemetry.metrics = MetricsConfig {
            enabled: true,
            histogram_buckets: Vec::new(),
        };
        assert!(config.validate().is_err());

        config.telemetry.metrics.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let development = HeronConfig::development();
        assert_eq!(development.telemetry.logging.format, LogFormat::Pretty);
        assert!(development.engine.expose_internal_errors);
        assert!(development.validate().is_ok());

        let production = HeronConfig::production();
        assert_eq!(production.telemetry.logging.format, LogFormat::Json);
        assert!(!production.engine.expose_internal_errors);
        assert!(production.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip_sections() {
        let text = toml::to_string_pretty(&HeronConfig::default()).unwrap();
        assert!(text.contains("[engine]"));
        assert!(text.contains("[telemetry.logging]"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<HeronConfig, _> = toml::from_str(
            r#"
            [engine]
            base_path = "/api"
            http_addr = "0.0.0.0:8080"
            "#,
        );
        assert!(result.is_err());
    }
}
