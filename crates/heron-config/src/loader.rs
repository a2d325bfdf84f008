//! Layered configuration loading.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, HeronConfig, LogFormat};

/// Configuration loader.
///
/// Later layers override earlier ones:
/// 1. Default values, or a preset
/// 2. A configuration file (TOML or JSON)
/// 3. Environment variables named `PREFIX__SECTION__KEY`
///
/// A file replaces the whole configuration; fields it omits take their
/// defaults.
///
/// # Example
///
/// ```no_run
/// use heron_config::ConfigLoader;
///
/// # fn main() -> Result<(), heron_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("heron.toml")?
///     .with_dotenv()?
///     .with_env_prefix("HERON")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HeronConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HeronConfig::default(),
            env_prefix: None,
        }
    }

    /// Start from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HeronConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HeronConfig::production();
        self
    }

    /// Load a configuration file. The format follows the extension
    /// (`.toml` or `.json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed or
    /// contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::missing(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;
        self.config = Self::parse_file(&content, path)?;

        Ok(self)
    }

    /// Load a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or
    /// `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unsupported.
    ///
    /// # Example
    ///
    /// ```
    /// use heron_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[engine]\nbase_path = \"/api\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.engine.base_path, "/api");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(format.to_string()))
            }
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides, e.g. `HERON` for
    /// `HERON__ENGINE__BASE_PATH`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load `.env` from the working directory into the process environment,
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific environment file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path)?;
        Ok(self)
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or validation
    /// fails.
    pub fn load(mut self) -> Result<HeronConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Return the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HeronConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<HeronConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(
                extension.unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let env_vars: HashMap<String, String> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Another variable that merely shares the prefix, e.g. HERON_HOME.
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let engine = &mut self.config.engine;
        let telemetry = &mut self.config.telemetry;

        match parts.as_slice() {
            ["ENGINE", "BASE_PATH"] => {
                engine.base_path = value.to_string();
            }
            ["ENGINE", "VERIFY_ON_STARTUP"] => {
                engine.verify_on_startup = parse_bool(key, value)?;
            }
            ["ENGINE", "EXPOSE_INTERNAL_ERRORS"] => {
                engine.expose_internal_errors = parse_bool(key, value)?;
            }
            ["ENGINE", "MAX_IDS_PER_REQUEST"] => {
                engine.max_ids_per_request = value
                    .parse()
                    .map_err(|_| {
                        ConfigError::override_rejected(key, value, "expected an integer")
                    })?;
            }

            ["TELEMETRY", "LOGGING", "ENABLED"] => {
                telemetry.logging.enabled = parse_bool(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "LEVEL"] => {
                telemetry.logging.level = value.to_string();
            }
            ["TELEMETRY", "LOGGING", "FORMAT"] => {
                telemetry.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::override_rejected(
                            key,
                            value,
                            "expected json or pretty",
                        ))
                    }
                };
            }
            ["TELEMETRY", "LOGGING", "ANSI_ENABLED"] => {
                telemetry.logging.ansi_enabled = parse_bool(key, value)?;
            }
            ["TELEMETRY", "LOGGING", "INCLUDE_LOCATION"] => {
                telemetry.logging.include_location = parse_bool(key, value)?;
            }

            ["TELEMETRY", "METRICS", "ENABLED"] => {
                telemetry.metrics.enabled = parse_bool(key, value)?;
            }
            ["TELEMETRY", "METRICS", "HISTOGRAM_BUCKETS"] => {
                telemetry.metrics.histogram_buckets = value
                    .split(',')
                    .map(|bucket| bucket.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| {
                        ConfigError::override_rejected(
                            key,
                            value,
                            "expected comma-separated numbers",
                        )
                    })?;
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::override_rejected(key, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HeronConfig::default());
    }

    #[test]
    fn test_loader_presets() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.telemetry.logging.format, LogFormat::Pretty);

        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.telemetry.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [engine]
            base_path = "/api"
            expose_internal_errors = true

            [telemetry.logging]
            level = "heron_dispatch=debug,info"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.engine.base_path, "/api");
        assert!(config.engine.expose_internal_errors);
        assert_eq!(config.engine.max_ids_per_request, 100);
        assert_eq!(config.telemetry.logging.level, "heron_dispatch=debug,info");
    }

    #[test]
    fn test_loader_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"engine": {{"max_ids_per_request": 5}}}}"#).unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.engine.max_ids_per_request, 5);
    }

    #[test]
    fn test_loader_rejects_unknown_extension_and_fields() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(ConfigLoader::new().with_file(file.path()).is_err());

        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_loader_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/heron.toml");
        assert!(matches!(result, Err(ConfigError::Missing { .. })));

        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/heron.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.engine.base_path, "/");
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string(r#"{"engine": {"base_path": "api"}}"#, "json")
            .unwrap()
            .load();
        assert_eq!(result.unwrap_err().key(), Some("engine.base_path"));
    }

    // Overrides are exercised through apply_env_var directly: mutating the
    // process environment would race with other tests.

    #[test]
    fn test_apply_env_var_engine() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__ENGINE__BASE_PATH", "/v1", "TEST").unwrap();
        loader
            .apply_env_var("TEST__ENGINE__MAX_IDS_PER_REQUEST", "7", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ENGINE__VERIFY_ON_STARTUP", "off", "TEST")
            .unwrap();

        assert_eq!(loader.config.engine.base_path, "/v1");
        assert_eq!(loader.config.engine.max_ids_per_request, 7);
        assert!(!loader.config.engine.verify_on_startup);
    }

    #[test]
    fn test_apply_env_var_telemetry() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__TELEMETRY__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__TELEMETRY__METRICS__HISTOGRAM_BUCKETS", "0.1, 1", "TEST")
            .unwrap();

        assert_eq!(loader.config.telemetry.logging.format, LogFormat::Pretty);
        assert_eq!(loader.config.telemetry.metrics.histogram_buckets, vec![0.1, 1.0]);
    }

    #[test]
    fn test_apply_env_var_errors() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_var("TEST__ENGINE__MAX_IDS_PER_REQUEST", "many", "TEST")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Override { ref value, .. } if value == "many"
        ));
        assert!(loader
            .apply_env_var("TEST__ENGINE__EXPOSE_INTERNAL_ERRORS", "maybe", "TEST")
            .is_err());
        assert!(loader.apply_env_var("TEST_HOME", "/root", "TEST").is_ok());
        assert!(loader.apply_env_var("TEST__UNKNOWN__KEY", "x", "TEST").is_ok());
    }

    #[test]
    fn test_dotenv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "HERON_CONFIG_TEST_DOTENV_ONLY=1").unwrap();
        assert!(ConfigLoader::new().with_dotenv_file(file.path()).is_ok());
        assert!(ConfigLoader::new()
            .with_dotenv_file("/nonexistent/.env")
            .is_err());
    }
}
