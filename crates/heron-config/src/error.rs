//! Errors raised while assembling an engine configuration.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No file exists at the given path.
    #[error("no configuration file at {}", path.display())]
    Missing {
        /// The path that was tried.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read configuration file {}", path.display())]
    Unreadable {
        /// The file.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The format is neither TOML nor JSON.
    #[error("unsupported configuration format `{0}`, expected toml or json")]
    UnsupportedFormat(String),

    /// A TOML document that does not fit the schema.
    #[error("malformed TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A JSON document that does not fit the schema.
    #[error("malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A `PREFIX__SECTION__KEY` override whose value has the wrong shape.
    #[error("override {var}={value:?} rejected: {expected}")]
    Override {
        /// The environment variable.
        var: String,
        /// Its raw value.
        value: String,
        /// What the key accepts.
        expected: &'static str,
    },

    /// An environment file that exists but cannot be parsed.
    #[error("cannot load environment file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A loaded value the engine cannot run with.
    #[error("{key} {constraint}")]
    Constraint {
        /// Dotted key, e.g. `engine.base_path`.
        key: &'static str,
        /// The rule the value breaks.
        constraint: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(path: &Path) -> Self {
        Self::Missing {
            path: path.to_path_buf(),
        }
    }

    pub(crate) fn unreadable(path: &Path, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn override_rejected(var: &str, value: &str, expected: &'static str) -> Self {
        Self::Override {
            var: var.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub(crate) fn constraint(key: &'static str, constraint: impl Into<String>) -> Self {
        Self::Constraint {
            key,
            constraint: constraint.into(),
        }
    }

    /// Returns the dotted key of a broken constraint.
    #[must_use]
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Constraint { key, .. } => Some(key),
            _ => None,
        }
    }
}
