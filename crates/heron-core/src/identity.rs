//! Security principal.
//!
//! The engine does not authenticate or authorize anything. The transport layer
//! places whatever it authenticated into the [`RequestContext`](crate::RequestContext)
//! as a [`Principal`], and repositories can ask for it as a parameter.

use serde::{Deserialize, Serialize};

/// The caller a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    /// No authenticated caller.
    #[default]
    Anonymous,
    /// An authenticated subject.
    Subject {
        /// Stable subject identifier.
        id: String,
        /// Roles granted to the subject.
        #[serde(default)]
        roles: Vec<String>,
    },
}

impl Principal {
    /// Creates an authenticated subject with no roles.
    #[must_use]
    pub fn subject(id: impl Into<String>) -> Self {
        Self::Subject {
            id: id.into(),
            roles: Vec::new(),
        }
    }

    /// Adds a role to an authenticated subject. No-op for anonymous callers.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        if let Self::Subject { roles, .. } = &mut self {
            roles.push(role.into());
        }
        self
    }

    /// Returns a string identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::Anonymous => "anonymous".to_string(),
            Self::Subject { id, .. } => format!("subject:{id}"),
        }
    }

    /// Returns `true` if the subject holds the role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            Self::Anonymous => false,
            Self::Subject { roles, .. } => roles.iter().any(|r| r == role),
        }
    }
}
