//! Error types for Heron.
//!
//! This module provides the [`HeronError`] type, the single error type that
//! flows between the path parser, the repository adapters, the controllers and
//! user-supplied repositories.
//!
//! Errors fall into two classes:
//!
//! | Class | Categories | Meaning |
//! |---|---|---|
//! | client | `NotFound`, `BadRequest`, `MethodNotAllowed`, `Unprocessable` | the request cannot be served as written |
//! | server | `Configuration`, `Internal` | a repository or the engine is set up incorrectly, or failed |
//!
//! Errors raised by repository code (for example [`HeronError::ResourceNotFound`])
//! travel through the adapters unchanged. Failures of the invocation mechanism
//! itself are reported as [`HeronError::InvocationFault`] so they are never
//! mistaken for a legitimate "not found".

use crate::Capability;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias using [`HeronError`].
pub type HeronResult<T> = Result<T, HeronError>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The addressed resource, type or relationship does not exist.
    NotFound,
    /// The request path or body is malformed.
    BadRequest,
    /// No controller serves the path with this verb.
    MethodNotAllowed,
    /// A business rule rejected the request.
    Unprocessable,
    /// A repository or controller set is declared incorrectly.
    Configuration,
    /// Any other server-side failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` when the request itself is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Configuration | Self::Internal)
    }

    /// Returns the snake_case label used in logs and metrics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Unprocessable => "unprocessable",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

/// Standard error type for Heron.
///
/// # Example
///
/// ```
/// use heron_core::{ErrorCategory, HeronError};
///
/// fn load(id: &str) -> Result<(), HeronError> {
///     Err(HeronError::not_found_resource("tasks", id))
/// }
///
/// let err = load("7").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// ```
#[derive(Error, Debug)]
pub enum HeronError {
    /// The path names a resource type that is not registered.
    #[error("Unknown resource type: {resource_type}")]
    UnknownResourceType {
        /// The unresolved type name.
        resource_type: String,
    },

    /// The path names a relationship the resource type does not declare.
    #[error("Unknown relationship '{relationship}' on resource type {resource_type}")]
    UnknownRelationship {
        /// The owning resource type.
        resource_type: String,
        /// The unresolved relationship name.
        relationship: String,
    },

    /// The path does not match any supported shape.
    #[error("Malformed path '{path}': {reason}")]
    MalformedPath {
        /// The raw path.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },

    /// An identifier could not be coerced to the resource's id type.
    #[error("Invalid id '{value}': expected {expected}")]
    InvalidId {
        /// The raw identifier.
        value: String,
        /// The expected id type.
        expected: String,
    },

    /// The request body is missing or does not fit the operation.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// No controller accepts the path with this verb.
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed {
        /// The request verb.
        method: String,
        /// The canonical path.
        path: String,
    },

    /// A repository reported that the addressed entity does not exist.
    #[error("Not found: {message}")]
    ResourceNotFound {
        /// Human-readable error message.
        message: String,
        /// The type of resource that was not found.
        resource_type: Option<String>,
        /// The identifier of the resource.
        resource_id: Option<String>,
    },

    /// A repository rejected the request on a business rule.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
        /// Field-specific validation errors.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// A capability was exercised that the repository does not declare.
    #[error("Repository {repository} does not declare a {capability} method")]
    CapabilityNotDeclared {
        /// The missing capability.
        capability: Capability,
        /// The repository name.
        repository: String,
    },

    /// A repository method is declared with a parameter list or return shape
    /// the adapter cannot serve.
    #[error("Invalid {capability} method on repository {repository}: {reason}")]
    InvalidHandlerMethodShape {
        /// The capability of the malformed method.
        capability: Capability,
        /// The repository name.
        repository: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// No rule or provider could supply a declared parameter.
    #[error("Cannot resolve parameter {position} ({slot}) of {capability} on repository {repository}")]
    UnresolvedParameter {
        /// The capability being invoked.
        capability: Capability,
        /// The repository name.
        repository: String,
        /// Zero-based parameter position.
        position: usize,
        /// The declared parameter kind.
        slot: String,
    },

    /// More than one controller claims the same path and verb.
    #[error("Controllers {controllers:?} all accept {method} {path}")]
    AmbiguousController {
        /// The request verb.
        method: String,
        /// The canonical path.
        path: String,
        /// Names of the overlapping controllers.
        controllers: Vec<String>,
    },

    /// The invocation mechanism failed (argument binding or return shape).
    #[error("Invocation of {capability} on repository {repository} failed: {reason}")]
    InvocationFault {
        /// The capability being invoked.
        capability: Capability,
        /// The repository name.
        repository: String,
        /// What went wrong.
        reason: String,
    },

    /// An opaque failure raised by repository code.
    #[error("Repository failure: {message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: anyhow::Error,
    },
}

impl HeronError {
    /// Creates an unknown resource type error.
    #[must_use]
    pub fn unknown_resource_type(resource_type: impl Into<String>) -> Self {
        Self::UnknownResourceType {
            resource_type: resource_type.into(),
        }
    }

    /// Creates an unknown relationship error.
    #[must_use]
    pub fn unknown_relationship(
        resource_type: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self::UnknownRelationship {
            resource_type: resource_type.into(),
            relationship: relationship.into(),
        }
    }

    /// Creates a malformed path error.
    #[must_use]
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            message: message.into(),
            resource_type: None,
            resource_id: None,
        }
    }

    /// Creates a not found error with resource context.
    #[must_use]
    pub fn not_found_resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_id = resource_id.into();
        Self::ResourceNotFound {
            message: format!("{resource_type} with ID '{resource_id}' not found"),
            resource_type: Some(resource_type),
            resource_id: Some(resource_id),
        }
    }

    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Wraps an opaque repository failure.
    pub fn handler(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Handler {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Creates an invocation fault.
    #[must_use]
    pub fn invocation_fault(
        capability: Capability,
        repository: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvocationFault {
            capability,
            repository: repository.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid handler method error.
    #[must_use]
    pub fn invalid_method_shape(
        capability: Capability,
        repository: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidHandlerMethodShape {
            capability,
            repository: repository.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownResourceType { .. }
            | Self::UnknownRelationship { .. }
            | Self::ResourceNotFound { .. } => ErrorCategory::NotFound,
            Self::MalformedPath { .. } | Self::InvalidId { .. } | Self::BadRequest { .. } => {
                ErrorCategory::BadRequest
            }
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Validation { .. } => ErrorCategory::Unprocessable,
            Self::CapabilityNotDeclared { .. }
            | Self::InvalidHandlerMethodShape { .. }
            | Self::UnresolvedParameter { .. }
            | Self::AmbiguousController { .. } => ErrorCategory::Configuration,
            Self::InvocationFault { .. } | Self::Handler { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownResourceType { .. } => "UNKNOWN_RESOURCE_TYPE",
            Self::UnknownRelationship { .. } => "UNKNOWN_RELATIONSHIP",
            Self::MalformedPath { .. } => "MALFORMED_PATH",
            Self::InvalidId { .. } => "INVALID_ID",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::ResourceNotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::CapabilityNotDeclared { .. } => "CAPABILITY_NOT_DECLARED",
            Self::InvalidHandlerMethodShape { .. } => "INVALID_HANDLER_METHOD",
            Self::UnresolvedParameter { .. } => "UNRESOLVED_PARAMETER",
            Self::AmbiguousController { .. } => "AMBIGUOUS_CONTROLLER",
            Self::InvocationFault { .. } => "INVOCATION_FAULT",
            Self::Handler { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a short, human-readable summary of the problem kind.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::UnknownResourceType { .. } => "Unknown resource type",
            Self::UnknownRelationship { .. } => "Unknown relationship",
            Self::MalformedPath { .. } => "Malformed path",
            Self::InvalidId { .. } => "Invalid identifier",
            Self::BadRequest { .. } => "Bad request",
            Self::MethodNotAllowed { .. } => "Method not allowed",
            Self::ResourceNotFound { .. } => "Resource not found",
            Self::Validation { .. } => "Validation failed",
            _ => "Internal server error",
        }
    }
}

/// Field-specific validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Field validation errors")]
pub struct FieldErrors {
    /// Map of field name to list of error messages.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
