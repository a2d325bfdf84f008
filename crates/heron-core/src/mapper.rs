//! Mapping from [`HeronError`] to error documents.
//!
//! Every failure resolves to an [`ErrorResponse`] holding at least one
//! [`ErrorData`]. Deployments can register [`ErrorMapper`]s that take precedence
//! over the built-in mapping, which is mostly useful for opaque
//! [`HeronError::Handler`] failures carrying a domain error type.

use crate::{ErrorData, HeronError};
use http::StatusCode;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

/// An error document together with its response status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// The HTTP status of the response.
    #[serde(skip)]
    pub status: StatusCode,
    /// The error objects.
    pub errors: Vec<ErrorData>,
}

impl ErrorResponse {
    /// Creates a response with a single error object.
    #[must_use]
    pub fn single(status: StatusCode, error: ErrorData) -> Self {
        Self {
            status,
            errors: vec![error],
        }
    }
}

/// Converts an error into an error document.
///
/// Returning `None` declines the error and lets the next mapper (or the
/// built-in mapping) handle it.
pub trait ErrorMapper: Send + Sync + 'static {
    /// Maps the error, or declines.
    fn map(&self, error: &HeronError) -> Option<ErrorResponse>;
}

impl<F> ErrorMapper for F
where
    F: Fn(&HeronError) -> Option<ErrorResponse> + Send + Sync + 'static,
{
    fn map(&self, error: &HeronError) -> Option<ErrorResponse> {
        self(error)
    }
}

/// Maps [`HeronError::Handler`] failures whose source is an `E`.
pub struct HandlerErrorMapper<E, F> {
    func: F,
    _phantom: PhantomData<fn(&E)>,
}

impl<E, F> HandlerErrorMapper<E, F>
where
    E: std::error::Error + Send + Sync + 'static,
    F: Fn(&E) -> ErrorResponse + Send + Sync + 'static,
{
    /// Creates a mapper for the source error type `E`.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<E, F> ErrorMapper for HandlerErrorMapper<E, F>
where
    E: std::error::Error + Send + Sync + 'static,
    F: Fn(&E) -> ErrorResponse + Send + Sync + 'static,
{
    fn map(&self, error: &HeronError) -> Option<ErrorResponse> {
        match error {
            HeronError::Handler { source, .. } => source.downcast_ref::<E>().map(&self.func),
            _ => None,
        }
    }
}

/// Ordered set of [`ErrorMapper`]s with a built-in fallback.
#[derive(Clone, Default)]
pub struct ErrorMapperRegistry {
    mappers: Vec<Arc<dyn ErrorMapper>>,
    expose_internal_errors: bool,
}

impl ErrorMapperRegistry {
    /// Creates a registry with only the built-in mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes internal error messages in server-class error documents.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Registers a mapper. Mappers are consulted in registration order.
    pub fn register(&mut self, mapper: impl ErrorMapper) {
        self.mappers.push(Arc::new(mapper));
    }

    /// Registers a mapper for handler failures caused by an `E`.
    pub fn on_handler_error<E, F>(&mut self, func: F)
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E) -> ErrorResponse + Send + Sync + 'static,
    {
        self.register(HandlerErrorMapper::<E, F>::new(func));
    }

    /// Returns the number of registered mappers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// Returns `true` if only the built-in mapping is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Converts an error into an error document.
    #[must_use]
    pub fn to_response(&self, error: &HeronError) -> ErrorResponse {
        self.mappers
            .iter()
            .find_map(|mapper| mapper.map(error))
            .unwrap_or_else(|| self.default_response(error))
    }

    fn default_response(&self, error: &HeronError) -> ErrorResponse {
        let status = error.status_code();
        let base = || {
            ErrorData::builder()
                .status(status.as_u16().to_string())
                .code(error.error_code())
                .title(error.title())
        };

        if error.category().is_client_error() {
            return match error {
                HeronError::Validation {
                    message,
                    field_errors: Some(fields),
                } if !fields.is_empty() => {
                    let errors = fields
                        .fields
                        .iter()
                        .flat_map(|(field, messages)| {
                            messages.iter().map(move |detail| (field, detail))
                        })
                        .map(|(field, detail)| {
                            base()
                                .detail(detail.clone())
                                .source_pointer(format!("/data/attributes/{field}"))
                                .meta("message", message.clone())
                                .build()
                        })
                        .collect();
                    ErrorResponse { status, errors }
                }
                HeronError::ResourceNotFound {
                    message,
                    resource_type,
                    resource_id,
                } => {
                    let mut builder = base().detail(message.clone());
                    if let Some(resource_type) = resource_type {
                        builder = builder.meta("resource_type", resource_type.clone());
                    }
                    if let Some(resource_id) = resource_id {
                        builder = builder.source_parameter("id").meta("resource_id", resource_id.clone());
                    }
                    ErrorResponse::single(status, builder.build())
                }
                _ => ErrorResponse::single(status, base().detail(error.to_string()).build()),
            };
        }

        // Server-class errors get an occurrence id so logs and documents correlate.
        let mut builder = base().id(Uuid::now_v7().to_string());
        if self.expose_internal_errors {
            builder = builder.detail(error.to_string());
        }
        ErrorResponse::single(status, builder.build())
    }
}

impl fmt::Debug for ErrorMapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMapperRegistry")
            .field("mapper_count", &self.mappers.len())
            .field("expose_internal_errors", &self.expose_internal_errors)
            .finish()
    }
}
