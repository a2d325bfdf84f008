//! Request dispatch.
//!
//! [`RequestDispatcher`] is the single entry point of the engine. The
//! embedding transport decodes the method, path and body, builds a
//! [`RequestContext`], and hands them over; the dispatcher parses the path,
//! picks the controller and turns any failure into an error document.

use crate::registry::ControllerRegistry;
use crate::response::Response;
use heron_core::{
    ErrorMapperRegistry, HeronError, HeronResult, Method, RequestBody, RequestContext,
};
use heron_path::{JsonPath, PathBuilder};
use heron_repository::ResourceRegistry;
use heron_telemetry::metrics::record_request;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Default cap on the ids of a single resource path.
pub const DEFAULT_MAX_IDS_PER_REQUEST: usize = 100;

/// Label used in metrics when no controller was selected.
const UNROUTED: &str = "none";

/// Parses paths, selects controllers and maps errors.
///
/// # Example
///
/// ```rust
/// use heron_core::{Method, RequestContext, StatusCode};
/// use heron_dispatch::RequestDispatcher;
/// use heron_repository::fixtures::Fixtures;
/// use heron_repository::ResourceRegistry;
/// use std::sync::Arc;
///
/// let registry = Arc::new(ResourceRegistry::new());
/// Fixtures::new().register(&registry);
///
/// let dispatcher = RequestDispatcher::builder(registry)
///     .base_path("/api")
///     .build()
///     .unwrap();
///
/// let response = dispatcher.dispatch(&Method::GET, "/api/tasks", &RequestContext::new(), None);
/// assert_eq!(response.status, StatusCode::OK);
///
/// let response = dispatcher.dispatch(&Method::PUT, "/api/tasks/1", &RequestContext::new(), None);
/// assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
/// ```
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    registry: Arc<ResourceRegistry>,
    controllers: ControllerRegistry,
    error_mappers: ErrorMapperRegistry,
    base_path: String,
    max_ids_per_request: usize,
}

impl RequestDispatcher {
    /// Starts building a dispatcher over the given registry.
    #[must_use]
    pub fn builder(registry: Arc<ResourceRegistry>) -> RequestDispatcherBuilder {
        RequestDispatcherBuilder::new(registry)
    }

    /// Returns the resource registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Returns the base path, without a trailing slash.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the controller registry.
    #[must_use]
    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Serves a request, mapping every failure to an error document.
    #[instrument(
        skip_all,
        fields(method = %method, path = raw_path, request_id = %context.request_id())
    )]
    pub fn dispatch(
        &self,
        method: &Method,
        raw_path: &str,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> Response {
        let (controller, result) = self.route_and_handle(method, raw_path, context, body);

        let response = match result {
            Ok(response) => {
                debug!(controller, status = response.status.as_u16(), "request served");
                response
            }
            Err(err) => {
                if err.category().is_client_error() {
                    debug!(controller, error = %err, kind = err.category().label(), "request rejected");
                } else {
                    error!(controller, error = %err, kind = err.category().label(), "request failed");
                }
                Response::from(self.error_mappers.to_response(&err))
            }
        };

        record_request(controller, response.status.as_u16(), context.elapsed());
        response
    }

    /// Serves a request, returning failures unmapped.
    pub fn try_dispatch(
        &self,
        method: &Method,
        raw_path: &str,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        self.route_and_handle(method, raw_path, context, body).1
    }

    /// Parses the path against the registry after stripping the base path.
    pub fn parse_path(&self, raw_path: &str) -> HeronResult<JsonPath> {
        let relative = self.strip_base(raw_path)?;
        let path = PathBuilder::new(&*self.registry).build(relative)?;

        if path.ids().len() > self.max_ids_per_request {
            return Err(HeronError::bad_request(format!(
                "{} ids requested, at most {} allowed",
                path.ids().len(),
                self.max_ids_per_request
            )));
        }
        Ok(path)
    }

    fn route_and_handle(
        &self,
        method: &Method,
        raw_path: &str,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> (&'static str, HeronResult<Response>) {
        let path = match self.parse_path(raw_path) {
            Ok(path) => path,
            Err(err) => return (UNROUTED, Err(err)),
        };
        let controller = match self.controllers.find(&path, method) {
            Ok(controller) => controller,
            Err(err) => return (UNROUTED, Err(err)),
        };

        debug!(controller = controller.name(), path = %path, "dispatching");
        (controller.name(), controller.handle(&path, context, body))
    }

    fn strip_base<'p>(&self, raw_path: &'p str) -> HeronResult<&'p str> {
        if self.base_path.is_empty() {
            return Ok(raw_path);
        }
        match raw_path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Ok(rest),
            _ => {
                warn!(path = raw_path, base_path = %self.base_path, "path outside base path");
                Err(HeronError::malformed_path(
                    raw_path,
                    format!("path is outside the base path {}", self.base_path),
                ))
            }
        }
    }
}

/// Builder for [`RequestDispatcher`].
#[derive(Debug)]
pub struct RequestDispatcherBuilder {
    registry: Arc<ResourceRegistry>,
    controllers: Option<ControllerRegistry>,
    error_mappers: ErrorMapperRegistry,
    expose_internal_errors: bool,
    base_path: String,
    max_ids_per_request: usize,
}

impl RequestDispatcherBuilder {
    fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self {
            registry,
            controllers: None,
            error_mappers: ErrorMapperRegistry::new(),
            expose_internal_errors: false,
            base_path: String::new(),
            max_ids_per_request: DEFAULT_MAX_IDS_PER_REQUEST,
        }
    }

    /// Sets the prefix every request path must carry. `/` means none.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    /// Caps the number of ids in a single resource path.
    #[must_use]
    pub fn max_ids_per_request(mut self, max: usize) -> Self {
        self.max_ids_per_request = max;
        self
    }

    /// Includes internal error messages in 5xx documents.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Replaces the error mappers.
    #[must_use]
    pub fn error_mappers(mut self, mappers: ErrorMapperRegistry) -> Self {
        self.error_mappers = mappers;
        self
    }

    /// Replaces the standard controllers.
    #[must_use]
    pub fn controllers(mut self, controllers: ControllerRegistry) -> Self {
        self.controllers = Some(controllers);
        self
    }

    /// Builds the dispatcher.
    ///
    /// Fails with [`HeronError::AmbiguousController`] if two controllers
    /// accept the same path shape and verb.
    pub fn build(self) -> HeronResult<RequestDispatcher> {
        let controllers = self
            .controllers
            .unwrap_or_else(|| ControllerRegistry::new(&self.registry));
        controllers.verify_disjoint()?;

        if self.max_ids_per_request == 0 {
            return Err(HeronError::bad_request(
                "max_ids_per_request must be greater than zero",
            ));
        }

        debug!(
            controllers = controllers.len(),
            base_path = %self.base_path,
            "request dispatcher ready"
        );

        Ok(RequestDispatcher {
            registry: self.registry,
            controllers,
            error_mappers: self
                .error_mappers
                .expose_internal_errors(self.expose_internal_errors),
            base_path: self.base_path,
            max_ids_per_request: self.max_ids_per_request,
        })
    }
}
