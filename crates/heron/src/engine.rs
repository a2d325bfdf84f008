//! The assembled engine.

use crate::error::EngineResult;
use heron_config::HeronConfig;
use heron_core::{
    ErrorMapper, ErrorMapperRegistry, ErrorResponse, HeronResult, Method, RequestBody,
    RequestContext,
};
use heron_dispatch::{Controller, ControllerRegistry, RequestDispatcher, Response};
use heron_repository::{
    ParameterProvider, ParameterProviders, ResourceDefinitionBuilder, ResourceRegistry,
};
use heron_telemetry::{init_telemetry, Telemetry, TelemetryConfig};
use std::fmt;
use std::sync::Arc;
use tracing::info;

type ControllerFactory = Box<dyn FnOnce(&Arc<ResourceRegistry>) -> Arc<dyn Controller>>;

/// A configured engine: registry, dispatcher and telemetry handles.
///
/// # Example
///
/// ```rust
/// use heron::prelude::*;
/// use heron::fixtures::Fixtures;
///
/// let fixtures = Fixtures::new();
/// let engine = Engine::builder()
///     .resources(fixtures.definitions())
///     .build()
///     .unwrap();
///
/// let body = RequestBody::one(DataBody::new("tasks").with_attribute("name", "x"));
/// let ctx = RequestContext::new();
/// let created = engine.dispatch(&Method::POST, "/tasks", &ctx, Some(&body));
/// assert_eq!(created.status, StatusCode::CREATED);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: HeronConfig,
    registry: Arc<ResourceRegistry>,
    dispatcher: RequestDispatcher,
    telemetry: Option<Telemetry>,
}

impl Engine {
    /// Starts building an engine with default configuration.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Serves a request. Failures come back as error documents.
    pub fn dispatch(
        &self,
        method: &Method,
        path: &str,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> Response {
        self.dispatcher.dispatch(method, path, context, body)
    }

    /// Serves a request, returning failures unmapped.
    pub fn try_dispatch(
        &self,
        method: &Method,
        path: &str,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        self.dispatcher.try_dispatch(method, path, context, body)
    }

    /// Returns the configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &HeronConfig {
        &self.config
    }

    /// Returns the resource registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Returns the telemetry handles, if telemetry was installed.
    #[must_use]
    pub fn telemetry(&self) -> Option<&Telemetry> {
        self.telemetry.as_ref()
    }

    /// Renders engine metrics in Prometheus text format.
    #[must_use]
    pub fn render_metrics(&self) -> Option<String> {
        self.telemetry
            .as_ref()
            .and_then(Telemetry::metrics)
            .map(|metrics| metrics.render())
    }
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    config: HeronConfig,
    definitions: Vec<ResourceDefinitionBuilder>,
    providers: ParameterProviders,
    error_mappers: ErrorMapperRegistry,
    controllers: Vec<ControllerFactory>,
    install_telemetry: bool,
}

impl EngineBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HeronConfig::default(),
            definitions: Vec::new(),
            providers: ParameterProviders::new(),
            error_mappers: ErrorMapperRegistry::new(),
            controllers: Vec::new(),
            install_telemetry: false,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn config(mut self, config: HeronConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a resource type.
    #[must_use]
    pub fn resource(mut self, definition: ResourceDefinitionBuilder) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Registers several resource types.
    #[must_use]
    pub fn resources(mut self, definitions: impl IntoIterator<Item = ResourceDefinitionBuilder>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Appends a provider for extension parameters.
    #[must_use]
    pub fn provider(mut self, provider: impl ParameterProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Appends an error mapper, consulted before the built-in mapping.
    #[must_use]
    pub fn error_mapper(mut self, mapper: impl ErrorMapper) -> Self {
        self.error_mappers.register(mapper);
        self
    }

    /// Maps handler failures caused by an `E`.
    #[must_use]
    pub fn on_handler_error<E, F>(mut self, func: F) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        F: Fn(&E) -> ErrorResponse + Send + Sync + 'static,
    {
        self.error_mappers.on_handler_error(func);
        self
    }

    /// Adds a controller after the standard ones. The factory receives the
    /// registry the engine builds.
    #[must_use]
    pub fn controller<F>(mut self, factory: F) -> Self
    where
        F: FnOnce(&Arc<ResourceRegistry>) -> Arc<dyn Controller> + 'static,
    {
        self.controllers.push(Box::new(factory));
        self
    }

    /// Installs logging and metrics from the telemetry configuration when
    /// the engine is built.
    #[must_use]
    pub fn with_telemetry(mut self) -> Self {
        self.install_telemetry = true;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, telemetry cannot be
    /// installed, start-up verification finds a declaration defect, or two
    /// controllers overlap.
    pub fn build(self) -> EngineResult<Engine> {
        let Self {
            config,
            definitions,
            providers,
            error_mappers,
            controllers: extra_controllers,
            install_telemetry,
        } = self;

        config.validate()?;

        let telemetry = if install_telemetry {
            Some(init_telemetry(&TelemetryConfig::from(&config.telemetry))?)
        } else {
            None
        };

        let registry = Arc::new(ResourceRegistry::with_providers(providers));
        for definition in definitions {
            registry.register(definition);
        }
        if config.engine.verify_on_startup {
            registry.verify()?;
        }

        let mut controllers = ControllerRegistry::new(&registry);
        for factory in extra_controllers {
            controllers.push(factory(&registry));
        }

        let dispatcher = RequestDispatcher::builder(registry.clone())
            .base_path(config.engine.base_path.as_str())
            .max_ids_per_request(config.engine.max_ids_per_request)
            .expose_internal_errors(config.engine.expose_internal_errors)
            .error_mappers(error_mappers)
            .controllers(controllers)
            .build()?;

        info!(
            resource_types = registry.len(),
            base_path = %config.engine.base_path,
            "engine ready"
        );

        Ok(Engine {
            config,
            registry,
            dispatcher,
            telemetry,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("config", &self.config)
            .field("definitions", &self.definitions.len())
            .field("providers", &self.providers)
            .field("error_mappers", &self.error_mappers)
            .field("controllers", &self.controllers.len())
            .field("install_telemetry", &self.install_telemetry)
            .finish()
    }
}
