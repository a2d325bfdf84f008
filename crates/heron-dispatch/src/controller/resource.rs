use super::{
    apply_relationship_updates, check_body_type, relationship_updates, require_body, Controller,
};
use crate::response::{PrimaryData, Response};
use heron_core::{
    Capability, HeronError, HeronResult, Method, RequestBody, RequestContext, Resource,
};
use heron_path::JsonPath;
use heron_repository::ResourceRegistry;
use std::sync::Arc;
use tracing::debug;

/// `GET /tasks`, `GET /tasks/1`, `GET /tasks/1,2`.
///
/// Several ids are read with `find_all`, the ids travelling in the request
/// parameters.
#[derive(Debug, Clone)]
pub struct ResourceGet {
    registry: Arc<ResourceRegistry>,
}

impl ResourceGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for ResourceGet {
    fn name(&self) -> &'static str {
        "ResourceGet"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        matches!(path, JsonPath::ResourcePath { .. }) && method == Method::GET
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let adapter = self.registry.resource_adapter(path.resource_type())?;

        match path.ids() {
            [] => Ok(Response::ok(PrimaryData::Resources(adapter.find_all(context)?))),
            [id] => Ok(Response::ok(PrimaryData::Resource(adapter.find_one(id, context)?))),
            ids => {
                for id in ids {
                    adapter.parse_id(id)?;
                }
                let params = context.params().clone().with_ids(ids.iter().cloned());
                let context = context.clone().with_params(params);
                Ok(Response::ok(PrimaryData::Resources(adapter.find_all(&context)?)))
            }
        }
    }
}

/// `POST /tasks`: creates a resource, then applies the relationships in its
/// body.
#[derive(Debug, Clone)]
pub struct ResourcePost {
    registry: Arc<ResourceRegistry>,
}

impl ResourcePost {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for ResourcePost {
    fn name(&self) -> &'static str {
        "ResourcePost"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        matches!(path, JsonPath::ResourcePath { ids, .. } if ids.is_empty()) && method == Method::POST
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let data = require_body(body)?.single()?;
        check_body_type(path, &data.resource_type)?;

        let resource_type = path.resource_type();
        let adapter = self.registry.resource_adapter(resource_type)?;
        let updates = relationship_updates(&self.registry, resource_type, &data.relationships)?;

        let mut resource = Resource::new(resource_type);
        resource.attributes = data.attributes.clone();
        if let Some(id) = &data.id {
            resource.id = Some(adapter.parse_id(id)?);
        }

        let saved = adapter.save(resource, context)?;
        let id = saved.id.as_ref().ok_or_else(|| {
            HeronError::invocation_fault(
                Capability::Save,
                adapter.repository_name(),
                "saved resource has no id",
            )
        })?;
        debug!(resource_type = %resource_type, id = %id, "created resource");

        apply_relationship_updates(&id.to_string(), updates, context)?;

        Ok(Response::created(saved))
    }
}

/// `PATCH /tasks/1`: merges attributes into the stored resource, then
/// applies the relationships in the body.
#[derive(Debug, Clone)]
pub struct ResourcePatch {
    registry: Arc<ResourceRegistry>,
}

impl ResourcePatch {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for ResourcePatch {
    fn name(&self) -> &'static str {
        "ResourcePatch"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        matches!(path, JsonPath::ResourcePath { ids, .. } if ids.len() == 1)
            && method == Method::PATCH
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let data = require_body(body)?.single()?;
        check_body_type(path, &data.resource_type)?;

        let resource_type = path.resource_type();
        let id = path
            .single_id()
            .ok_or_else(|| HeronError::malformed_path(path.to_string(), "expected one id"))?;
        if data.id.as_deref().is_some_and(|body_id| body_id != id) {
            return Err(HeronError::bad_request(format!(
                "body id does not match path id {id}"
            )));
        }

        let adapter = self.registry.resource_adapter(resource_type)?;
        let updates = relationship_updates(&self.registry, resource_type, &data.relationships)?;

        let mut resource = adapter.find_one(id, context)?;
        resource.merge_attributes(&data.attributes);
        let saved = adapter.save(resource, context)?;

        apply_relationship_updates(id, updates, context)?;

        Ok(Response::ok(PrimaryData::Resource(saved)))
    }
}

/// `DELETE /tasks/1` and `DELETE /tasks/1,2`.
#[derive(Debug, Clone)]
pub struct ResourceDelete {
    registry: Arc<ResourceRegistry>,
}

impl ResourceDelete {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for ResourceDelete {
    fn name(&self) -> &'static str {
        "ResourceDelete"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        matches!(path, JsonPath::ResourcePath { ids, .. } if !ids.is_empty())
            && method == Method::DELETE
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let adapter = self.registry.resource_adapter(path.resource_type())?;

        // Reject the whole request before deleting anything.
        for id in path.ids() {
            adapter.parse_id(id)?;
        }
        for id in path.ids() {
            adapter.delete(id, context)?;
        }

        Ok(Response::no_content())
    }
}
