use super::{Controller, RelationshipTarget};
use crate::response::{PrimaryData, Response};
use heron_core::{HeronResult, Method, RequestBody, RequestContext};
use heron_path::JsonPath;
use heron_repository::ResourceRegistry;
use std::sync::Arc;

/// `GET /tasks/1/project`: returns the related resources themselves.
#[derive(Debug, Clone)]
pub struct FieldResourceGet {
    registry: Arc<ResourceRegistry>,
}

impl FieldResourceGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for FieldResourceGet {
    fn name(&self) -> &'static str {
        "FieldResourceGet"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        matches!(path, JsonPath::FieldPath { .. }) && method == Method::GET
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let target = RelationshipTarget::resolve(&self.registry, path)?;

        let data = if target.field.is_to_many() {
            PrimaryData::Resources(target.adapter.find_many_targets(target.source_id, context)?)
        } else {
            PrimaryData::optional(target.adapter.find_one_target(target.source_id, context)?)
        };
        Ok(Response::ok(data))
    }
}
