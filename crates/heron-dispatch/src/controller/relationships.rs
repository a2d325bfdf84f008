//! Relationship linkage controllers.
//!
//! These read and write identifiers only. Writes answer `204 No Content`.

use super::{require_body, Controller, RelationshipTarget};
use crate::response::{PrimaryData, Response};
use heron_core::{
    Capability, HeronError, HeronResult, Method, RequestBody, RequestContext, Resource,
    ResourceIdentifier,
};
use heron_path::JsonPath;
use heron_repository::ResourceRegistry;
use std::sync::Arc;
use tracing::debug;

fn is_relationships_path(path: &JsonPath) -> bool {
    matches!(path, JsonPath::RelationshipsPath { .. })
}

/// `GET /tasks/1/relationships/project` and `GET /tasks/1/links/project`.
#[derive(Debug, Clone)]
pub struct RelationshipsResourceGet {
    registry: Arc<ResourceRegistry>,
}

impl RelationshipsResourceGet {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for RelationshipsResourceGet {
    fn name(&self) -> &'static str {
        "RelationshipsResourceGet"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        matches!(
            path,
            JsonPath::RelationshipsPath { .. } | JsonPath::LinksPath { .. }
        ) && method == Method::GET
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        _body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let target = RelationshipTarget::resolve(&self.registry, path)?;
        let repository = target.adapter.repository_name().to_string();

        let data = if target.field.is_to_many() {
            let targets = target.adapter.find_many_targets(target.source_id, context)?;
            let identifiers = targets
                .iter()
                .map(|resource| identifier_of(resource, Capability::FindManyTargets, &repository))
                .collect::<HeronResult<_>>()?;
            PrimaryData::Identifiers(identifiers)
        } else {
            match target.adapter.find_one_target(target.source_id, context)? {
                Some(resource) => PrimaryData::Identifier(identifier_of(
                    &resource,
                    Capability::FindOneTarget,
                    &repository,
                )?),
                None => PrimaryData::Null,
            }
        };
        Ok(Response::ok(data))
    }
}

fn identifier_of(
    resource: &Resource,
    capability: Capability,
    repository: &str,
) -> HeronResult<ResourceIdentifier> {
    resource.identifier().ok_or_else(|| {
        HeronError::invocation_fault(capability, repository, "returned a target without an id")
    })
}

/// `POST /tasks/1/relationships/assignees`: adds targets to a to-many
/// relation, or sets a to-one relation.
#[derive(Debug, Clone)]
pub struct RelationshipsResourcePost {
    registry: Arc<ResourceRegistry>,
}

impl RelationshipsResourcePost {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for RelationshipsResourcePost {
    fn name(&self) -> &'static str {
        "RelationshipsResourcePost"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        is_relationships_path(path) && method == Method::POST
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let body = require_body(body)?;
        let target = RelationshipTarget::resolve(&self.registry, path)?;

        target.require_source(&self.registry, context)?;

        if target.field.is_to_many() {
            let ids = target.target_ids(&body.to_many_linkage()?)?;
            target.adapter.add_relations(target.source_id, &ids, context)?;
        } else {
            let id = target.target_ids(&body.to_one_linkage()?)?.pop();
            target.adapter.set_relation(target.source_id, id.as_deref(), context)?;
        }
        debug!(path = %path, "added relationship targets");

        Ok(Response::no_content())
    }
}

/// `PATCH /tasks/1/relationships/assignees`: replaces the relation.
#[derive(Debug, Clone)]
pub struct RelationshipsResourcePatch {
    registry: Arc<ResourceRegistry>,
}

impl RelationshipsResourcePatch {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for RelationshipsResourcePatch {
    fn name(&self) -> &'static str {
        "RelationshipsResourcePatch"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        is_relationships_path(path) && method == Method::PATCH
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let body = require_body(body)?;
        let target = RelationshipTarget::resolve(&self.registry, path)?;
        target.require_source(&self.registry, context)?;

        if target.field.is_to_many() {
            let ids = target.target_ids(&body.to_many_linkage()?)?;
            target.adapter.set_relations(target.source_id, &ids, context)?;
        } else {
            let id = target.target_ids(&body.to_one_linkage()?)?.pop();
            target.adapter.set_relation(target.source_id, id.as_deref(), context)?;
        }

        Ok(Response::no_content())
    }
}

/// `DELETE /tasks/1/relationships/assignees`: removes the listed targets
/// from a to-many relation, or clears a to-one relation.
#[derive(Debug, Clone)]
pub struct RelationshipsResourceDelete {
    registry: Arc<ResourceRegistry>,
}

impl RelationshipsResourceDelete {
    /// Creates the controller.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }
}

impl Controller for RelationshipsResourceDelete {
    fn name(&self) -> &'static str {
        "RelationshipsResourceDelete"
    }

    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool {
        is_relationships_path(path) && method == Method::DELETE
    }

    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response> {
        let target = RelationshipTarget::resolve(&self.registry, path)?;
        target.require_source(&self.registry, context)?;

        if target.field.is_to_many() {
            let ids = target.target_ids(&require_body(body)?.to_many_linkage()?)?;
            target.adapter.remove_relations(target.source_id, &ids, context)?;
        } else {
            // A to-one relation is cleared whatever the body says.
            target.adapter.set_relation(target.source_id, None, context)?;
        }

        Ok(Response::no_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::{DataBody, ResourceId, StatusCode};
    use heron_repository::fixtures::Fixtures;

    struct Setup {
        registry: Arc<ResourceRegistry>,
        fixtures: Fixtures,
        ctx: RequestContext,
    }

    fn setup() -> Setup {
        let registry = Arc::new(ResourceRegistry::new());
        let fixtures = Fixtures::new();
        fixtures.register(&registry);
        let ctx = RequestContext::new();

        fixtures
            .tasks
            .save(Resource::new("tasks").with_attribute("name", "t"))
            .unwrap();
        fixtures
            .projects
            .save(Resource::new("projects").with_attribute("name", "p"))
            .unwrap();
        for email in ["a@example.com", "b@example.com"] {
            fixtures
                .users
                .save(Resource::new("users").with_attribute("email", email))
                .unwrap();
        }

        Setup {
            registry,
            fixtures,
            ctx,
        }
    }

    fn users(ids: &[&str]) -> RequestBody {
        RequestBody::many(ids.iter().map(|id| DataBody::identifier("users", *id)).collect())
    }

    fn linked_assignees(setup: &Setup) -> Vec<ResourceIdentifier> {
        let response = RelationshipsResourceGet::new(setup.registry.clone())
            .handle(
                &JsonPath::relationships("tasks", "1", "assignees"),
                &setup.ctx,
                None,
            )
            .unwrap();
        response
            .data()
            .and_then(PrimaryData::as_identifiers)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_add_then_remove_leaves_nothing() {
        let setup = setup();
        let path = JsonPath::relationships("tasks", "1", "assignees");
        let body = users(&["users-1", "users-2"]);

        let response = RelationshipsResourcePost::new(setup.registry.clone())
            .handle(&path, &setup.ctx, Some(&body))
            .unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(linked_assignees(&setup).len(), 2);

        RelationshipsResourceDelete::new(setup.registry.clone())
            .handle(&path, &setup.ctx, Some(&body))
            .unwrap();
        assert!(linked_assignees(&setup).is_empty());
    }

    #[test]
    fn test_patch_replaces_to_many() {
        let setup = setup();
        let path = JsonPath::relationships("tasks", "1", "assignees");
        let patch = RelationshipsResourcePatch::new(setup.registry.clone());

        patch
            .handle(&path, &setup.ctx, Some(&users(&["users-1", "users-2"])))
            .unwrap();
        patch
            .handle(&path, &setup.ctx, Some(&users(&["users-2"])))
            .unwrap();

        assert_eq!(
            linked_assignees(&setup),
            vec![ResourceIdentifier::new("users", "users-2")]
        );
    }

    #[test]
    fn test_to_one_set_and_clear() {
        let setup = setup();
        let path = JsonPath::relationships("tasks", "1", "project");
        let get = RelationshipsResourceGet::new(setup.registry.clone());

        RelationshipsResourcePatch::new(setup.registry.clone())
            .handle(
                &path,
                &setup.ctx,
                Some(&RequestBody::one(DataBody::identifier("projects", "1"))),
            )
            .unwrap();
        let linked = get.handle(&path, &setup.ctx, None).unwrap();
        assert_eq!(
            linked.data().and_then(PrimaryData::as_identifier),
            Some(&ResourceIdentifier::new("projects", "1"))
        );

        RelationshipsResourcePatch::new(setup.registry.clone())
            .handle(&path, &setup.ctx, Some(&RequestBody::null()))
            .unwrap();
        assert!(get.handle(&path, &setup.ctx, None).unwrap().data().unwrap().is_null());
    }

    #[test]
    fn test_delete_unset_to_one() {
        let setup = setup();
        let response = RelationshipsResourceDelete::new(setup.registry.clone())
            .handle(
                &JsonPath::relationships("tasks", "1", "project"),
                &setup.ctx,
                None,
            )
            .unwrap();

        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert!(setup
            .fixtures
            .task_project
            .find_one_target(&ResourceId::Integer(1), "project")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_post_requires_existing_source() {
        let setup = setup();
        let err = RelationshipsResourcePost::new(setup.registry.clone())
            .handle(
                &JsonPath::relationships("tasks", "9", "assignees"),
                &setup.ctx,
                Some(&users(&["users-1"])),
            )
            .unwrap_err();
        assert!(matches!(err, HeronError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_wrong_linkage_type_rejected() {
        let setup = setup();
        let err = RelationshipsResourcePost::new(setup.registry.clone())
            .handle(
                &JsonPath::relationships("tasks", "1", "assignees"),
                &setup.ctx,
                Some(&RequestBody::many(vec![DataBody::identifier("projects", "1")])),
            )
            .unwrap_err();
        assert!(matches!(err, HeronError::BadRequest { .. }));
        assert!(linked_assignees(&setup).is_empty());
    }

    #[test]
    fn test_links_path_reads_linkage() {
        let setup = setup();
        let controller = RelationshipsResourceGet::new(setup.registry.clone());
        assert!(controller.is_applicable(&JsonPath::links("tasks", "1", "assignees"), &Method::GET));
        assert!(!controller.is_applicable(&JsonPath::links("tasks", "1", "assignees"), &Method::POST));

        let response = controller
            .handle(&JsonPath::links("tasks", "1", "project"), &setup.ctx, None)
            .unwrap();
        assert!(response.data().unwrap().is_null());
    }

    #[test]
    fn test_writes_require_existing_source() {
        let setup = setup();
        let to_one = JsonPath::relationships("tasks", "999", "project");
        let to_many = JsonPath::relationships("tasks", "999", "assignees");
        let project = RequestBody::one(DataBody::identifier("projects", "1"));

        let err = RelationshipsResourcePatch::new(setup.registry.clone())
            .handle(&to_one, &setup.ctx, Some(&project))
            .unwrap_err();
        assert!(matches!(err, HeronError::ResourceNotFound { .. }));
        assert!(setup
            .fixtures
            .task_project
            .find_one_target(&ResourceId::Integer(999), "project")
            .unwrap()
            .is_none());

        let delete = RelationshipsResourceDelete::new(setup.registry.clone());
        let err = delete.handle(&to_one, &setup.ctx, None).unwrap_err();
        assert!(matches!(err, HeronError::ResourceNotFound { .. }));
        let err = delete
            .handle(&to_many, &setup.ctx, Some(&users(&["users-1"])))
            .unwrap_err();
        assert!(matches!(err, HeronError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_removing_absent_target_on_existing_source() {
        let setup = setup();
        let response = RelationshipsResourceDelete::new(setup.registry.clone())
            .handle(
                &JsonPath::relationships("tasks", "1", "assignees"),
                &setup.ctx,
                Some(&users(&["users-2"])),
            )
            .unwrap();
        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }
}
