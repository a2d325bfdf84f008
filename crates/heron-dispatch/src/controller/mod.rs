//! Controllers.
//!
//! Each controller serves one combination of path kind and verb:
//!
//! | Controller | Path | Verb |
//! |---|---|---|
//! | [`ResourceGet`] | `/tasks`, `/tasks/1`, `/tasks/1,2` | GET |
//! | [`ResourcePost`] | `/tasks` | POST |
//! | [`ResourcePatch`] | `/tasks/1` | PATCH |
//! | [`ResourceDelete`] | `/tasks/1`, `/tasks/1,2` | DELETE |
//! | [`FieldResourceGet`] | `/tasks/1/project` | GET |
//! | [`RelationshipsResourceGet`] | `/tasks/1/relationships/project`, `/tasks/1/links/project` | GET |
//! | [`RelationshipsResourcePost`] | `/tasks/1/relationships/assignees` | POST |
//! | [`RelationshipsResourcePatch`] | `/tasks/1/relationships/assignees` | PATCH |
//! | [`RelationshipsResourceDelete`] | `/tasks/1/relationships/assignees` | DELETE |

mod field;
mod relationships;
mod resource;

pub use field::FieldResourceGet;
pub use relationships::{
    RelationshipsResourceDelete, RelationshipsResourceGet, RelationshipsResourcePatch,
    RelationshipsResourcePost,
};
pub use resource::{ResourceDelete, ResourceGet, ResourcePatch, ResourcePost};

use crate::response::Response;
use heron_core::{
    Capability, HeronError, HeronResult, Linkage, Method, RequestBody, RequestContext,
    ResourceIdentifier,
};
use heron_path::JsonPath;
use heron_repository::{RelationshipField, RelationshipRepositoryAdapter, ResourceRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Serves one kind of request.
///
/// The dispatcher offers every parsed path to the controllers in order;
/// exactly one must find itself applicable.
pub trait Controller: Send + Sync + 'static {
    /// Returns the controller name, used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Returns `true` if this controller serves the path with this verb.
    fn is_applicable(&self, path: &JsonPath, method: &Method) -> bool;

    /// Serves the request.
    fn handle(
        &self,
        path: &JsonPath,
        context: &RequestContext,
        body: Option<&RequestBody>,
    ) -> HeronResult<Response>;
}

/// Returns the nine standard controllers, in dispatch order.
#[must_use]
pub fn default_controllers(registry: &Arc<ResourceRegistry>) -> Vec<Arc<dyn Controller>> {
    vec![
        Arc::new(ResourceGet::new(registry.clone())),
        Arc::new(ResourcePost::new(registry.clone())),
        Arc::new(ResourcePatch::new(registry.clone())),
        Arc::new(ResourceDelete::new(registry.clone())),
        Arc::new(FieldResourceGet::new(registry.clone())),
        Arc::new(RelationshipsResourceGet::new(registry.clone())),
        Arc::new(RelationshipsResourcePost::new(registry.clone())),
        Arc::new(RelationshipsResourcePatch::new(registry.clone())),
        Arc::new(RelationshipsResourceDelete::new(registry.clone())),
    ]
}

/// The relationship addressed by a field, relationships or links path.
struct RelationshipTarget<'p> {
    source_type: &'p str,
    source_id: &'p str,
    field: RelationshipField,
    adapter: RelationshipRepositoryAdapter,
}

impl<'p> RelationshipTarget<'p> {
    fn resolve(registry: &ResourceRegistry, path: &'p JsonPath) -> HeronResult<Self> {
        let (Some(source_id), Some(name)) = (path.single_id(), path.element_name()) else {
            return Err(HeronError::malformed_path(
                path.to_string(),
                "expected a single source id and a relationship name",
            ));
        };
        let field = registry.resolve_relationship(path.resource_type(), name)?;
        let adapter = registry.relationship_adapter(path.resource_type(), name)?;
        Ok(Self {
            source_type: path.resource_type(),
            source_id,
            field,
            adapter,
        })
    }

    /// Loads the source resource; writes never touch a missing source.
    fn require_source(
        &self,
        registry: &ResourceRegistry,
        context: &RequestContext,
    ) -> HeronResult<()> {
        registry
            .resource_adapter(self.source_type)?
            .find_one(self.source_id, context)
            .map(|_| ())
    }

    /// Checks linkage types and returns the ids.
    fn target_ids<'b>(
        &self,
        identifiers: impl IntoIterator<Item = &'b ResourceIdentifier>,
    ) -> HeronResult<Vec<String>> {
        identifiers
            .into_iter()
            .map(|identifier| check_linkage_type(&self.field, identifier).map(|()| identifier.id.clone()))
            .collect()
    }
}

fn require_body(body: Option<&RequestBody>) -> HeronResult<&RequestBody> {
    body.ok_or_else(|| HeronError::bad_request("request document is required"))
}

fn check_linkage_type(field: &RelationshipField, identifier: &ResourceIdentifier) -> HeronResult<()> {
    if identifier.resource_type == field.target_type() {
        Ok(())
    } else {
        Err(HeronError::bad_request(format!(
            "relationship {} expects type {}, got {}",
            field.name(),
            field.target_type(),
            identifier.resource_type
        )))
    }
}

/// A relationship change carried in a resource body, checked and bound to
/// its repository.
enum RelationshipUpdate {
    One(RelationshipRepositoryAdapter, Option<String>),
    Many(RelationshipRepositoryAdapter, Vec<String>),
}

/// Validates the relationships member of a resource body before anything is
/// written: names, cardinality, linkage types, target ids and the
/// repository capability that will apply each change.
fn relationship_updates(
    registry: &ResourceRegistry,
    resource_type: &str,
    relationships: &BTreeMap<String, Linkage>,
) -> HeronResult<Vec<RelationshipUpdate>> {
    relationships
        .iter()
        .map(|(name, linkage)| {
            let field = registry
                .resolve_relationship(resource_type, name)
                .map_err(|err| match err {
                    HeronError::UnknownRelationship { .. } => HeronError::bad_request(format!(
                        "resource type {resource_type} has no relationship {name}"
                    )),
                    other => other,
                })?;

            let checked_id = |identifier: &ResourceIdentifier,
                              adapter: &RelationshipRepositoryAdapter| {
                check_linkage_type(&field, identifier)?;
                adapter.parse_target_id(&identifier.id)?;
                Ok::<_, HeronError>(identifier.id.clone())
            };

            match (field.is_to_many(), linkage) {
                (false, Linkage::ToOne(target)) => {
                    let adapter = registry.relationship_adapter(resource_type, name)?;
                    let target = target
                        .as_ref()
                        .map(|identifier| checked_id(identifier, &adapter))
                        .transpose()?;
                    adapter.require(Capability::SetRelation)?;
                    Ok(RelationshipUpdate::One(adapter, target))
                }
                (true, Linkage::ToMany(targets)) => {
                    let adapter = registry.relationship_adapter(resource_type, name)?;
                    let ids = targets
                        .iter()
                        .map(|identifier| checked_id(identifier, &adapter))
                        .collect::<HeronResult<_>>()?;
                    adapter.require(Capability::SetRelations)?;
                    Ok(RelationshipUpdate::Many(adapter, ids))
                }
                (false, Linkage::ToMany(_)) => Err(HeronError::bad_request(format!(
                    "to-one relationship {name} expects a single identifier or null"
                ))),
                (true, Linkage::ToOne(_)) => Err(HeronError::bad_request(format!(
                    "to-many relationship {name} expects an array of identifiers"
                ))),
            }
        })
        .collect()
}

fn apply_relationship_updates(
    source_id: &str,
    updates: Vec<RelationshipUpdate>,
    context: &RequestContext,
) -> HeronResult<()> {
    for update in updates {
        match update {
            RelationshipUpdate::One(adapter, target) => {
                adapter.set_relation(source_id, target.as_deref(), context)?;
            }
            RelationshipUpdate::Many(adapter, targets) => {
                adapter.set_relations(source_id, &targets, context)?;
            }
        }
    }
    Ok(())
}

fn check_body_type(path: &JsonPath, body_type: &str) -> HeronResult<()> {
    if body_type == path.resource_type() {
        Ok(())
    } else {
        Err(HeronError::bad_request(format!(
            "body type {body_type} does not match path type {}",
            path.resource_type()
        )))
    }
}
