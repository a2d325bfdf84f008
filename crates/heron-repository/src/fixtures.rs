//! In-memory repositories for development and testing.
//!
//! [`Fixtures`] wires a small task tracker:
//!
//! - `users` (string ids): `name`, `email`
//! - `projects` (integer ids): `name`; to-many `tasks` served by a dedicated
//!   relationship repository
//! - `tasks` (integer ids): `name`, `done`; to-one `project` served by a
//!   dedicated relationship repository, to-many `assignees` served by the
//!   task repository itself
//!
//! # Example
//!
//! ```
//! use heron_core::{RequestContext, Resource};
//! use heron_repository::fixtures::Fixtures;
//! use heron_repository::ResourceRegistry;
//!
//! let registry = ResourceRegistry::new();
//! Fixtures::new().register(&registry);
//!
//! let tasks = registry.resource_adapter("tasks").unwrap();
//! let ctx = RequestContext::new();
//! let saved = tasks
//!     .save(Resource::new("tasks").with_attribute("name", "x"), &ctx)
//!     .unwrap();
//! assert_eq!(saved.identifier().unwrap().id, "1");
//! ```

use crate::definition::{RelationshipField, ResourceDefinition, ResourceDefinitionBuilder};
use crate::method::{ParamSlot, Repository, RepositoryMethod, Returned};
use crate::registry::ResourceRegistry;
use heron_core::{
    Capability, FieldErrors, HeronError, HeronResult, IdType, RequestParams, Resource, ResourceId,
};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// A resource repository backed by an ordered map.
pub struct InMemoryRepository {
    name: String,
    resource_type: String,
    id_type: IdType,
    next_id: AtomicI64,
    rows: RwLock<IndexMap<ResourceId, Resource>>,
    required: Vec<String>,
    relations: Option<Arc<InMemoryRelationshipRepository>>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new(resource_type: impl Into<String>, id_type: IdType) -> Self {
        let resource_type = resource_type.into();
        Self {
            name: resource_type.clone(),
            resource_type,
            id_type,
            next_id: AtomicI64::new(1),
            rows: RwLock::new(IndexMap::new()),
            required: Vec::new(),
            relations: None,
        }
    }

    /// Rejects saves where the attribute is missing, null or blank.
    #[must_use]
    pub fn require(mut self, attribute: impl Into<String>) -> Self {
        self.required.push(attribute.into());
        self
    }

    /// Serves relationship capabilities from the given relation store as
    /// well, so the repository doubles as its own relationship repository.
    #[must_use]
    pub fn with_relations(mut self, relations: Arc<InMemoryRelationshipRepository>) -> Self {
        self.relations = Some(relations);
        self
    }

    /// Returns a stored resource.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<Resource> {
        self.rows.read().get(id).cloned()
    }

    /// Returns the number of stored resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Loads a resource or fails with not found.
    pub fn find_one(&self, id: &ResourceId) -> HeronResult<Resource> {
        self.get(id)
            .ok_or_else(|| HeronError::not_found_resource(&self.resource_type, id.to_string()))
    }

    /// Loads every resource, or the ones named by the request's id list.
    pub fn find_all(&self, params: &RequestParams) -> HeronResult<Vec<Resource>> {
        let rows = self.rows.read();
        if params.ids().is_empty() {
            return Ok(rows.values().cloned().collect());
        }
        let ids = self
            .id_type
            .parse_all(params.ids().iter().map(String::as_str))?;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    /// Stores a resource, assigning an id when it has none.
    pub fn save(&self, mut resource: Resource) -> HeronResult<Resource> {
        self.validate(&resource)?;

        let id = match resource.id.take() {
            Some(id) => {
                if let Some(value) = id.as_i64() {
                    let next = value.checked_add(1).ok_or_else(|| {
                        HeronError::validation(format!(
                            "id {value} leaves no room for generated ids"
                        ))
                    })?;
                    self.next_id.fetch_max(next, Ordering::SeqCst);
                }
                id
            }
            None => self.next_id(),
        };
        resource.id = Some(id.clone());
        resource.resource_type.clone_from(&self.resource_type);

        self.rows.write().insert(id, resource.clone());
        Ok(resource)
    }

    /// Removes a resource. Removing an absent resource is a no-op.
    pub fn delete(&self, id: &ResourceId) {
        self.rows.write().shift_remove(id);
    }

    fn next_id(&self) -> ResourceId {
        let next = self.next_id.fetch_add(1, Ordering::SeqCst);
        match self.id_type {
            IdType::Integer => ResourceId::Integer(next),
            IdType::String => ResourceId::String(format!("{}-{next}", self.resource_type)),
            IdType::Uuid => ResourceId::Uuid(Uuid::new_v4()),
        }
    }

    fn validate(&self, resource: &Resource) -> HeronResult<()> {
        let mut errors = FieldErrors::new();
        for attribute in &self.required {
            match resource.attribute(attribute) {
                None | Some(Value::Null) => errors.add(attribute.as_str(), "is required"),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    errors.add(attribute.as_str(), "must not be blank");
                }
                Some(_) => {}
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(HeronError::validation_with_fields(
                format!("{} rejected", self.resource_type),
                errors,
            ))
        }
    }
}

impl Repository for InMemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
        let find_one = self.clone();
        let find_all = self.clone();
        let save = self.clone();
        let delete = self.clone();

        let mut methods = vec![
            RepositoryMethod::new(
                Capability::FindOne,
                [ParamSlot::Id, ParamSlot::RequestParams],
                move |args| find_one.find_one(args.id(0)?).map(Returned::Resource),
            ),
            RepositoryMethod::new(Capability::FindAll, [ParamSlot::RequestParams], move |args| {
                find_all.find_all(args.params(0)?).map(Returned::Resources)
            }),
            RepositoryMethod::new(Capability::Save, [ParamSlot::Entity], move |args| {
                save.save(args.into_entity(0)?).map(Returned::Resource)
            }),
            RepositoryMethod::new(Capability::Delete, [ParamSlot::Id], move |args| {
                delete.delete(args.id(0)?);
                Ok(Returned::Unit)
            }),
        ];

        if let Some(relations) = &self.relations {
            methods.extend(relations.clone().methods());
        }
        methods
    }
}

/// A relationship repository storing linkage in memory.
///
/// Targets are resolved against the repository registered for each field
/// with [`target`](Self::target).
pub struct InMemoryRelationshipRepository {
    name: String,
    to_one: Mutex<HashMap<(ResourceId, String), ResourceId>>,
    to_many: Mutex<HashMap<(ResourceId, String), Vec<ResourceId>>>,
    targets: IndexMap<String, Arc<InMemoryRepository>>,
}

impl InMemoryRelationshipRepository {
    /// Creates an empty relation store.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            to_one: Mutex::new(HashMap::new()),
            to_many: Mutex::new(HashMap::new()),
            targets: IndexMap::new(),
        }
    }

    /// Resolves targets of `field` against `repository`.
    #[must_use]
    pub fn target(mut self, field: impl Into<String>, repository: Arc<InMemoryRepository>) -> Self {
        self.targets.insert(field.into(), repository);
        self
    }

    /// Replaces or clears a to-one relation.
    pub fn set_relation(&self, source: &ResourceId, target: Option<&ResourceId>, field: &str) {
        let key = (source.clone(), field.to_string());
        let mut to_one = self.to_one.lock();
        match target {
            Some(target) => {
                to_one.insert(key, target.clone());
            }
            None => {
                to_one.remove(&key);
            }
        }
    }

    /// Replaces a to-many relation.
    pub fn set_relations(&self, source: &ResourceId, targets: &[ResourceId], field: &str) {
        self.to_many
            .lock()
            .insert((source.clone(), field.to_string()), targets.to_vec());
    }

    /// Appends targets not already present.
    pub fn add_relations(&self, source: &ResourceId, targets: &[ResourceId], field: &str) {
        let mut to_many = self.to_many.lock();
        let linked = to_many
            .entry((source.clone(), field.to_string()))
            .or_default();
        for target in targets {
            if !linked.contains(target) {
                linked.push(target.clone());
            }
        }
    }

    /// Removes targets; absent targets are ignored.
    pub fn remove_relations(&self, source: &ResourceId, targets: &[ResourceId], field: &str) {
        if let Some(linked) = self
            .to_many
            .lock()
            .get_mut(&(source.clone(), field.to_string()))
        {
            linked.retain(|id| !targets.contains(id));
        }
    }

    /// Resolves the target of a to-one relation.
    pub fn find_one_target(&self, source: &ResourceId, field: &str) -> HeronResult<Option<Resource>> {
        let targets = self.targets_of(field)?;
        let linked = self
            .to_one
            .lock()
            .get(&(source.clone(), field.to_string()))
            .cloned();
        Ok(linked.and_then(|id| targets.get(&id)))
    }

    /// Resolves the targets of a to-many relation, skipping deleted ones.
    pub fn find_many_targets(&self, source: &ResourceId, field: &str) -> HeronResult<Vec<Resource>> {
        let targets = self.targets_of(field)?;
        let linked = self
            .to_many
            .lock()
            .get(&(source.clone(), field.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(linked.iter().filter_map(|id| targets.get(id)).collect())
    }

    fn targets_of(&self, field: &str) -> HeronResult<&Arc<InMemoryRepository>> {
        self.targets.get(field).ok_or_else(|| {
            HeronError::handler(
                format!("{} has no target store for {field}", self.name),
                anyhow::anyhow!("unconfigured relationship field {field}"),
            )
        })
    }
}

impl Repository for InMemoryRelationshipRepository {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
        let many_prefix = ParamSlot::prefix(Capability::SetRelations);
        let set_one = self.clone();
        let set_many = self.clone();
        let add = self.clone();
        let remove = self.clone();
        let one_target = self.clone();
        let many_targets = self;

        vec![
            RepositoryMethod::new(
                Capability::SetRelation,
                ParamSlot::prefix(Capability::SetRelation),
                move |args| {
                    set_one.set_relation(args.id(0)?, args.target_id(1)?, args.field_name(2)?);
                    Ok(Returned::Unit)
                },
            ),
            RepositoryMethod::new(Capability::SetRelations, many_prefix, move |args| {
                set_many.set_relations(args.id(0)?, args.target_ids(1)?, args.field_name(2)?);
                Ok(Returned::Unit)
            }),
            RepositoryMethod::new(Capability::AddRelations, many_prefix, move |args| {
                add.add_relations(args.id(0)?, args.target_ids(1)?, args.field_name(2)?);
                Ok(Returned::Unit)
            }),
            RepositoryMethod::new(Capability::RemoveRelations, many_prefix, move |args| {
                remove.remove_relations(args.id(0)?, args.target_ids(1)?, args.field_name(2)?);
                Ok(Returned::Unit)
            }),
            RepositoryMethod::new(
                Capability::FindOneTarget,
                [ParamSlot::Id, ParamSlot::FieldName, ParamSlot::RequestParams],
                move |args| {
                    one_target
                        .find_one_target(args.id(0)?, args.field_name(1)?)
                        .map(Returned::OptionalResource)
                },
            ),
            RepositoryMethod::new(
                Capability::FindManyTargets,
                [ParamSlot::Id, ParamSlot::FieldName, ParamSlot::RequestParams],
                move |args| {
                    many_targets
                        .find_many_targets(args.id(0)?, args.field_name(1)?)
                        .map(Returned::Resources)
                },
            ),
        ]
    }
}

/// The sample task tracker.
pub struct Fixtures {
    /// `users` repository.
    pub users: Arc<InMemoryRepository>,
    /// `projects` repository.
    pub projects: Arc<InMemoryRepository>,
    /// `tasks` repository; also serves `tasks.assignees`.
    pub tasks: Arc<InMemoryRepository>,
    /// Relationship repository for `tasks.project`.
    pub task_project: Arc<InMemoryRelationshipRepository>,
    /// Relationship repository for `projects.tasks`.
    pub project_tasks: Arc<InMemoryRelationshipRepository>,
}

impl Fixtures {
    /// Creates empty repositories.
    #[must_use]
    pub fn new() -> Self {
        let users = Arc::new(InMemoryRepository::new("users", IdType::String).require("email"));
        let projects = Arc::new(InMemoryRepository::new("projects", IdType::Integer).require("name"));

        let assignees = Arc::new(
            InMemoryRelationshipRepository::new("tasks-assignees").target("assignees", users.clone()),
        );
        let tasks = Arc::new(
            InMemoryRepository::new("tasks", IdType::Integer)
                .require("name")
                .with_relations(assignees),
        );

        let task_project = Arc::new(
            InMemoryRelationshipRepository::new("tasks-to-project").target("project", projects.clone()),
        );
        let project_tasks = Arc::new(
            InMemoryRelationshipRepository::new("projects-to-tasks").target("tasks", tasks.clone()),
        );

        Self {
            users,
            projects,
            tasks,
            task_project,
            project_tasks,
        }
    }

    /// Returns the resource definitions, ready to register.
    #[must_use]
    pub fn definitions(&self) -> Vec<ResourceDefinitionBuilder> {
        vec![
            ResourceDefinition::builder("users")
                .id_type(IdType::String)
                .attribute("name")
                .attribute("email")
                .repository(self.users.clone()),
            ResourceDefinition::builder("projects")
                .attribute("name")
                .relationship(
                    RelationshipField::to_many("tasks", "tasks")
                        .with_repository(self.project_tasks.clone()),
                )
                .repository(self.projects.clone()),
            ResourceDefinition::builder("tasks")
                .attribute("name")
                .attribute("done")
                .relationship(
                    RelationshipField::to_one("project", "projects")
                        .with_repository(self.task_project.clone()),
                )
                .to_many("assignees", "users")
                .repository(self.tasks.clone()),
        ]
    }

    /// Registers every definition.
    pub fn register(&self, registry: &ResourceRegistry) {
        for definition in self.definitions() {
            registry.register(definition);
        }
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}
