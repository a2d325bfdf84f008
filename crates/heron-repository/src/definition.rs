//! Resource definitions.

use crate::adapter::ResourceRepositoryAdapter;
use crate::discovery::MethodTable;
use crate::method::Repository;
use crate::parameters::ParametersFactory;
use heron_core::IdType;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// How many targets a relationship holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Zero or one target.
    ToOne,
    /// An ordered list of targets.
    ToMany,
}

/// The field layout of a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityShape {
    id_field: String,
    id_type: IdType,
    attributes: Vec<String>,
}

impl EntityShape {
    /// Returns the identifier field name.
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Returns the identifier value type.
    #[must_use]
    pub const fn id_type(&self) -> IdType {
        self.id_type
    }

    /// Returns the attribute field names, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl Default for EntityShape {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            id_type: IdType::default(),
            attributes: Vec::new(),
        }
    }
}

/// A relationship declared on a resource type.
#[derive(Clone)]
pub struct RelationshipField {
    name: String,
    target_type: String,
    cardinality: Cardinality,
    repository: Option<Arc<MethodTable>>,
}

impl RelationshipField {
    /// Declares a to-one relationship.
    #[must_use]
    pub fn to_one(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::new(name, target_type, Cardinality::ToOne)
    }

    /// Declares a to-many relationship.
    #[must_use]
    pub fn to_many(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::new(name, target_type, Cardinality::ToMany)
    }

    fn new(name: impl Into<String>, target_type: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            cardinality,
            repository: None,
        }
    }

    /// Serves this relationship from a dedicated relationship repository
    /// instead of the owning resource's repository.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(Arc::new(MethodTable::new(repository)));
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target resource type.
    #[must_use]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Returns the cardinality.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Returns `true` for to-many relationships.
    #[must_use]
    pub fn is_to_many(&self) -> bool {
        self.cardinality == Cardinality::ToMany
    }

    /// Returns the dedicated relationship repository, if any.
    #[must_use]
    pub fn repository(&self) -> Option<&Arc<MethodTable>> {
        self.repository.as_ref()
    }
}

impl fmt::Debug for RelationshipField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipField")
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .field("cardinality", &self.cardinality)
            .field("repository", &self.repository.as_ref().map(|r| r.name()))
            .finish()
    }
}

/// A registered resource type.
#[derive(Debug)]
pub struct ResourceDefinition {
    resource_type: String,
    shape: EntityShape,
    relationships: IndexMap<String, RelationshipField>,
    methods: Arc<MethodTable>,
    adapter: ResourceRepositoryAdapter,
}

impl ResourceDefinition {
    /// Starts a definition for a resource type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use heron_core::IdType;
    /// use heron_repository::{ResourceDefinition, ResourceRegistry};
    ///
    /// let registry = ResourceRegistry::new();
    /// registry.register(
    ///     ResourceDefinition::builder("tasks")
    ///         .id_type(IdType::Integer)
    ///         .attribute("name")
    ///         .to_one("project", "projects"),
    /// );
    ///
    /// let tasks = registry.resolve("tasks").unwrap();
    /// assert_eq!(tasks.shape().attributes(), &["name".to_string()]);
    /// assert!(tasks.relationship("project").is_some());
    /// ```
    #[must_use]
    pub fn builder(resource_type: impl Into<String>) -> ResourceDefinitionBuilder {
        ResourceDefinitionBuilder::new(resource_type)
    }

    /// Returns the resource type name.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the entity shape.
    #[must_use]
    pub const fn shape(&self) -> &EntityShape {
        &self.shape
    }

    /// Returns the identifier value type.
    #[must_use]
    pub const fn id_type(&self) -> IdType {
        self.shape.id_type
    }

    /// Returns a relationship by name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipField> {
        self.relationships.get(name)
    }

    /// Returns every relationship, in declaration order.
    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipField> {
        self.relationships.values()
    }

    /// Returns the adapter over the resource's main repository.
    #[must_use]
    pub const fn adapter(&self) -> &ResourceRepositoryAdapter {
        &self.adapter
    }

    /// Returns the method table of the main repository.
    #[must_use]
    pub fn methods(&self) -> &Arc<MethodTable> {
        &self.methods
    }

    /// Returns the method table serving a relationship: its dedicated
    /// repository, or else the main repository.
    #[must_use]
    pub fn relationship_methods(&self, field: &RelationshipField) -> Arc<MethodTable> {
        field
            .repository()
            .cloned()
            .unwrap_or_else(|| self.methods.clone())
    }
}

/// Builder for [`ResourceDefinition`].
pub struct ResourceDefinitionBuilder {
    resource_type: String,
    shape: EntityShape,
    relationships: IndexMap<String, RelationshipField>,
    repository: Option<Arc<dyn Repository>>,
}

impl ResourceDefinitionBuilder {
    fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            shape: EntityShape::default(),
            relationships: IndexMap::new(),
            repository: None,
        }
    }

    /// Returns the type name being defined.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Sets the identifier value type (default: integer).
    #[must_use]
    pub fn id_type(mut self, id_type: IdType) -> Self {
        self.shape.id_type = id_type;
        self
    }

    /// Sets the identifier field name (default: `id`).
    #[must_use]
    pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
        self.shape.id_field = id_field.into();
        self
    }

    /// Declares an attribute field.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.shape.attributes.push(name.into());
        self
    }

    /// Declares a to-one relationship served by the main repository.
    #[must_use]
    pub fn to_one(self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.relationship(RelationshipField::to_one(name, target_type))
    }

    /// Declares a to-many relationship served by the main repository.
    #[must_use]
    pub fn to_many(self, name: impl Into<String>, target_type: impl Into<String>) -> Self {
        self.relationship(RelationshipField::to_many(name, target_type))
    }

    /// Declares a relationship. A later declaration with the same name wins.
    #[must_use]
    pub fn relationship(mut self, field: RelationshipField) -> Self {
        self.relationships.insert(field.name.clone(), field);
        self
    }

    /// Sets the main repository.
    #[must_use]
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub(crate) fn build(self, factory: Arc<ParametersFactory>) -> ResourceDefinition {
        let methods = Arc::new(match self.repository {
            Some(repository) => MethodTable::new(repository),
            None => MethodTable::empty(self.resource_type.clone()),
        });
        let adapter = ResourceRepositoryAdapter::new(
            self.resource_type.clone(),
            self.shape.id_type,
            methods.clone(),
            factory,
        );
        ResourceDefinition {
            resource_type: self.resource_type,
            shape: self.shape,
            relationships: self.relationships,
            methods,
            adapter,
        }
    }
}

impl fmt::Debug for ResourceDefinitionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinitionBuilder")
            .field("resource_type", &self.resource_type)
            .field("shape", &self.shape)
            .field("relationships", &self.relationships)
            .field("repository", &self.repository.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}
