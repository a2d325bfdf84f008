//! The resource registry.

use crate::adapter::{RelationshipRepositoryAdapter, ResourceRepositoryAdapter};
use crate::definition::{RelationshipField, ResourceDefinition, ResourceDefinitionBuilder};
use crate::parameters::ParametersFactory;
use crate::provider::ParameterProviders;
use heron_core::{Capability, HeronError, HeronResult};
use heron_path::PathSchema;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The set of registered resource types.
///
/// Registration takes the write lock and normally happens once at startup.
/// Resolution takes the read lock only long enough to clone an `Arc`, so no
/// lock is held while a repository runs.
///
/// # Example
///
/// ```rust
/// use heron_core::HeronError;
/// use heron_repository::{ResourceDefinition, ResourceRegistry};
///
/// let registry = ResourceRegistry::new();
/// registry.register(ResourceDefinition::builder("projects"));
/// registry.register(ResourceDefinition::builder("tasks").to_one("project", "projects"));
///
/// assert_eq!(registry.types(), vec!["projects", "tasks"]);
/// assert!(registry.resolve_relationship("tasks", "project").is_ok());
/// assert!(matches!(
///     registry.resolve("people"),
///     Err(HeronError::UnknownResourceType { .. })
/// ));
/// ```
pub struct ResourceRegistry {
    definitions: RwLock<IndexMap<String, Arc<ResourceDefinition>>>,
    factory: Arc<ParametersFactory>,
}

impl ResourceRegistry {
    /// Creates an empty registry without parameter providers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_providers(ParameterProviders::new())
    }

    /// Creates an empty registry whose adapters consult the given providers.
    #[must_use]
    pub fn with_providers(providers: ParameterProviders) -> Self {
        Self {
            definitions: RwLock::new(IndexMap::new()),
            factory: Arc::new(ParametersFactory::new(providers)),
        }
    }

    /// Registers a resource type, replacing any earlier registration of the
    /// same name.
    pub fn register(&self, builder: ResourceDefinitionBuilder) -> Arc<ResourceDefinition> {
        let definition = Arc::new(builder.build(self.factory.clone()));
        let resource_type = definition.resource_type().to_string();

        let replaced = self
            .definitions
            .write()
            .insert(resource_type.clone(), definition.clone())
            .is_some();

        if replaced {
            info!(resource_type = %resource_type, "replaced resource registration");
        } else {
            debug!(
                resource_type = %resource_type,
                repository = definition.methods().name(),
                "registered resource type"
            );
        }
        definition
    }

    /// Looks up a resource type.
    pub fn resolve(&self, resource_type: &str) -> HeronResult<Arc<ResourceDefinition>> {
        self.definitions
            .read()
            .get(resource_type)
            .cloned()
            .ok_or_else(|| HeronError::unknown_resource_type(resource_type))
    }

    /// Looks up a relationship of a resource type.
    ///
    /// Fails with [`HeronError::UnknownRelationship`] if the type does not
    /// declare it, and with [`HeronError::UnknownResourceType`] if its target
    /// type is not registered.
    pub fn resolve_relationship(
        &self,
        resource_type: &str,
        relationship: &str,
    ) -> HeronResult<RelationshipField> {
        let definition = self.resolve(resource_type)?;
        let field = definition
            .relationship(relationship)
            .cloned()
            .ok_or_else(|| HeronError::unknown_relationship(resource_type, relationship))?;
        self.resolve(field.target_type())?;
        Ok(field)
    }

    /// Returns the resource adapter of a type.
    pub fn resource_adapter(&self, resource_type: &str) -> HeronResult<ResourceRepositoryAdapter> {
        Ok(self.resolve(resource_type)?.adapter().clone())
    }

    /// Returns the adapter serving a relationship of a type.
    pub fn relationship_adapter(
        &self,
        resource_type: &str,
        relationship: &str,
    ) -> HeronResult<RelationshipRepositoryAdapter> {
        let source = self.resolve(resource_type)?;
        let field = source
            .relationship(relationship)
            .cloned()
            .ok_or_else(|| HeronError::unknown_relationship(resource_type, relationship))?;
        let target = self.resolve(field.target_type())?;
        let methods = source.relationship_methods(&field);

        Ok(RelationshipRepositoryAdapter::new(
            source.resource_type().to_string(),
            source.id_type(),
            target.id_type(),
            field,
            methods,
            self.factory.clone(),
        ))
    }

    /// Returns the registered type names, in registration order.
    #[must_use]
    pub fn types(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }

    /// Returns `true` if the type is registered.
    #[must_use]
    pub fn contains(&self, resource_type: &str) -> bool {
        self.definitions.read().contains_key(resource_type)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }

    /// Collects every configuration problem of the registered types:
    /// malformed method declarations, relationships pointing at unregistered
    /// types and relationship repositories without relationship methods.
    #[must_use]
    pub fn problems(&self) -> Vec<HeronError> {
        let definitions: Vec<_> = self.definitions.read().values().cloned().collect();
        let mut problems = Vec::new();

        for definition in &definitions {
            problems.extend(definition.methods().verify());

            for field in definition.relationships() {
                if !self.contains(field.target_type()) {
                    problems.push(HeronError::unknown_resource_type(field.target_type()));
                }
                if let Some(methods) = field.repository() {
                    problems.extend(methods.verify());
                    if !Capability::RELATIONSHIP.iter().any(|c| methods.declares(*c)) {
                        problems.push(HeronError::CapabilityNotDeclared {
                            capability: if field.is_to_many() {
                                Capability::FindManyTargets
                            } else {
                                Capability::FindOneTarget
                            },
                            repository: methods.name().to_string(),
                        });
                    }
                }
            }
        }
        problems
    }

    /// Verifies every registered type eagerly.
    ///
    /// Every problem is logged; the first one is returned.
    pub fn verify(&self) -> HeronResult<()> {
        let mut problems = self.problems();
        for problem in &problems {
            warn!(error = %problem, "resource registry problem");
        }
        if problems.is_empty() {
            info!(types = self.len(), "resource registry verified");
            Ok(())
        } else {
            Err(problems.remove(0))
        }
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("types", &self.types())
            .field("providers", self.factory.providers())
            .finish()
    }
}

impl PathSchema for ResourceRegistry {
    fn check_type(&self, resource_type: &str) -> HeronResult<()> {
        self.resolve(resource_type).map(|_| ())
    }

    fn check_relationship(&self, resource_type: &str, relationship: &str) -> HeronResult<()> {
        self.resolve_relationship(resource_type, relationship).map(|_| ())
    }
}
