use crate::definition::RelationshipField;
use crate::discovery::MethodTable;
use crate::method::{Arg, Returned};
use crate::parameters::ParametersFactory;
use heron_core::{Capability, HeronResult, IdType, RequestContext, Resource, ResourceId};
use std::sync::Arc;

/// Typed access to the relationship capabilities serving one relationship
/// field.
///
/// Obtained from
/// [`ResourceRegistry::relationship_adapter`](crate::ResourceRegistry::relationship_adapter).
/// The field name is passed to every method as its [`FieldName`](crate::ParamSlot::FieldName)
/// argument, so a single repository can serve several relationships.
#[derive(Debug, Clone)]
pub struct RelationshipRepositoryAdapter {
    source_type: String,
    source_id_type: IdType,
    target_id_type: IdType,
    field: RelationshipField,
    methods: Arc<MethodTable>,
    factory: Arc<ParametersFactory>,
}

impl RelationshipRepositoryAdapter {
    pub(crate) fn new(
        source_type: String,
        source_id_type: IdType,
        target_id_type: IdType,
        field: RelationshipField,
        methods: Arc<MethodTable>,
        factory: Arc<ParametersFactory>,
    ) -> Self {
        Self {
            source_type,
            source_id_type,
            target_id_type,
            field,
            methods,
            factory,
        }
    }

    /// Returns the source resource type.
    #[must_use]
    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    /// Returns the relationship field.
    #[must_use]
    pub const fn field(&self) -> &RelationshipField {
        &self.field
    }

    /// Returns the repository name.
    #[must_use]
    pub fn repository_name(&self) -> &str {
        self.methods.name()
    }

    /// Coerces a target id with the target type's id type.
    pub fn parse_target_id(&self, raw: &str) -> HeronResult<ResourceId> {
        self.target_id_type.parse(raw)
    }

    /// Fails with `CapabilityNotDeclared` unless the repository serves the
    /// capability.
    pub fn require(&self, capability: Capability) -> HeronResult<()> {
        self.methods.lookup(capability).map(|_| ())
    }

    /// Replaces the target of a to-one relation; `None` clears it.
    pub fn set_relation(
        &self,
        source_id: &str,
        target_id: Option<&str>,
        context: &RequestContext,
    ) -> HeronResult<()> {
        self.require(Capability::SetRelation)?;
        let target = target_id.map(|id| self.parse_target_id(id)).transpose()?;
        let prefix = vec![
            Arg::Id(self.parse_source(source_id)?),
            Arg::TargetId(target),
            self.field_arg(),
        ];
        self.invoke_unit(Capability::SetRelation, prefix, context)
    }

    /// Replaces the targets of a to-many relation.
    pub fn set_relations(
        &self,
        source_id: &str,
        target_ids: &[String],
        context: &RequestContext,
    ) -> HeronResult<()> {
        self.mutate_many(Capability::SetRelations, source_id, target_ids, context)
    }

    /// Adds targets to a to-many relation.
    pub fn add_relations(
        &self,
        source_id: &str,
        target_ids: &[String],
        context: &RequestContext,
    ) -> HeronResult<()> {
        self.mutate_many(Capability::AddRelations, source_id, target_ids, context)
    }

    /// Removes targets from a to-many relation. Absent targets are ignored
    /// by well-behaved repositories.
    pub fn remove_relations(
        &self,
        source_id: &str,
        target_ids: &[String],
        context: &RequestContext,
    ) -> HeronResult<()> {
        self.mutate_many(Capability::RemoveRelations, source_id, target_ids, context)
    }

    /// Resolves the target of a to-one relation.
    pub fn find_one_target(
        &self,
        source_id: &str,
        context: &RequestContext,
    ) -> HeronResult<Option<Resource>> {
        let capability = Capability::FindOneTarget;
        let prefix = vec![Arg::Id(self.parse_source(source_id)?), self.field_arg()];
        match self.methods.invoke(capability, prefix, context, &self.factory)? {
            Returned::OptionalResource(target) => Ok(target),
            Returned::Resource(target) => Ok(Some(target)),
            other => Err(self
                .methods
                .wrong_shape(capability, &other, "an optional resource")),
        }
    }

    /// Resolves the targets of a to-many relation.
    pub fn find_many_targets(
        &self,
        source_id: &str,
        context: &RequestContext,
    ) -> HeronResult<Vec<Resource>> {
        let capability = Capability::FindManyTargets;
        let prefix = vec![Arg::Id(self.parse_source(source_id)?), self.field_arg()];
        match self.methods.invoke(capability, prefix, context, &self.factory)? {
            Returned::Resources(targets) => Ok(targets),
            other => Err(self.methods.wrong_shape(capability, &other, "a resource list")),
        }
    }

    fn mutate_many(
        &self,
        capability: Capability,
        source_id: &str,
        target_ids: &[String],
        context: &RequestContext,
    ) -> HeronResult<()> {
        self.require(capability)?;
        let targets = self
            .target_id_type
            .parse_all(target_ids.iter().map(String::as_str))?;
        let prefix = vec![
            Arg::Id(self.parse_source(source_id)?),
            Arg::TargetIds(targets),
            self.field_arg(),
        ];
        self.invoke_unit(capability, prefix, context)
    }

    fn invoke_unit(
        &self,
        capability: Capability,
        prefix: Vec<Arg>,
        context: &RequestContext,
    ) -> HeronResult<()> {
        match self.methods.invoke(capability, prefix, context, &self.factory)? {
            Returned::Unit => Ok(()),
            other => Err(self.methods.wrong_shape(capability, &other, "unit")),
        }
    }

    fn parse_source(&self, raw: &str) -> HeronResult<ResourceId> {
        self.source_id_type.parse(raw)
    }

    fn field_arg(&self) -> Arg {
        Arg::FieldName(self.field.name().to_string())
    }
}
