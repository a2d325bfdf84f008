use crate::discovery::MethodTable;
use crate::method::{Arg, Returned};
use crate::parameters::ParametersFactory;
use heron_core::{
    Capability, HeronError, HeronResult, IdType, RequestContext, Resource, ResourceId,
};
use std::sync::Arc;

/// Typed access to the resource capabilities of a repository.
#[derive(Debug, Clone)]
pub struct ResourceRepositoryAdapter {
    resource_type: String,
    id_type: IdType,
    methods: Arc<MethodTable>,
    factory: Arc<ParametersFactory>,
}

impl ResourceRepositoryAdapter {
    pub(crate) fn new(
        resource_type: String,
        id_type: IdType,
        methods: Arc<MethodTable>,
        factory: Arc<ParametersFactory>,
    ) -> Self {
        Self {
            resource_type,
            id_type,
            methods,
            factory,
        }
    }

    /// Returns the resource type served.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the repository name.
    #[must_use]
    pub fn repository_name(&self) -> &str {
        self.methods.name()
    }

    /// Coerces a raw id to the resource's id type.
    pub fn parse_id(&self, raw: &str) -> HeronResult<ResourceId> {
        self.id_type.parse(raw)
    }

    /// Loads one resource.
    ///
    /// A method that returns an absent optional resource is reported as
    /// [`HeronError::ResourceNotFound`].
    pub fn find_one(&self, id: &str, context: &RequestContext) -> HeronResult<Resource> {
        let capability = Capability::FindOne;
        let prefix = vec![Arg::Id(self.parse_id(id)?)];
        match self.invoke(capability, prefix, context)? {
            Returned::Resource(resource) | Returned::OptionalResource(Some(resource)) => {
                Ok(resource)
            }
            Returned::OptionalResource(None) => {
                Err(HeronError::not_found_resource(&self.resource_type, id))
            }
            other => Err(self.methods.wrong_shape(capability, &other, "a resource")),
        }
    }

    /// Loads a collection. Multi-id reads carry their ids in the context's
    /// request parameters.
    pub fn find_all(&self, context: &RequestContext) -> HeronResult<Vec<Resource>> {
        let capability = Capability::FindAll;
        match self.invoke(capability, Vec::new(), context)? {
            Returned::Resources(resources) => Ok(resources),
            other => Err(self.methods.wrong_shape(capability, &other, "a resource list")),
        }
    }

    /// Creates or updates a resource and returns the stored value.
    pub fn save(&self, resource: Resource, context: &RequestContext) -> HeronResult<Resource> {
        let capability = Capability::Save;
        match self.invoke(capability, vec![Arg::Entity(resource)], context)? {
            Returned::Resource(saved) => Ok(saved),
            other => Err(self.methods.wrong_shape(capability, &other, "a resource")),
        }
    }

    /// Deletes a resource.
    pub fn delete(&self, id: &str, context: &RequestContext) -> HeronResult<()> {
        let capability = Capability::Delete;
        let prefix = vec![Arg::Id(self.parse_id(id)?)];
        match self.invoke(capability, prefix, context)? {
            Returned::Unit => Ok(()),
            other => Err(self.methods.wrong_shape(capability, &other, "unit")),
        }
    }

    fn invoke(
        &self,
        capability: Capability,
        prefix: Vec<Arg>,
        context: &RequestContext,
    ) -> HeronResult<Returned> {
        self.methods.invoke(capability, prefix, context, &self.factory)
    }
}
