//! The repository method contract.
//!
//! A repository is any object that implements [`Repository`]. Instead of being
//! discovered by reflection, it declares its operations as a table of
//! [`RepositoryMethod`]s, each tagged with exactly one [`Capability`], a list
//! of [`ParamSlot`]s and an invocation function.
//!
//! The first parameters of every capability form a fixed prefix supplied by the
//! engine:
//!
//! | Capability | Prefix |
//! |---|---|
//! | `FindOne`, `Delete` | `Id` |
//! | `FindAll` | (none) |
//! | `Save` | `Entity` |
//! | `SetRelation` | `Id`, `TargetId`, `FieldName` |
//! | `SetRelations`, `AddRelations`, `RemoveRelations` | `Id`, `TargetIds`, `FieldName` |
//! | `FindOneTarget`, `FindManyTargets` | `Id`, `FieldName` |
//!
//! Any slots after the prefix are filled by [`ParametersFactory`](crate::ParametersFactory).

use heron_core::{
    Capability, HeronError, HeronResult, Principal, RequestParams, Resource, ResourceId,
};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// The declared kind of a repository method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamSlot {
    /// The id of the addressed (source) resource.
    Id,
    /// The resource to save.
    Entity,
    /// The relationship field name.
    FieldName,
    /// The target of a to-one relation; absent clears it.
    TargetId,
    /// The ordered targets of a to-many relation.
    TargetIds,
    /// The opaque request parameters.
    RequestParams,
    /// The security principal of the caller.
    Principal,
    /// A value of an arbitrary type supplied by a parameter provider.
    Extension {
        /// The runtime type of the expected value.
        type_id: TypeId,
        /// The type name, for diagnostics.
        type_name: &'static str,
    },
}

impl ParamSlot {
    /// Declares an extension parameter of type `T`.
    #[must_use]
    pub fn extension<T: Any + Send + Sync>() -> Self {
        Self::Extension {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the fixed prefix the engine supplies for a capability.
    #[must_use]
    pub const fn prefix(capability: Capability) -> &'static [Self] {
        match capability {
            Capability::FindOne | Capability::Delete => &[Self::Id],
            Capability::FindAll => &[],
            Capability::Save => &[Self::Entity],
            Capability::SetRelation => &[Self::Id, Self::TargetId, Self::FieldName],
            Capability::SetRelations | Capability::AddRelations | Capability::RemoveRelations => {
                &[Self::Id, Self::TargetIds, Self::FieldName]
            }
            Capability::FindOneTarget | Capability::FindManyTargets => {
                &[Self::Id, Self::FieldName]
            }
        }
    }

    /// Returns `true` if the argument can fill this slot.
    #[must_use]
    pub fn accepts(&self, arg: &Arg) -> bool {
        match (self, arg) {
            (Self::Extension { type_id, .. }, Arg::Extension(value)) => {
                let value: &(dyn Any + Send + Sync) = &**value;
                value.type_id() == *type_id
            }
            (Self::Extension { .. }, _) | (_, Arg::Extension(_)) => false,
            (slot, arg) => *slot == arg.slot(),
        }
    }
}

impl fmt::Display for ParamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("id"),
            Self::Entity => f.write_str("entity"),
            Self::FieldName => f.write_str("field name"),
            Self::TargetId => f.write_str("target id"),
            Self::TargetIds => f.write_str("target ids"),
            Self::RequestParams => f.write_str("request params"),
            Self::Principal => f.write_str("principal"),
            Self::Extension { type_name, .. } => f.write_str(type_name),
        }
    }
}

/// A single argument value.
#[derive(Clone)]
pub enum Arg {
    /// See [`ParamSlot::Id`].
    Id(ResourceId),
    /// See [`ParamSlot::Entity`].
    Entity(Resource),
    /// See [`ParamSlot::FieldName`].
    FieldName(String),
    /// See [`ParamSlot::TargetId`].
    TargetId(Option<ResourceId>),
    /// See [`ParamSlot::TargetIds`].
    TargetIds(Vec<ResourceId>),
    /// See [`ParamSlot::RequestParams`].
    RequestParams(RequestParams),
    /// See [`ParamSlot::Principal`].
    Principal(Principal),
    /// See [`ParamSlot::Extension`].
    Extension(Arc<dyn Any + Send + Sync>),
}

impl Arg {
    /// Wraps a provider-supplied value.
    #[must_use]
    pub fn extension<T: Any + Send + Sync>(value: T) -> Self {
        Self::Extension(Arc::new(value))
    }

    /// Returns the slot kind this argument fills. Extension arguments report
    /// the unit type, since their payload type is erased.
    fn slot(&self) -> ParamSlot {
        match self {
            Self::Id(_) => ParamSlot::Id,
            Self::Entity(_) => ParamSlot::Entity,
            Self::FieldName(_) => ParamSlot::FieldName,
            Self::TargetId(_) => ParamSlot::TargetId,
            Self::TargetIds(_) => ParamSlot::TargetIds,
            Self::RequestParams(_) => ParamSlot::RequestParams,
            Self::Principal(_) => ParamSlot::Principal,
            Self::Extension(_) => ParamSlot::extension::<()>(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Id(_) => "an id",
            Self::Entity(_) => "an entity",
            Self::FieldName(_) => "a field name",
            Self::TargetId(_) => "a target id",
            Self::TargetIds(_) => "target ids",
            Self::RequestParams(_) => "request params",
            Self::Principal(_) => "a principal",
            Self::Extension(_) => "an extension value",
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Entity(resource) => f.debug_tuple("Entity").field(resource).finish(),
            Self::FieldName(name) => f.debug_tuple("FieldName").field(name).finish(),
            Self::TargetId(id) => f.debug_tuple("TargetId").field(id).finish(),
            Self::TargetIds(ids) => f.debug_tuple("TargetIds").field(ids).finish(),
            Self::RequestParams(params) => f.debug_tuple("RequestParams").field(params).finish(),
            Self::Principal(principal) => f.debug_tuple("Principal").field(principal).finish(),
            Self::Extension(_) => f.write_str("Extension(..)"),
        }
    }
}

/// The assembled arguments of one invocation.
///
/// Typed accessors fail with [`HeronError::InvocationFault`] when the argument
/// at a position is missing or of another kind, so a method whose body
/// disagrees with its declared slots is reported as a server fault rather than
/// a client error.
#[derive(Debug, Clone)]
pub struct Args {
    capability: Capability,
    repository: Arc<str>,
    values: Vec<Arg>,
}

impl Args {
    pub(crate) fn new(capability: Capability, repository: &str, values: Vec<Arg>) -> Self {
        Self {
            capability,
            repository: Arc::from(repository),
            values,
        }
    }

    /// Returns the capability being invoked.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw argument at a position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.values.get(index)
    }

    /// Returns the id at a position.
    pub fn id(&self, index: usize) -> HeronResult<&ResourceId> {
        match self.values.get(index) {
            Some(Arg::Id(id)) => Ok(id),
            other => Err(self.mismatch(index, "an id", other)),
        }
    }

    /// Returns the entity at a position.
    pub fn entity(&self, index: usize) -> HeronResult<&Resource> {
        match self.values.get(index) {
            Some(Arg::Entity(resource)) => Ok(resource),
            other => Err(self.mismatch(index, "an entity", other)),
        }
    }

    /// Consumes the arguments and returns the entity at a position.
    pub fn into_entity(mut self, index: usize) -> HeronResult<Resource> {
        if matches!(self.values.get(index), Some(Arg::Entity(_))) {
            if let Arg::Entity(resource) = self.values.swap_remove(index) {
                return Ok(resource);
            }
        }
        Err(self.mismatch(index, "an entity", self.values.get(index)))
    }

    /// Returns the relationship field name at a position.
    pub fn field_name(&self, index: usize) -> HeronResult<&str> {
        match self.values.get(index) {
            Some(Arg::FieldName(name)) => Ok(name),
            other => Err(self.mismatch(index, "a field name", other)),
        }
    }

    /// Returns the optional to-one target at a position.
    pub fn target_id(&self, index: usize) -> HeronResult<Option<&ResourceId>> {
        match self.values.get(index) {
            Some(Arg::TargetId(id)) => Ok(id.as_ref()),
            other => Err(self.mismatch(index, "a target id", other)),
        }
    }

    /// Returns the to-many targets at a position.
    pub fn target_ids(&self, index: usize) -> HeronResult<&[ResourceId]> {
        match self.values.get(index) {
            Some(Arg::TargetIds(ids)) => Ok(ids),
            other => Err(self.mismatch(index, "target ids", other)),
        }
    }

    /// Returns the request parameters at a position.
    pub fn params(&self, index: usize) -> HeronResult<&RequestParams> {
        match self.values.get(index) {
            Some(Arg::RequestParams(params)) => Ok(params),
            other => Err(self.mismatch(index, "request params", other)),
        }
    }

    /// Returns the principal at a position.
    pub fn principal(&self, index: usize) -> HeronResult<&Principal> {
        match self.values.get(index) {
            Some(Arg::Principal(principal)) => Ok(principal),
            other => Err(self.mismatch(index, "a principal", other)),
        }
    }

    /// Returns the extension value of type `T` at a position.
    pub fn extension<T: Any + Send + Sync>(&self, index: usize) -> HeronResult<Arc<T>> {
        match self.values.get(index) {
            Some(Arg::Extension(value)) => value.clone().downcast::<T>().map_err(|_| {
                self.fault(format!(
                    "argument {index} is not a {}",
                    std::any::type_name::<T>()
                ))
            }),
            other => Err(self.mismatch(index, std::any::type_name::<T>(), other)),
        }
    }

    fn mismatch(&self, index: usize, expected: &str, found: Option<&Arg>) -> HeronError {
        let found = found.map_or("missing", Arg::describe);
        self.fault(format!("argument {index} is {found}, expected {expected}"))
    }

    fn fault(&self, reason: String) -> HeronError {
        HeronError::invocation_fault(self.capability, &*self.repository, reason)
    }
}

/// The value a repository method returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    /// A single resource (`FindOne`, `Save`).
    Resource(Resource),
    /// A resource collection (`FindAll`, `FindManyTargets`).
    Resources(Vec<Resource>),
    /// A resource that may be absent (`FindOne`, `FindOneTarget`).
    OptionalResource(Option<Resource>),
    /// Nothing (`Delete` and relation mutations).
    Unit,
}

impl Returned {
    /// Returns a short name of the variant, for diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Resource(_) => "a resource",
            Self::Resources(_) => "a resource list",
            Self::OptionalResource(_) => "an optional resource",
            Self::Unit => "unit",
        }
    }
}

type Invoke = dyn Fn(Args) -> HeronResult<Returned> + Send + Sync;

/// One capability-tagged method of a repository.
///
/// # Example
///
/// ```rust
/// use heron_core::{Capability, Resource};
/// use heron_repository::{ParamSlot, RepositoryMethod, Returned};
///
/// let method = RepositoryMethod::new(
///     Capability::FindOne,
///     [ParamSlot::Id, ParamSlot::RequestParams],
///     |args| {
///         let id = args.id(0)?.clone();
///         Ok(Returned::Resource(Resource::new("tasks").with_id(id)))
///     },
/// );
/// assert_eq!(method.capability(), Capability::FindOne);
/// assert_eq!(method.params().len(), 2);
/// ```
pub struct RepositoryMethod {
    capability: Capability,
    params: Vec<ParamSlot>,
    invoke: Box<Invoke>,
}

impl RepositoryMethod {
    /// Declares a method.
    pub fn new<F>(capability: Capability, params: impl Into<Vec<ParamSlot>>, invoke: F) -> Self
    where
        F: Fn(Args) -> HeronResult<Returned> + Send + Sync + 'static,
    {
        Self {
            capability,
            params: params.into(),
            invoke: Box::new(invoke),
        }
    }

    /// Returns the capability tag.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Returns the declared parameter slots.
    #[must_use]
    pub fn params(&self) -> &[ParamSlot] {
        &self.params
    }

    /// Calls the method with assembled arguments.
    pub fn invoke(&self, args: Args) -> HeronResult<Returned> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for RepositoryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryMethod")
            .field("capability", &self.capability)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A data handler for one resource type or relationship.
///
/// # Example
///
/// ```rust
/// use heron_core::{Capability, HeronError, Resource};
/// use heron_repository::{ParamSlot, Repository, RepositoryMethod, Returned};
/// use std::sync::Arc;
///
/// struct Greetings;
///
/// impl Greetings {
///     fn find_one(&self, id: i64) -> Result<Resource, HeronError> {
///         Ok(Resource::new("greetings").with_id(id).with_attribute("text", "hello"))
///     }
/// }
///
/// impl Repository for Greetings {
///     fn name(&self) -> &str {
///         "greetings"
///     }
///
///     fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
///         vec![RepositoryMethod::new(Capability::FindOne, [ParamSlot::Id], move |args| {
///             let id = args.id(0)?.as_i64().unwrap_or_default();
///             self.find_one(id).map(Returned::Resource)
///         })]
///     }
/// }
/// ```
pub trait Repository: Send + Sync + 'static {
    /// Returns a name used in logs and error messages.
    fn name(&self) -> &str;

    /// Declares the methods this repository implements.
    ///
    /// Called once per adapter; the returned closures typically capture
    /// `self`.
    fn methods(self: Arc<Self>) -> Vec<RepositoryMethod>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert!(ParamSlot::prefix(Capability::FindAll).is_empty());
        assert_eq!(
            ParamSlot::prefix(Capability::SetRelation),
            &[ParamSlot::Id, ParamSlot::TargetId, ParamSlot::FieldName]
        );
        assert_eq!(
            ParamSlot::prefix(Capability::RemoveRelations),
            &[ParamSlot::Id, ParamSlot::TargetIds, ParamSlot::FieldName]
        );
    }

    #[test]
    fn test_slot_accepts_matching_kinds() {
        assert!(ParamSlot::Id.accepts(&Arg::Id(ResourceId::Integer(1))));
        assert!(!ParamSlot::Id.accepts(&Arg::FieldName("project".to_string())));
        assert!(ParamSlot::extension::<u32>().accepts(&Arg::extension(5_u32)));
        assert!(!ParamSlot::extension::<u32>().accepts(&Arg::extension("five")));
        assert!(!ParamSlot::extension::<()>().accepts(&Arg::Id(ResourceId::Integer(1))));
    }

    #[test]
    fn test_typed_accessors() {
        let args = Args::new(
            Capability::SetRelation,
            "tasks-to-project",
            vec![
                Arg::Id(ResourceId::Integer(1)),
                Arg::TargetId(None),
                Arg::FieldName("project".to_string()),
                Arg::extension(42_u64),
            ],
        );

        assert_eq!(args.id(0).unwrap(), &ResourceId::Integer(1));
        assert_eq!(args.target_id(1).unwrap(), None);
        assert_eq!(args.field_name(2).unwrap(), "project");
        assert_eq!(*args.extension::<u64>(3).unwrap(), 42);
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_accessor_mismatch_is_invocation_fault() {
        let args = Args::new(Capability::FindOne, "tasks", vec![Arg::FieldName("x".into())]);

        let err = args.id(0).unwrap_err();
        assert!(matches!(err, HeronError::InvocationFault { .. }));
        assert!(err.to_string().contains("argument 0 is a field name"));

        let err = args.params(3).unwrap_err();
        assert!(err.to_string().contains("missing"));

        let err = args.extension::<u8>(0).unwrap_err();
        assert!(matches!(err, HeronError::InvocationFault { .. }));
    }

    #[test]
    fn test_into_entity() {
        let task = Resource::new("tasks").with_attribute("name", "x");
        let args = Args::new(Capability::Save, "tasks", vec![Arg::Entity(task.clone())]);
        assert_eq!(args.into_entity(0).unwrap(), task);

        let args = Args::new(Capability::Save, "tasks", vec![]);
        assert!(matches!(
            args.into_entity(0),
            Err(HeronError::InvocationFault { .. })
        ));
    }

    #[test]
    fn test_method_invoke() {
        let method = RepositoryMethod::new(Capability::Delete, [ParamSlot::Id], |args| {
            args.id(0)?;
            Ok(Returned::Unit)
        });
        let args = Args::new(Capability::Delete, "tasks", vec![Arg::Id(ResourceId::Integer(3))]);
        assert_eq!(method.invoke(args).unwrap(), Returned::Unit);
        assert!(format!("{method:?}").contains("Delete"));
    }
}
