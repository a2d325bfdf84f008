//! Parameter assembly.

use crate::method::{Arg, Args, ParamSlot};
use crate::provider::ParameterProviders;
use heron_core::{Capability, HeronError, HeronResult, RequestContext};
use tracing::warn;

/// Builds the argument list of a repository method invocation.
///
/// The first slots are filled positionally from the engine-supplied prefix.
/// Every later slot is filled by the first rule that applies:
///
/// 1. [`ParamSlot::RequestParams`] from the request context, for read
///    capabilities;
/// 2. [`ParamSlot::Principal`] from the request context;
/// 3. the [`ParameterProviders`] chain.
///
/// A slot nothing can fill is [`HeronError::UnresolvedParameter`]. A slot is
/// never given a default.
#[derive(Debug, Clone, Default)]
pub struct ParametersFactory {
    providers: ParameterProviders,
}

impl ParametersFactory {
    /// Creates a factory over a provider chain.
    #[must_use]
    pub fn new(providers: ParameterProviders) -> Self {
        Self { providers }
    }

    /// Returns the provider chain.
    #[must_use]
    pub const fn providers(&self) -> &ParameterProviders {
        &self.providers
    }

    /// Assembles the arguments for a method declared with `slots`.
    pub fn build(
        &self,
        prefix: Vec<Arg>,
        slots: &[ParamSlot],
        context: &RequestContext,
        capability: Capability,
        repository: &str,
    ) -> HeronResult<Args> {
        check_prefix(&prefix, slots, capability, repository)?;

        let mut values = prefix;
        values.reserve(slots.len() - values.len());

        for (position, slot) in slots.iter().enumerate().skip(values.len()) {
            let value = match slot {
                ParamSlot::RequestParams if capability.carries_params() => {
                    Some(Arg::RequestParams(context.params().clone()))
                }
                ParamSlot::Principal => Some(Arg::Principal(context.principal().clone())),
                _ => None,
            }
            .or_else(|| self.providers.provide(slot, context));

            match value {
                Some(value) => values.push(value),
                None => {
                    warn!(
                        repository = repository,
                        capability = %capability,
                        position = position,
                        slot = %slot,
                        "no provider resolves repository parameter"
                    );
                    return Err(HeronError::UnresolvedParameter {
                        capability,
                        repository: repository.to_string(),
                        position,
                        slot: slot.to_string(),
                    });
                }
            }
        }

        Ok(Args::new(capability, repository, values))
    }
}

/// Checks a declared slot list against the prefix a capability requires.
pub(crate) fn check_declaration(
    slots: &[ParamSlot],
    capability: Capability,
    repository: &str,
) -> HeronResult<()> {
    let expected = ParamSlot::prefix(capability);
    if slots.len() < expected.len() {
        return Err(HeronError::invalid_method_shape(
            capability,
            repository,
            format!(
                "declares {} parameters, the {capability} prefix needs {}",
                slots.len(),
                expected.len()
            ),
        ));
    }
    if let Some((position, (declared, required))) = slots
        .iter()
        .zip(expected)
        .enumerate()
        .find(|(_, (declared, required))| declared != required)
    {
        return Err(HeronError::invalid_method_shape(
            capability,
            repository,
            format!("parameter {position} is declared as {declared}, expected {required}"),
        ));
    }
    Ok(())
}

fn check_prefix(
    prefix: &[Arg],
    slots: &[ParamSlot],
    capability: Capability,
    repository: &str,
) -> HeronResult<()> {
    if slots.len() < prefix.len() {
        return Err(HeronError::invalid_method_shape(
            capability,
            repository,
            format!(
                "declares {} parameters, the {capability} prefix needs {}",
                slots.len(),
                prefix.len()
            ),
        ));
    }
    match slots
        .iter()
        .zip(prefix)
        .position(|(slot, arg)| !slot.accepts(arg))
    {
        Some(position) => Err(HeronError::invalid_method_shape(
            capability,
            repository,
            format!(
                "parameter {position} is declared as {}, which does not match the {capability} prefix",
                slots[position]
            ),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FnProvider;
    use heron_core::di::Container;
    use heron_core::{Principal, RequestParams, ResourceId};
    use std::sync::Arc;

    struct Clock(u64);

    fn ctx() -> RequestContext {
        RequestContext::new()
            .with_params(RequestParams::new().with_query("sort", "name"))
            .with_principal(Principal::subject("u1"))
    }

    #[test]
    fn test_prefix_then_context_values() {
        let factory = ParametersFactory::default();
        let args = factory
            .build(
                vec![Arg::Id(ResourceId::Integer(1))],
                &[ParamSlot::Id, ParamSlot::RequestParams, ParamSlot::Principal],
                &ctx(),
                Capability::FindOne,
                "tasks",
            )
            .unwrap();

        assert_eq!(args.len(), 3);
        assert_eq!(args.params(1).unwrap().get("sort"), Some("name"));
        assert_eq!(args.principal(2).unwrap(), &Principal::subject("u1"));
    }

    #[test]
    fn test_prefix_kind_mismatch_is_invalid_shape() {
        let err = ParametersFactory::default()
            .build(
                vec![Arg::Id(ResourceId::Integer(1))],
                &[ParamSlot::FieldName],
                &ctx(),
                Capability::Delete,
                "tasks",
            )
            .unwrap_err();
        assert!(matches!(err, HeronError::InvalidHandlerMethodShape { .. }));
    }

    #[test]
    fn test_too_few_slots_is_invalid_shape() {
        let err = ParametersFactory::default()
            .build(
                vec![Arg::Id(ResourceId::Integer(1))],
                &[],
                &ctx(),
                Capability::FindOne,
                "tasks",
            )
            .unwrap_err();
        assert!(matches!(err, HeronError::InvalidHandlerMethodShape { .. }));
    }

    #[test]
    fn test_request_params_only_for_reads() {
        let err = ParametersFactory::default()
            .build(
                vec![Arg::Id(ResourceId::Integer(1))],
                &[ParamSlot::Id, ParamSlot::RequestParams],
                &ctx(),
                Capability::Delete,
                "tasks",
            )
            .unwrap_err();
        match err {
            HeronError::UnresolvedParameter { position, slot, .. } => {
                assert_eq!(position, 1);
                assert_eq!(slot, "request params");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_extension_from_container_and_closure() {
        let mut container = Container::new();
        container.register(Arc::new(Clock(99)));

        let providers = ParameterProviders::new()
            .with(FnProvider::new(|slot: &ParamSlot, _: &RequestContext| {
                (*slot == ParamSlot::extension::<String>())
                    .then(|| Arg::extension("en-GB".to_string()))
            }))
            .with(container);
        let factory = ParametersFactory::new(providers);

        let args = factory
            .build(
                vec![],
                &[ParamSlot::extension::<Clock>(), ParamSlot::extension::<String>()],
                &ctx(),
                Capability::FindAll,
                "tasks",
            )
            .unwrap();

        assert_eq!(args.extension::<Clock>(0).unwrap().0, 99);
        assert_eq!(args.extension::<String>(1).unwrap().as_str(), "en-GB");
    }

    #[test]
    fn test_unresolved_extension() {
        let err = ParametersFactory::default()
            .build(
                vec![],
                &[ParamSlot::extension::<Clock>()],
                &ctx(),
                Capability::FindAll,
                "tasks",
            )
            .unwrap_err();
        assert!(matches!(err, HeronError::UnresolvedParameter { position: 0, .. }));
        assert!(err.to_string().contains("Clock"));
    }

    #[test]
    fn test_check_declaration() {
        assert!(check_declaration(&[ParamSlot::Entity], Capability::Save, "tasks").is_ok());
        assert!(check_declaration(
            &[ParamSlot::Id, ParamSlot::FieldName],
            Capability::FindOneTarget,
            "tasks"
        )
        .is_ok());

        let err = check_declaration(
            &[ParamSlot::Id, ParamSlot::TargetIds, ParamSlot::FieldName],
            Capability::SetRelation,
            "tasks",
        )
        .unwrap_err();
        assert!(err.to_string().contains("parameter 1"));
        assert!(check_declaration(&[ParamSlot::Id], Capability::AddRelations, "tasks").is_err());
    }
}
