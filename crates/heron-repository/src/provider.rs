//! Extension parameter providers.
//!
//! Repository parameters beyond the fixed prefix, the request parameters and
//! the principal are offered to an ordered chain of [`ParameterProvider`]s.
//! The first provider that returns a value wins.

use crate::method::{Arg, ParamSlot};
use heron_core::di::Container;
use heron_core::RequestContext;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Supplies values for extension parameters.
pub trait ParameterProvider: Send + Sync + 'static {
    /// Returns a value for the slot, or `None` to let the next provider try.
    fn provide(&self, slot: &ParamSlot, context: &RequestContext) -> Option<Arg>;
}

/// A provider backed by a closure.
///
/// # Example
///
/// ```rust
/// use heron_core::RequestContext;
/// use heron_repository::{Arg, FnProvider, ParamSlot, ParameterProvider};
///
/// let provider = FnProvider::new(|slot: &ParamSlot, _ctx: &RequestContext| {
///     (*slot == ParamSlot::extension::<u32>()).then(|| Arg::extension(7_u32))
/// });
///
/// let ctx = RequestContext::new();
/// assert!(provider.provide(&ParamSlot::extension::<u32>(), &ctx).is_some());
/// assert!(provider.provide(&ParamSlot::extension::<u64>(), &ctx).is_none());
/// ```
pub struct FnProvider<F> {
    func: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&ParamSlot, &RequestContext) -> Option<Arg> + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> ParameterProvider for FnProvider<F>
where
    F: Fn(&ParamSlot, &RequestContext) -> Option<Arg> + Send + Sync + 'static,
{
    fn provide(&self, slot: &ParamSlot, context: &RequestContext) -> Option<Arg> {
        (self.func)(slot, context)
    }
}

/// A provider that computes a value of type `T` for every request.
struct RequestScoped<T, F> {
    func: F,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, F> ParameterProvider for RequestScoped<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&RequestContext) -> T + Send + Sync + 'static,
{
    fn provide(&self, slot: &ParamSlot, context: &RequestContext) -> Option<Arg> {
        match slot {
            ParamSlot::Extension { type_id, .. } if *type_id == TypeId::of::<T>() => {
                Some(Arg::extension((self.func)(context)))
            }
            _ => None,
        }
    }
}

/// Serves extension slots from registered singleton services.
impl ParameterProvider for Container {
    fn provide(&self, slot: &ParamSlot, _context: &RequestContext) -> Option<Arg> {
        match slot {
            ParamSlot::Extension { type_id, .. } => self.resolve_erased(*type_id).map(Arg::Extension),
            _ => None,
        }
    }
}

/// An ordered chain of providers.
#[derive(Clone, Default)]
pub struct ParameterProviders {
    providers: Vec<Arc<dyn ParameterProvider>>,
}

impl ParameterProviders {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider.
    pub fn push(&mut self, provider: impl ParameterProvider) {
        self.providers.push(Arc::new(provider));
    }

    /// Returns the chain with a provider appended.
    #[must_use]
    pub fn with(mut self, provider: impl ParameterProvider) -> Self {
        self.push(provider);
        self
    }

    /// Appends a provider computing a fresh `T` from each request.
    pub fn push_request_scoped<T, F>(&mut self, func: F)
    where
        T: Any + Send + Sync,
        F: Fn(&RequestContext) -> T + Send + Sync + 'static,
    {
        self.push(RequestScoped {
            func,
            _marker: std::marker::PhantomData,
        });
    }

    /// Asks each provider in order; the first value wins.
    #[must_use]
    pub fn provide(&self, slot: &ParamSlot, context: &RequestContext) -> Option<Arg> {
        self.providers
            .iter()
            .find_map(|provider| provider.provide(slot, context))
    }

    /// Returns the number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ParameterProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterProviders")
            .field("provider_count", &self.providers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heron_core::Principal;

    #[derive(Debug, PartialEq)]
    struct Tenant(String);

    #[test]
    fn test_container_provides_registered_services() {
        let mut container = Container::new();
        container.register(Arc::new(Tenant("acme".to_string())));

        let ctx = RequestContext::new();
        let arg = container
            .provide(&ParamSlot::extension::<Tenant>(), &ctx)
            .unwrap();
        assert!(ParamSlot::extension::<Tenant>().accepts(&arg));

        assert!(container.provide(&ParamSlot::extension::<u8>(), &ctx).is_none());
        assert!(container.provide(&ParamSlot::RequestParams, &ctx).is_none());
    }

    #[test]
    fn test_first_acceptor_wins() {
        let providers = ParameterProviders::new()
            .with(FnProvider::new(|_: &ParamSlot, _: &RequestContext| None))
            .with(FnProvider::new(|_: &ParamSlot, _: &RequestContext| {
                Some(Arg::extension(1_u8))
            }))
            .with(FnProvider::new(|_: &ParamSlot, _: &RequestContext| {
                Some(Arg::extension(2_u8))
            }));

        let arg = providers
            .provide(&ParamSlot::extension::<u8>(), &RequestContext::new())
            .unwrap();
        match arg {
            Arg::Extension(value) => assert_eq!(value.downcast_ref::<u8>(), Some(&1)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(providers.len(), 3);
    }

    #[test]
    fn test_request_scoped_provider() {
        let mut providers = ParameterProviders::new();
        providers.push_request_scoped(|ctx: &RequestContext| Tenant(ctx.principal().log_id()));

        let ctx = RequestContext::new().with_principal(Principal::subject("u1"));
        let arg = providers
            .provide(&ParamSlot::extension::<Tenant>(), &ctx)
            .unwrap();
        match arg {
            Arg::Extension(value) => assert_eq!(
                value.downcast_ref::<Tenant>(),
                Some(&Tenant("subject:u1".to_string()))
            ),
            other => panic!("unexpected {other:?}"),
        }

        assert!(providers.provide(&ParamSlot::Principal, &ctx).is_none());
    }
}
