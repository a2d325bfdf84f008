//! Integration tests for user-written repositories: partial capability sets,
//! extension parameters, principals and domain error mapping.

use heron::prelude::*;
use heron::repository::{Arg, FnProvider};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A read-only repository: find-one only.
struct Archive;

impl Repository for Archive {
    fn name(&self) -> &str {
        "archive"
    }

    fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
        vec![RepositoryMethod::new(Capability::FindOne, [ParamSlot::Id], |args| {
            let id = args.id(0)?.clone();
            Ok(Returned::Resource(
                Resource::new("archive").with_id(id).with_attribute("frozen", true),
            ))
        })]
    }
}

/// Tenant identifier supplied per request by a parameter provider.
#[derive(Debug, Clone, PartialEq)]
struct Tenant(String);

/// Counts reads; served from the service container.
#[derive(Default)]
struct ReadCounter(AtomicUsize);

/// Notes scoped by tenant and principal.
struct Notes;

impl Repository for Notes {
    fn name(&self) -> &str {
        "notes"
    }

    fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
        vec![RepositoryMethod::new(
            Capability::FindAll,
            [
                ParamSlot::RequestParams,
                ParamSlot::Principal,
                ParamSlot::extension::<Tenant>(),
                ParamSlot::extension::<ReadCounter>(),
            ],
            |args| {
                let reader = args.principal(1)?.log_id();
                let tenant = args.extension::<Tenant>(2)?;
                let counter = args.extension::<ReadCounter>(3)?;
                counter.0.fetch_add(1, Ordering::SeqCst);

                Ok(Returned::Resources(vec![Resource::new("notes")
                    .with_id(1_i64)
                    .with_attribute("tenant", tenant.0.clone())
                    .with_attribute("reader", reader)]))
            },
        )]
    }
}

/// A domain failure raised by a repository.
#[derive(Debug, thiserror::Error)]
#[error("quota exceeded for {0}")]
struct QuotaExceeded(String);

/// Rejects every save with a domain error, and fails reads opaquely.
struct Quotas;

impl Repository for Quotas {
    fn name(&self) -> &str {
        "quotas"
    }

    fn methods(self: Arc<Self>) -> Vec<RepositoryMethod> {
        vec![
            RepositoryMethod::new(Capability::Save, [ParamSlot::Entity], |_| {
                Err(HeronError::handler(
                    "save rejected",
                    QuotaExceeded("quotas".to_string()),
                ))
            }),
            RepositoryMethod::new(Capability::FindAll, Vec::<ParamSlot>::new(), |_| {
                Err(HeronError::handler(
                    "storage offline",
                    anyhow::anyhow!("connection refused to secret-host"),
                ))
            }),
        ]
    }
}

fn tenant_provider() -> impl ParameterProvider {
    FnProvider::new(|slot: &ParamSlot, ctx: &RequestContext| {
        (*slot == ParamSlot::extension::<Tenant>())
            .then(|| ctx.params().get("tenant"))
            .flatten()
            .map(|tenant| Arg::extension(Tenant(tenant.to_string())))
    })
}

#[test]
fn test_missing_capability_fails_every_time() {
    let engine = Engine::builder()
        .resource(ResourceDefinition::builder("archive").repository(Arc::new(Archive)))
        .build()
        .unwrap();
    let ctx = RequestContext::new();

    let found = engine.dispatch(&Method::GET, "/archive/4", &ctx, None);
    assert_eq!(found.status, StatusCode::OK);

    for _ in 0..2 {
        let err = engine
            .try_dispatch(&Method::DELETE, "/archive/4", &ctx, None)
            .unwrap_err();
        assert!(matches!(
            err,
            HeronError::CapabilityNotDeclared {
                capability: Capability::Delete,
                ..
            }
        ));
    }

    let response = engine.dispatch(&Method::GET, "/archive", &ctx, None);
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.errors()[0].code(), Some("CAPABILITY_NOT_DECLARED"));
    assert!(response.errors()[0].id().is_some());
}

#[test]
fn test_extension_parameters() {
    let counter = Arc::new(ReadCounter::default());
    let mut container = Container::new();
    container.register(counter.clone());

    let engine = Engine::builder()
        .resource(ResourceDefinition::builder("notes").repository(Arc::new(Notes)))
        .provider(tenant_provider())
        .provider(container)
        .build()
        .unwrap();

    let ctx = RequestContext::new()
        .with_params(RequestParams::new().with_query("tenant", "acme"))
        .with_principal(Principal::subject("u1"));
    let response = engine.dispatch(&Method::GET, "/notes", &ctx, None);

    assert_eq!(response.status, StatusCode::OK);
    let note = &response.data().and_then(PrimaryData::as_resources).unwrap()[0];
    assert_eq!(note.attribute("tenant").unwrap(), "acme");
    assert!(note.attribute("reader").unwrap().as_str().unwrap().contains("u1"));
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unresolved_extension_parameter() {
    let engine = Engine::builder()
        .resource(ResourceDefinition::builder("notes").repository(Arc::new(Notes)))
        .provider(tenant_provider())
        .build()
        .unwrap();

    // No tenant in the request and no container: neither slot is served.
    let err = engine
        .try_dispatch(&Method::GET, "/notes", &RequestContext::new(), None)
        .unwrap_err();
    assert!(matches!(err, HeronError::UnresolvedParameter { position: 2, .. }));
}

#[test]
fn test_domain_errors_are_mapped() {
    let engine = Engine::builder()
        .resource(ResourceDefinition::builder("quotas").repository(Arc::new(Quotas)))
        .on_handler_error(|error: &QuotaExceeded| {
            ErrorResponse::single(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorData::builder()
                    .status("429")
                    .code("QUOTA_EXCEEDED")
                    .detail(error.to_string())
                    .build(),
            )
        })
        .build()
        .unwrap();
    let ctx = RequestContext::new();

    let body = RequestBody::one(DataBody::new("quotas"));
    let rejected = engine.dispatch(&Method::POST, "/quotas", &ctx, Some(&body));
    assert_eq!(rejected.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(rejected.errors()[0].code(), Some("QUOTA_EXCEEDED"));

    // Unmapped handler failures stay opaque.
    let failed = engine.dispatch(&Method::GET, "/quotas", &ctx, None);
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(failed.errors()[0].detail().is_none());
}

#[test]
fn test_internal_errors_exposed_in_development() {
    let engine = Engine::builder()
        .config(HeronConfig::development())
        .resource(ResourceDefinition::builder("quotas").repository(Arc::new(Quotas)))
        .build()
        .unwrap();

    let failed = engine.dispatch(&Method::GET, "/quotas", &RequestContext::new(), None);
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(failed.errors()[0].detail().unwrap().contains("storage offline"));
}
