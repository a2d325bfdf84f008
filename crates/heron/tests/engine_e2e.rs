//! End-to-end engine tests over the fixture task tracker.
//!
//! Requests go through the full path:
//!
//! 1. Base path strip and path parsing
//! 2. Controller selection
//! 3. Repository adapters and method invocation
//! 4. Error mapping into documents

use heron::fixtures::Fixtures;
use heron::prelude::*;
use serde_json::json;

/// Builds an engine over fresh fixtures mounted at `/api`.
fn engine() -> (Engine, Fixtures) {
    let fixtures = Fixtures::new();
    let mut config = HeronConfig::default();
    config.engine.base_path = "/api".to_string();
    config.engine.max_ids_per_request = 5;

    let engine = Engine::builder()
        .config(config)
        .resources(fixtures.definitions())
        .build()
        .unwrap();
    (engine, fixtures)
}

fn task(name: &str) -> RequestBody {
    RequestBody::one(DataBody::new("tasks").with_attribute("name", name))
}

fn user(email: &str) -> RequestBody {
    RequestBody::one(DataBody::new("users").with_attribute("email", email))
}

fn identifiers(response: &Response) -> Vec<ResourceIdentifier> {
    response
        .data()
        .and_then(PrimaryData::as_identifiers)
        .unwrap()
        .to_vec()
}

#[test]
fn test_task_lifecycle() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();

    let created = engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task("x")));
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(
        serde_json::to_value(&created.document).unwrap(),
        json!({ "data": { "type": "tasks", "id": "1", "attributes": { "name": "x" } } })
    );

    let found = engine.dispatch(&Method::GET, "/api/tasks/1", &ctx, None);
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(
        found.data().and_then(PrimaryData::as_resource).unwrap().attribute("name"),
        Some(&json!("x"))
    );

    let deleted = engine.dispatch(&Method::DELETE, "/api/tasks/1", &ctx, None);
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = engine.dispatch(&Method::GET, "/api/tasks/1", &ctx, None);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.errors()[0].code(), Some("RESOURCE_NOT_FOUND"));
}

#[test]
fn test_patch_keeps_untouched_attributes() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();
    engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task("x")));

    let patch = RequestBody::one(DataBody::new("tasks").with_id("1").with_attribute("done", true));
    let patched = engine.dispatch(&Method::PATCH, "/api/tasks/1", &ctx, Some(&patch));

    assert_eq!(patched.status, StatusCode::OK);
    let resource = patched.data().and_then(PrimaryData::as_resource).unwrap();
    assert_eq!(resource.attribute("name"), Some(&json!("x")));
    assert_eq!(resource.attribute("done"), Some(&json!(true)));
}

#[test]
fn test_several_ids_and_limit() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();
    for name in ["a", "b", "c"] {
        engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task(name)));
    }

    let two = engine.dispatch(&Method::GET, "/api/tasks/1,3", &ctx, None);
    assert_eq!(two.data().and_then(PrimaryData::as_resources).unwrap().len(), 2);

    let too_many = engine.dispatch(&Method::GET, "/api/tasks/1,2,3,4,5,6", &ctx, None);
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_validation_error_document() {
    let (engine, _) = engine();
    let body = RequestBody::one(DataBody::new("users").with_attribute("name", "Ann"));
    let response = engine.dispatch(&Method::POST, "/api/users", &RequestContext::new(), Some(&body));

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = &response.errors()[0];
    assert_eq!(error.status(), Some("422"));
    assert_eq!(error.code(), Some("VALIDATION_ERROR"));
    assert_eq!(error.source_pointer(), Some("/data/attributes/email"));
}

#[test]
fn test_request_errors() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();

    let cases = [
        (Method::GET, "/tasks", StatusCode::BAD_REQUEST, "MALFORMED_PATH"),
        (Method::GET, "/api/people", StatusCode::NOT_FOUND, "UNKNOWN_RESOURCE_TYPE"),
        (Method::GET, "/api/tasks/1/owner", StatusCode::NOT_FOUND, "UNKNOWN_RELATIONSHIP"),
        (Method::GET, "/api/tasks/one", StatusCode::BAD_REQUEST, "INVALID_ID"),
        (Method::PUT, "/api/tasks/1", StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
        (Method::POST, "/api/tasks/1", StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED"),
        (Method::POST, "/api/tasks", StatusCode::BAD_REQUEST, "BAD_REQUEST"),
    ];

    for (method, path, status, code) in cases {
        let response = engine.dispatch(&method, path, &ctx, None);
        assert_eq!(response.status, status, "{method} {path}");
        assert_eq!(response.errors()[0].code(), Some(code), "{method} {path}");
    }
}

#[test]
fn test_delete_unset_to_one_relationship() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();
    engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task("x")));

    let response = engine.dispatch(
        &Method::DELETE,
        "/api/tasks/1/relationships/project",
        &ctx,
        None,
    );
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.errors().is_empty());
}

#[test]
fn test_to_one_set_then_cleared() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();
    engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task("x")));
    let project = RequestBody::one(DataBody::new("projects").with_attribute("name", "p"));
    engine.dispatch(&Method::POST, "/api/projects", &ctx, Some(&project));

    let link = RequestBody::one(DataBody::identifier("projects", "1"));
    let linked = engine.dispatch(
        &Method::PATCH,
        "/api/tasks/1/relationships/project",
        &ctx,
        Some(&link),
    );
    assert_eq!(linked.status, StatusCode::NO_CONTENT);

    let field = engine.dispatch(&Method::GET, "/api/tasks/1/project", &ctx, None);
    let target = field.data().and_then(PrimaryData::as_resource).unwrap();
    assert_eq!(target.attribute("name"), Some(&json!("p")));

    engine.dispatch(
        &Method::PATCH,
        "/api/tasks/1/relationships/project",
        &ctx,
        Some(&RequestBody::null()),
    );
    let cleared = engine.dispatch(&Method::GET, "/api/tasks/1/links/project", &ctx, None);
    assert_eq!(serde_json::to_value(&cleared.document).unwrap(), json!({ "data": null }));
}

#[test]
fn test_add_then_remove_assignees() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();
    engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task("x")));
    engine.dispatch(&Method::POST, "/api/users", &ctx, Some(&user("a@example.com")));
    engine.dispatch(&Method::POST, "/api/users", &ctx, Some(&user("b@example.com")));

    let path = "/api/tasks/1/relationships/assignees";
    let both = RequestBody::many(vec![
        DataBody::identifier("users", "users-1"),
        DataBody::identifier("users", "users-2"),
    ]);

    let added = engine.dispatch(&Method::POST, path, &ctx, Some(&both));
    assert_eq!(added.status, StatusCode::NO_CONTENT);
    assert_eq!(
        identifiers(&engine.dispatch(&Method::GET, path, &ctx, None)),
        vec![
            ResourceIdentifier::new("users", "users-1"),
            ResourceIdentifier::new("users", "users-2"),
        ]
    );

    // Adding again does not duplicate.
    engine.dispatch(&Method::POST, path, &ctx, Some(&both));
    assert_eq!(identifiers(&engine.dispatch(&Method::GET, path, &ctx, None)).len(), 2);

    let removed = engine.dispatch(&Method::DELETE, path, &ctx, Some(&both));
    assert_eq!(removed.status, StatusCode::NO_CONTENT);
    assert!(identifiers(&engine.dispatch(&Method::GET, path, &ctx, None)).is_empty());
}

#[test]
fn test_create_with_relationships() {
    let (engine, fixtures) = engine();
    let ctx = RequestContext::new();
    engine.dispatch(&Method::POST, "/api/users", &ctx, Some(&user("a@example.com")));

    let body = RequestBody::one(
        DataBody::new("tasks")
            .with_attribute("name", "x")
            .with_relationship(
                "assignees",
                Linkage::ToMany(vec![ResourceIdentifier::new("users", "users-1")]),
            ),
    );
    let created = engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&body));
    assert_eq!(created.status, StatusCode::CREATED);

    let assignees = engine.dispatch(&Method::GET, "/api/tasks/1/assignees", &ctx, None);
    let users = assignees.data().and_then(PrimaryData::as_resources).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].attribute("email"), Some(&json!("a@example.com")));
    assert_eq!(fixtures.tasks.len(), 1);
}

#[test]
fn test_relationship_post_to_missing_source() {
    let (engine, _) = engine();
    let body = RequestBody::many(vec![DataBody::identifier("users", "users-1")]);
    let response = engine.dispatch(
        &Method::POST,
        "/api/tasks/7/relationships/assignees",
        &RequestContext::new(),
        Some(&body),
    );
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_invalid_body_relationship_stores_nothing() {
    let (engine, fixtures) = engine();
    let ctx = RequestContext::new();
    let body = RequestBody::one(
        DataBody::new("tasks")
            .with_attribute("name", "x")
            .with_relationship(
                "project",
                Linkage::ToOne(Some(ResourceIdentifier::new("projects", "abc"))),
            ),
    );

    let created = engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&body));
    assert_eq!(created.status, StatusCode::BAD_REQUEST);
    assert_eq!(created.errors()[0].code(), Some("INVALID_ID"));
    assert!(fixtures.tasks.is_empty());

    engine.dispatch(&Method::POST, "/api/tasks", &ctx, Some(&task("x")));
    let patch = RequestBody::one(
        DataBody::new("tasks")
            .with_attribute("name", "y")
            .with_relationship(
                "project",
                Linkage::ToOne(Some(ResourceIdentifier::new("projects", "abc"))),
            ),
    );
    let patched = engine.dispatch(&Method::PATCH, "/api/tasks/1", &ctx, Some(&patch));
    assert_eq!(patched.status, StatusCode::BAD_REQUEST);

    let found = engine.dispatch(&Method::GET, "/api/tasks/1", &ctx, None);
    assert_eq!(
        found.data().and_then(PrimaryData::as_resource).unwrap().attribute("name"),
        Some(&json!("x"))
    );
}

#[test]
fn test_relationship_writes_to_missing_source() {
    let (engine, _) = engine();
    let ctx = RequestContext::new();
    let path = "/api/tasks/999/relationships/project";
    let link = RequestBody::one(DataBody::identifier("projects", "1"));

    for (method, body) in [
        (Method::POST, Some(&link)),
        (Method::PATCH, Some(&link)),
        (Method::DELETE, None),
    ] {
        let response = engine.dispatch(&method, path, &ctx, body);
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(response.errors()[0].code(), Some("RESOURCE_NOT_FOUND"), "{method}");
    }
}

#[test]
fn test_largest_client_id_rejected() {
    let (engine, fixtures) = engine();
    let body = RequestBody::one(
        DataBody::new("tasks")
            .with_id(i64::MAX.to_string())
            .with_attribute("name", "x"),
    );

    let response = engine.dispatch(&Method::POST, "/api/tasks", &RequestContext::new(), Some(&body));
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(fixtures.tasks.is_empty());
}
