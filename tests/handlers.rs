mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

const SYSTEM_MESSAGE: &str =
    "There was a problem with the system. If the problem persists contact the administrator.";

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_member(app: &Router, name: &str, email: &str, age: i64) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/members",
        Some(json!({"name": name, "email": email, "age": age})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn health() {
    let app = common::members_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn create_assigns_key_and_timestamps() {
    let app = common::members_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/members",
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "age": 36,
            "passwordHash": "secret",
            "shoeSize": 9
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert_eq!(data["id"], 1);
    assert_eq!(data["name"], "Ada");
    assert_eq!(data["deleted"], false);
    assert!(data["created"].as_i64().unwrap() > 0);
    assert_eq!(data["created"], data["updated"]);
    assert!(data.get("passwordHash").is_none());
    assert!(data.get("password_hash").is_none());
}

#[tokio::test]
async fn create_reports_failing_fields() {
    let app = common::members_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/members",
        Some(json!({"name": "", "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["message"], "members did not pass validation.");
    assert_eq!(
        body["error"]["details"],
        json!({
            "email": "email did not pass validation.",
            "name": "name did not pass validation."
        })
    );
}

#[tokio::test]
async fn create_rejects_mistyped_and_malformed_bodies() {
    let app = common::members_app();
    let (status, body) = send(&app, Method::POST, "/api/v1/members", Some(json!({"age": "old"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "members json could not be parsed.");

    let req = Request::post("/api/v1/members")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/api/v1/members", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_orders_and_projects() {
    let app = common::members_app();
    create_member(&app, "Ada", "ada@example.com", 36).await;
    create_member(&app, "Grace", "grace@example.com", 45).await;
    create_member(&app, "Linus", "linus@example.com", 12).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/members?gt-age=20&q-order=desc-age&q-fields=name&madeUp=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "data": [{"id": 2, "name": "Grace"}, {"id": 1, "name": "Ada"}],
            "meta": {"count": 2}
        })
    );

    let (_, body) = send(&app, Method::GET, "/api/v1/members?in-name=Ada,Linus&q-limit=1&q-offset=1", None).await;
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["name"], "Linus");
}

#[tokio::test]
async fn list_rejects_bad_order_and_literals() {
    let app = common::members_app();
    let (status, body) = send(&app, Method::GET, "/api/v1/members?q-order=desc-times", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = send(&app, Method::GET, "/api/v1/members?gt-age=old", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_merges_only_mergeable_fields() {
    let app = common::members_app();
    let created = create_member(&app, "Ada", "ada@example.com", 36).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/members/1",
        Some(json!({"id": 99, "name": "Ada King", "email": "ada@example.com", "age": 37, "created": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["id"], 1);
    assert_eq!(data["name"], "Ada King");
    assert_eq!(data["age"], 37);
    assert_eq!(data["created"], created["created"]);
    assert!(data["updated"].as_i64().unwrap() >= created["updated"].as_i64().unwrap());

    let (status, body) = send(&app, Method::GET, "/api/v1/members/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ada King");
}

#[tokio::test]
async fn update_validates_merged_record() {
    let app = common::members_app();
    create_member(&app, "Ada", "ada@example.com", 36).await;
    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/v1/members/1",
        Some(json!({"name": "Ada", "email": "", "age": 36})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"], json!({"email": "email did not pass validation."}));
}

#[tokio::test]
async fn delete_flags_the_record() {
    let app = common::members_app();
    create_member(&app, "Ada", "ada@example.com", 36).await;

    let (status, body) = send(&app, Method::DELETE, "/api/v1/members/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, body) = send(&app, Method::GET, "/api/v1/members/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (_, body) = send(&app, Method::GET, "/api/v1/members?deleted=true", None).await;
    assert_eq!(body["meta"]["count"], 1);
}

#[tokio::test]
async fn missing_records_and_resources() {
    let app = common::members_app();
    let (status, body) = send(&app, Method::GET, "/api/v1/members/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Could not find members.");

    let (status, _) = send(&app, Method::PUT, "/api/v1/members/42", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/v1/members/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/v1/widgets", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn disallowed_operation_is_a_client_error() {
    let app = common::members_app();
    let (status, _) = send(&app, Method::DELETE, "/api/v1/notes/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fatal_rule_is_a_server_error() {
    let app = common::members_app();
    let (status, body) = send(&app, Method::POST, "/api/v1/notes", Some(json!({"tags": []}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], SYSTEM_MESSAGE);

    let (status, _) = send(&app, Method::POST, "/api/v1/notes", Some(json!({"tags": ["rust"]}))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = resource_sdk::app(common::members_state(), "/api/v1", 64);
    let body = json!({"name": "x".repeat(200), "email": "ada@example.com"}).to_string();
    let req = Request::post("/api/v1/members")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn odd_query_strings_still_get_json_envelopes() {
    let app = common::members_app();
    create_member(&app, "Ada", "ada@example.com", 36).await;
    let (status, body) = send(&app, Method::GET, "/api/v1/members?name&%ZZ=1&=x", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 0);
}

#[tokio::test]
async fn cors_headers_are_applied() {
    let app = common::members_app();
    let req = Request::get("/health")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
