use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

use user_data_api::{
    build_router, build_state,
    core::middleware::REQUEST_ID_HEADER,
    infrastructure::config::{DatabaseConfig, ServerConfig, StorageBackend},
};

fn memory_app() -> Router {
    let database = DatabaseConfig {
        backend: StorageBackend::Memory,
        ..DatabaseConfig::default()
    };
    build_router(build_state(&database), &ServerConfig::default())
}

async fn post_json(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    read_json(response).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    read_json(response).await
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn add_user_then_list() {
    let app = memory_app();

    let (status, body) = post_json(
        &app,
        "/api/add_user",
        json!({"name": "Alice", "email": "a@x.com", "age": 30}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "User added successfully"}));

    let (status, body) = get(&app, "/api/get_users").await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert!(users
        .iter()
        .any(|u| u["name"] == "Alice" && u["email"] == "a@x.com" && u["age"] == 30));
}

#[tokio::test]
async fn empty_table_returns_empty_array() {
    let app = memory_app();

    let (status, body) = get(&app, "/api/get_users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn missing_field_is_rejected_before_storage() {
    let app = memory_app();

    let (status, body) = post_json(
        &app,
        "/api/add_user",
        json!({"name": "Alice", "email": "a@x.com"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
    assert!(body["message"].as_str().unwrap().contains("age"));

    let (_, body) = get(&app, "/api/get_users").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() {
    let app = memory_app();

    let (status, _) = post_json(&app, "/api/add_user", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        "/api/add_user",
        json!({"name": "Alice", "email": "a@x.com", "age": "thirty"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &app,
        "/api/add_user",
        json!({"name": "Alice", "email": "a@x.com", "age": null}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn field_values_are_left_to_storage() {
    let app = memory_app();

    for payload in [
        json!({"name": "", "email": "a@x.com", "age": 30}),
        json!({"name": "Alice", "email": "alice", "age": 30}),
        json!({"name": "Alice", "email": "a@x.com", "age": 200}),
        json!({"name": "Alice", "email": "a@x.com", "age": 30.5}),
    ] {
        let (status, _) = post_json(&app, "/api/add_user", payload.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "rejected {}", payload);
    }

    let (_, body) = get(&app, "/api/get_users").await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 4);
    assert!(users.iter().any(|u| u["age"] == 30.5));
}

#[tokio::test]
async fn sequential_inserts_are_independent_rows() {
    let app = memory_app();

    for (name, email, age) in [("Alice", "a@x.com", 30), ("Bob", "b@x.com", 25)] {
        let (status, _) = post_json(
            &app,
            "/api/add_user",
            json!({"name": name, "email": email, "age": age}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = get(&app, "/api/get_users").await;
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u["name"] == "Alice" && u["age"] == 30));
    assert!(users.iter().any(|u| u["name"] == "Bob" && u["age"] == 25));
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let app = memory_app();
    post_json(
        &app,
        "/api/add_user",
        json!({"name": "Alice", "email": "a@x.com", "age": 30}).to_string(),
    )
    .await;

    let (_, first) = get(&app, "/api/get_users").await;
    let (_, second) = get(&app, "/api/get_users").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = memory_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/get_users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn health_check_with_memory_backend() {
    let app = memory_app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unreachable_database_fails_with_server_error() {
    // 端口 1 上没有 MySQL，连接池在超时内放弃
    let database = DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        acquire_timeout_seconds: 1,
        ..DatabaseConfig::default()
    };
    let server = ServerConfig {
        request_timeout_seconds: 10,
        ..ServerConfig::default()
    };
    let app = build_router(build_state(&database), &server);

    let (status, _) = get(&app, "/api/get_users").await;
    assert!(status.is_server_error(), "unexpected status {}", status);

    let (status, _) = post_json(
        &app,
        "/api/add_user",
        json!({"name": "Alice", "email": "a@x.com", "age": 30}).to_string(),
    )
    .await;
    assert!(status.is_server_error(), "unexpected status {}", status);
}
