#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use assetreg_api::auth::jwt::{Claims, JwtConfig};
use assetreg_api::config::{LogFormat, ServerConfig};
use assetreg_api::reference::ReferenceData;
use assetreg_api::router::build_app_router;
use assetreg_api::state::AppState;
use assetreg_api::store::MemoryAssetRepository;
use assetreg_events::EventBus;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            leeway_secs: 0,
        },
        reference_data_path: None,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over an empty in-memory register and
/// the built-in reference data.
///
/// Clones of the returned router share the same state, so one test can
/// issue several requests against the same register.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        repo: Arc::new(MemoryAssetRepository::new()),
        reference: Arc::new(ReferenceData::seed()),
        event_bus: Arc::new(EventBus::default()),
    };
    build_app_router(state, &config).unwrap()
}

/// A valid token for `role`, expiring in ten minutes.
pub fn token(role: &str) -> String {
    let claims = Claims {
        sub: format!("{role}-user"),
        role: role.to_string(),
        exp: chrono::Utc::now().timestamp() + 600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn delete_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: Value,
) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), Some(body)).await
}

/// Create-asset body for a Secretariat laptop in building A, type 001.
pub fn laptop() -> Value {
    json!({
        "department": "secretariat",
        "category": "fixed",
        "year": 2023,
        "building": "A",
        "asset_type_code": "1",
        "name": "Laptop Dell XPS",
        "brand": "Dell",
        "acquisition_value": 15000000.0,
        "depreciation_group_id": 1
    })
}

/// Create an asset as admin and return the stored record.
pub async fn create_asset(app: &Router, body: Value) -> Value {
    let response = post_json_auth(app, "/api/v1/assets", &token("admin"), body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
