#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tessera_api::auth::jwt::{TokenCodec, TokenConfig};
use tessera_api::auth::session::SessionManager;
use tessera_api::auth::store::PgStore;
use tessera_api::config::ServerConfig;
use tessera_api::notifications::Mailer;
use tessera_api::router::build_app_router;
use tessera_api::state::AppState;
use tessera_api::ws::WsManager;
use tessera_core::session::SessionPolicy;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Build a test `ServerConfig` with safe defaults and mail disabled.
pub fn test_config(policy: SessionPolicy) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        token: TokenConfig {
            secret: TEST_SECRET.to_string(),
        },
        session_policy: policy,
        mail: None,
    }
}

/// Full application router under the single-session policy.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_policy(pool, SessionPolicy::Single)
}

/// Full application router, same middleware stack as `main.rs`.
pub fn build_test_app_with_policy(pool: PgPool, policy: SessionPolicy) -> Router {
    let config = test_config(policy);
    let sessions = SessionManager::new(
        PgStore::new(pool.clone()),
        TokenCodec::new(&config.token),
        policy,
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        sessions: Arc::new(sessions),
        mailer: Arc::new(Mailer::disabled()),
        ws_manager: Arc::new(WsManager::new()),
    };

    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

/// POST an `application/x-www-form-urlencoded` body (already encoded).
pub async fn post_form(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Flow helpers
// ---------------------------------------------------------------------------

/// Register `email` through the API with [`TEST_PASSWORD`].
pub async fn register(app: Router, name: &str, email: &str) -> serde_json::Value {
    let body = serde_json::json!({ "name": name, "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/v1/register", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

/// Log in through the API and return the bearer token.
pub async fn login(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/v1/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["data"]["token"].as_str().unwrap().to_string()
}

/// Register and log in one user; returns the bearer token.
pub async fn signed_in(app: &Router, name: &str, email: &str) -> String {
    register(app.clone(), name, email).await;
    login(app.clone(), email).await
}
