//! HTTP-level integration tests for registration, login, logout, and the
//! access gate.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, get, get_auth, login, post_form, post_json, register, signed_in, TEST_PASSWORD,
};
use sqlx::PgPool;
use tessera_core::session::SessionPolicy;
use tessera_db::repositories::{SessionRepo, UserRepo};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Full flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_login_me_logout_flow(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let registered = register(app.clone(), "Ada", "ada@x.com").await;
    assert_eq!(registered["data"]["email"], "ada@x.com");
    assert_eq!(registered["data"]["name"], "Ada");
    assert!(registered["data"].get("password_hash").is_none());
    assert!(registered["data"].get("password").is_none());

    let token = login(app.clone(), "ada@x.com").await;

    let response = get_auth(app.clone(), "/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["data"]["email"], "ada@x.com");
    assert_eq!(me["data"]["id"], registered["data"]["id"]);
    assert!(me["data"].get("password_hash").is_none());

    let response = get_auth(app.clone(), "/v1/logout", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["message"].is_string());

    let response = get_auth(app, "/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn validated_request_touches_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = signed_in(&app, "Ada", "ada@x.com").await;

    let user = UserRepo::find_by_email(&pool, "ada@x.com").await.unwrap().unwrap();
    let before = SessionRepo::list_for_subject(&pool, user.id).await.unwrap();
    assert_eq!(before.len(), 1);
    assert!(before[0].last_access_at.is_none());

    let request = Request::builder()
        .uri("/v1/me")
        .header("authorization", format!("Bearer {token}"))
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let after = SessionRepo::list_for_subject(&pool, user.id).await.unwrap();
    assert!(after[0].last_access_at.is_some());
    assert_eq!(after[0].ip_address, "203.0.113.9");
}

// ---------------------------------------------------------------------------
// Access gate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_header_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid header authorization");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/v1/users", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bare_token_without_scheme_is_accepted(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signed_in(&app, "Ada", "ada@x.com").await;

    let request = Request::builder()
        .uri("/v1/me")
        .header("authorization", token)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleted_user_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let token = signed_in(&app, "Ada", "ada@x.com").await;

    let user = UserRepo::find_by_email(&pool, "ada@x.com").await.unwrap().unwrap();
    assert!(UserRepo::delete(&pool, user.id).await.unwrap());

    let response = get_auth(app, "/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid user");
}

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_is_409_without_partial_write(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app.clone(), "Ada", "ada@x.com").await;

    let body = serde_json::json!({
        "name": "Someone Else",
        "email": "ada@x.com",
        "password": "another-password",
    });
    let response = post_json(app, "/v1/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");

    let users = UserRepo::list(&pool, 100, 0).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Ada");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_validation_reports_fields(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let body = serde_json::json!({ "email": "not-an-email", "password": "" });
    let response = post_json(app, "/v1/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["name"], "required");
    assert_eq!(json["fields"]["email"], "email");
    assert_eq!(json["fields"]["password"], "required");

    assert!(UserRepo::list(&pool, 10, 0).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_json_is_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/register")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_and_login_accept_form_bodies(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_form(
        app.clone(),
        "/v1/register",
        "name=Ann&email=ann%40x.com&password=secret1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["email"], "ann@x.com");
    assert_eq!(json["data"]["name"], "Ann");

    let response = post_form(app.clone(), "/v1/login", "email=ann%40x.com&password=secret1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token = json["data"]["token"].as_str().unwrap().to_string();

    assert_eq!(get_auth(app, "/v1/me", &token).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn form_bodies_go_through_validation(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_form(app, "/v1/register", "email=not-an-email").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["fields"]["name"], "required");
    assert_eq!(json["fields"]["email"], "email");
    assert_eq!(json["fields"]["password"], "required");

    assert!(UserRepo::list(&pool, 10, 0).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn stored_password_is_argon2_hash(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app, "Ada", "ada@x.com").await;

    let user = UserRepo::find_by_email(&pool, "ada@x.com").await.unwrap().unwrap();
    assert_ne!(user.password_hash, TEST_PASSWORD);
    assert!(user.password_hash.starts_with("$argon2id$"));
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_unknown_email_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "nobody@x.com", "password": TEST_PASSWORD });
    let response = post_json(app, "/v1/login", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "User not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password_is_401(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    register(app.clone(), "Ada", "ada@x.com").await;

    let body = serde_json::json!({ "email": "ada@x.com", "password": "wrong-password" });
    let response = post_json(app, "/v1/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let user = UserRepo::find_by_email(&pool, "ada@x.com").await.unwrap().unwrap();
    let sessions = SessionRepo::list_for_subject(&pool, user.id).await.unwrap();
    assert!(sessions.is_empty(), "failed login must not create a session");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_requires_email_and_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/v1/login", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["fields"]["email"], "required");
    assert_eq!(json["fields"]["password"], "required");
}

// ---------------------------------------------------------------------------
// Session policy
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn single_policy_second_login_invalidates_first(pool: PgPool) {
    let app = common::build_test_app_with_policy(pool, SessionPolicy::Single);
    register(app.clone(), "Ada", "ada@x.com").await;

    let first = login(app.clone(), "ada@x.com").await;
    let second = login(app.clone(), "ada@x.com").await;

    let response = get_auth(app.clone(), "/v1/me", &first).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid token");

    let response = get_auth(app, "/v1/me", &second).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn multiple_policy_tokens_are_independent(pool: PgPool) {
    let app = common::build_test_app_with_policy(pool, SessionPolicy::Multiple);
    register(app.clone(), "Ada", "ada@x.com").await;

    let first = login(app.clone(), "ada@x.com").await;
    let second = login(app.clone(), "ada@x.com").await;

    assert_eq!(get_auth(app.clone(), "/v1/me", &first).await.status(), StatusCode::OK);
    assert_eq!(get_auth(app.clone(), "/v1/me", &second).await.status(), StatusCode::OK);

    let response = get_auth(app.clone(), "/v1/logout", &first).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        get_auth(app.clone(), "/v1/me", &first).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(get_auth(app, "/v1/me", &second).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn single_policy_logout_clears_every_session(pool: PgPool) {
    let app = common::build_test_app_with_policy(pool.clone(), SessionPolicy::Single);
    let token = signed_in(&app, "Ada", "ada@x.com").await;

    let response = get_auth(app, "/v1/logout", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let user = UserRepo::find_by_email(&pool, "ada@x.com").await.unwrap().unwrap();
    assert!(SessionRepo::list_for_subject(&pool, user.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_with_revoked_token_is_rejected_by_gate(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signed_in(&app, "Ada", "ada@x.com").await;

    assert_eq!(get_auth(app.clone(), "/v1/logout", &token).await.status(), StatusCode::OK);
    assert_eq!(
        get_auth(app, "/v1/logout", &token).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
