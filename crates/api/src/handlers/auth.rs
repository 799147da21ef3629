//! Handlers for registration, login, logout, and the caller's identity.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tessera_core::error::CoreError;
use tessera_core::session::ISSUER_USER;
use tessera_db::models::user::{CreateUser, UserResponse};
use tessera_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::error::{AppError, AppResult};
use crate::extract::{ClientIp, ValidatedBody};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"), email(code = "email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

/// Request body for `POST /v1/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"), email(code = "email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/register
///
/// Create an account. The user row is committed before the welcome email is
/// queued; a duplicate email is a 409 and leaves nothing behind.
pub async fn register(
    State(state): State<AppState>,
    ValidatedBody(input): ValidatedBody<RegisterRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let password_hash = hash_password_blocking(input.password)
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::create_in(
        &mut tx,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, "User registered");

    let mailer = Arc::clone(&state.mailer);
    let to = user.email.clone();
    tokio::spawn(async move {
        mailer.send_welcome_email(&to).await;
    });

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /v1/login
///
/// Exchange email + password for a bearer token. An unknown email is a 404,
/// a wrong password a 401.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedBody(input): ValidatedBody<LoginRequest>,
) -> AppResult<Json<DataResponse<TokenResponse>>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or(AppError::Core(CoreError::Missing { entity: "User" }))?;

    let password_valid = verify_password_blocking(input.password, user.password_hash.clone())
        .await
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let token = state.sessions.issue(user.id, ISSUER_USER, &ip).await?;

    Ok(Json(DataResponse {
        data: TokenResponse { token },
    }))
}

/// GET /v1/logout
///
/// Revoke the caller's session, or all of their sessions under the
/// single-session policy. Repeating a logout is harmless.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let revoked = state.sessions.revoke(&auth.token).await?;
    tracing::debug!(
        user_id = %auth.user.id,
        sessions_deleted = revoked.sessions_deleted,
        "User logged out"
    );
    Ok(Json(MessageResponse::new("User has logged out")))
}

/// GET /v1/me
pub async fn me(auth: AuthUser) -> Json<DataResponse<UserResponse>> {
    Json(DataResponse {
        data: UserResponse::from(auth.user),
    })
}
