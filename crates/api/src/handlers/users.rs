//! Handlers for the `/users` resource.
//!
//! Every route here sits behind the access gate; any authenticated caller
//! may manage any account.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tessera_core::error::CoreError;
use tessera_core::types::DbId;
use tessera_db::models::user::{CreateUser, UpdateUser, UserResponse};
use tessera_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::password::hash_password_blocking;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedBody;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
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

/// Request body for `PATCH /v1/users/{id}`. Absent fields are left as is.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, code = "required"))]
    pub name: Option<String>,
    #[validate(email(code = "email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, code = "required"))]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /v1/users
///
/// One page of users, newest first. See [`PageParams`] for clamping.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PagedResponse<UserResponse>>> {
    let page = params.page();
    let users = UserRepo::list(&state.pool, page.limit(), page.offset()).await?;

    Ok(Json(PagedResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        page: page.page,
        page_size: page.page_size,
    }))
}

/// POST /v1/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedBody(input): ValidatedBody<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let password_hash = hash_password_blocking(input.password)
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(actor = %auth.user.id, user_id = %user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// GET /v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// PATCH /v1/users/{id}
///
/// Partial update. A supplied password is re-hashed before it is stored.
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    ValidatedBody(input): ValidatedBody<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let password_hash = match input.password {
        Some(password) => Some(
            hash_password_blocking(password)
                .await
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
        ),
        None => None,
    };

    let update = UpdateUser {
        name: input.name,
        email: input.email,
        password_hash,
    };

    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(actor = %auth.user.id, user_id = %id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// DELETE /v1/users/{id}
///
/// Hard delete. Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    tracing::info!(actor = %auth.user.id, user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
