//! Bearer-token access gate.
//!
//! [`require_session`] runs in front of every protected route. It validates
//! the presented token through the session manager (which also touches the
//! session) and stores the resolved identity in request extensions, where
//! handlers pick it up with the [`AuthUser`] extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tessera_core::types::DbId;
use tessera_db::models::user::User;

use crate::auth::session::{Authenticated, SessionError};
use crate::error::AppError;
use crate::extract::client_ip;
use crate::state::AppState;

/// Authenticated caller, attached by [`require_session`].
///
/// Use this as an extractor parameter in any handler mounted behind the gate:
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %auth.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user the session belongs to.
    pub user: User,
    /// The session that authorized this request.
    pub session_id: DbId,
    /// The raw bearer token, needed again for revocation.
    pub token: String,
}

/// Middleware: reject the request unless it carries a live session token.
///
/// Mount with `route_layer(axum::middleware::from_fn_with_state(state, require_session))`.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(SessionError::MissingHeader)?;
    let ip = client_ip(req.headers(), req.extensions());

    let Authenticated { user, session } = state
        .sessions
        .validate(&token, &ip)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "Rejected bearer token"))?;

    req.extensions_mut().insert(AuthUser {
        user,
        session_id: session.id,
        token,
    });

    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization`. A `Bearer ` scheme is optional;
/// an absent or blank header yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match raw.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if raw.eq_ignore_ascii_case("bearer") => "",
        _ => raw,
    };

    (!token.is_empty()).then(|| token.to_string())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Session(SessionError::MissingHeader))
    }
}
