//! Route definitions for credentials and the caller's own session.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes reachable without a token.
///
/// ```text
/// POST /login     -> login
/// POST /register  -> register
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
}

/// Routes that need a live session.
///
/// ```text
/// GET /logout  -> logout
/// GET /me      -> me
/// ```
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/logout", get(auth::logout))
        .route("/me", get(auth::me))
}
