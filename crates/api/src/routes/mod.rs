pub mod auth;
pub mod health;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::middleware::auth::require_session;
use crate::state::AppState;
use crate::ws;

/// Build the `/v1` route tree.
///
/// ```text
/// /login                  login (public)
/// /register               register (public)
///
/// /logout                 revoke session(s)
/// /me                     caller identity
/// /users                  list, create
/// /users/{id}             get, update, delete
/// /ws?room=NAME           room broadcast WebSocket
/// ```
///
/// Everything below the public pair runs behind [`require_session`]. The
/// gate is installed with `route_layer`, so unmatched paths still 404
/// instead of 401.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::session_router())
        .merge(users::router())
        .route("/ws", get(ws::ws_handler))
        .route_layer(axum::middleware::from_fn_with_state(state, require_session));

    Router::new().merge(auth::public_router()).merge(protected)
}
