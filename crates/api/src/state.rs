use std::sync::Arc;

use crate::auth::Sessions;
use crate::config::ServerConfig;
use crate::notifications::Mailer;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tessera_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session issuance, validation, and revocation.
    pub sessions: Arc<Sessions>,
    /// Outbound email.
    pub mailer: Arc<Mailer>,
    /// WebSocket room manager.
    pub ws_manager: Arc<WsManager>,
}
