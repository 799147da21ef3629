use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tessera_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::RoomParams;
use crate::state::AppState;
use crate::ws::manager::WsManager;

/// GET /v1/ws?room=NAME
///
/// Upgrade to a WebSocket joined to `room`. The room is required; a missing
/// or blank value is rejected with 400 before the upgrade is attempted.
pub async fn ws_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<RoomParams>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> AppResult<Response> {
    let room = params
        .room
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter 'room' is required".into()))?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let user_id = auth.user.id;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager, room, user_id)))
}

/// Drive one joined socket until either side closes.
///
/// A sender task drains the manager channel into the sink while the current
/// task relays inbound text and binary frames to the rest of the room.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>, room: String, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let mut rx = ws_manager.add(conn_id.clone(), room.clone(), user_id).await;
    let members = ws_manager.room_size(&room).await;
    tracing::info!(conn_id = %conn_id, room = %room, %user_id, members, "WebSocket joined room");

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(msg @ (Message::Text(_) | Message::Binary(_))) => {
                let delivered = ws_manager.broadcast_to_room(&room, msg, &conn_id).await;
                tracing::trace!(conn_id = %conn_id, room = %room, delivered, "Relayed frame");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, room = %room, "WebSocket left room");
}
