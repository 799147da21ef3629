//! WebSocket rooms.
//!
//! Clients join a named room with `GET /v1/ws?room=NAME`; every frame a
//! client sends is relayed to the other members of that room.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
