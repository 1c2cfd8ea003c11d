// Library crate for the codespace collaboration server
// This file exposes the public API for integration tests

pub mod config;
pub mod room;
pub mod shared;
pub mod websockets;

use axum::{routing::get, Router};

// Re-export commonly used types for easier access in tests
pub use config::Config;
pub use room::{RoomError, RoomRegistry, SessionCoordinator};
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientMessage, ConnectionId, ConnectionManager, InMemoryConnectionManager, MessageType,
    WebSocketMessage, WebsocketReceiveHandler,
};

/// Routes served by the collaboration server, without transport layers
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/ws", get(websockets::websocket_handler))
        .route("/stats", get(room::room_stats))
        .fallback(|| async { AppError::NotFound("No such route".to_string()) })
        .with_state(state)
}
