use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::room::{RoomError, SessionCoordinator};
use crate::shared::AppState;
use crate::websockets::messages::{ClientMessage, ProtocolError, WebSocketMessage};

use super::socket::{Connection, MessageHandler};
use super::{ConnectionId, ConnectionManager};

/// Message handler for receiving WebSocket messages from the client
pub struct WebsocketReceiveHandler {
    coordinator: Arc<SessionCoordinator>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WebsocketReceiveHandler {
    pub fn new(
        coordinator: Arc<SessionCoordinator>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            coordinator,
            connection_manager,
        }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: ConnectionId, message: String) {
        debug!(
            connection_id = %connection_id,
            len = message.len(),
            "Received message"
        );

        match ClientMessage::parse(&message) {
            Ok(client_message) => self.coordinator.handle(connection_id, client_message).await,
            Err(ProtocolError::MalformedJoin(e)) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Malformed joinRoom payload"
                );
                let reply = WebSocketMessage::error(&RoomError::InvalidCredentials);
                if let Ok(json) = serde_json::to_string(&reply) {
                    self.connection_manager
                        .send_to_connection(&connection_id, &json)
                        .await;
                }
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
            }
        }
    }
}

/// WebSocket endpoint; every upgraded socket gets a fresh connection id
/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id: ConnectionId = Uuid::new_v4();
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id, outbound_sender)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(
        app_state.coordinator.clone(),
        app_state.connection_manager.clone(),
    ));

    let connection = Connection::new(
        connection_id,
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: stop delivering to this socket, then release its room membership
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
    app_state.coordinator.disconnect(connection_id).await;

    info!(connection_id = %connection_id, "WebSocket disconnect handled");
}
