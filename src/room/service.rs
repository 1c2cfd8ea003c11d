use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::registry::{Dispatch, RoomRegistry};
use crate::websockets::{
    messages::{ClientMessage, RoomCredentials},
    ConnectionId, ConnectionManager,
};

/// Snapshot of live state for the stats endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomStats {
    pub rooms: usize,
    pub connections: usize,
}

/// Serializes every inbound event through the registry.
///
/// The registry lock is held while the resulting dispatches are handed to the
/// connection manager, so members of a room observe updates in mutation order.
pub struct SessionCoordinator {
    registry: Mutex<RoomRegistry>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl SessionCoordinator {
    pub fn new(registry: RoomRegistry, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            registry: Mutex::new(registry),
            connection_manager,
        }
    }

    /// Route a decoded client event to the matching operation
    pub async fn handle(&self, connection_id: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::CreateRoom => self.create_room(connection_id).await,
            ClientMessage::JoinRoom(credentials) => self.join_room(connection_id, credentials).await,
            ClientMessage::LeaveRoom(credentials) => {
                self.leave_room(connection_id, credentials).await
            }
            ClientMessage::CodeChange(new_code) => self.change_content(connection_id, new_code).await,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_room(&self, connection_id: ConnectionId) {
        let mut registry = self.registry.lock().await;
        let dispatches = registry.create_room(connection_id);
        self.deliver(dispatches).await;
    }

    #[instrument(skip(self, credentials), fields(room_id = %credentials.room_id))]
    pub async fn join_room(&self, connection_id: ConnectionId, credentials: RoomCredentials) {
        let mut registry = self.registry.lock().await;
        let dispatches = registry.join_room(connection_id, &credentials);
        self.deliver(dispatches).await;
    }

    #[instrument(skip(self, credentials), fields(room_id = %credentials.room_id))]
    pub async fn leave_room(&self, connection_id: ConnectionId, credentials: RoomCredentials) {
        let mut registry = self.registry.lock().await;
        let dispatches = registry.leave_room(connection_id, &credentials);
        self.deliver(dispatches).await;
    }

    #[instrument(skip(self, new_code), fields(len = new_code.len()))]
    pub async fn change_content(&self, connection_id: ConnectionId, new_code: String) {
        let mut registry = self.registry.lock().await;
        let dispatches = registry.change_content(connection_id, new_code);
        self.deliver(dispatches).await;
    }

    #[instrument(skip(self))]
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut registry = self.registry.lock().await;
        let dispatches = registry.disconnect(connection_id);
        self.deliver(dispatches).await;
    }

    /// Remove rooms that were created but never joined within `ttl`
    #[instrument(skip(self))]
    pub async fn reap_unclaimed_rooms(&self, ttl: chrono::Duration) -> usize {
        let mut registry = self.registry.lock().await;
        let dispatches = registry.reap_unclaimed(chrono::Utc::now(), ttl);
        let reaped = dispatches.len();
        self.deliver(dispatches).await;
        reaped
    }

    pub async fn stats(&self) -> RoomStats {
        let rooms = self.registry.lock().await.room_count();
        RoomStats {
            rooms,
            connections: self.connection_manager.connection_count().await,
        }
    }

    /// Run a read-only closure against the registry
    pub async fn inspect<T>(&self, f: impl FnOnce(&RoomRegistry) -> T) -> T {
        let registry = self.registry.lock().await;
        f(&registry)
    }

    async fn deliver(&self, dispatches: Vec<Dispatch>) {
        for dispatch in dispatches {
            match dispatch {
                Dispatch::ToConnection(connection_id, message) => {
                    if let Some(json) = Self::encode(&message) {
                        self.connection_manager
                            .send_to_connection(&connection_id, &json)
                            .await;
                    }
                }
                Dispatch::ToConnections(connection_ids, message) => {
                    if let Some(json) = Self::encode(&message) {
                        debug!(recipients = connection_ids.len(), message_type = ?message.message_type, "Multicast");
                        self.connection_manager
                            .send_to_connections(&connection_ids, &json)
                            .await;
                    }
                }
                Dispatch::ToAll(message) => {
                    if let Some(json) = Self::encode(&message) {
                        self.connection_manager.broadcast(&json).await;
                    }
                }
            }
        }
    }

    fn encode(message: &crate::websockets::WebSocketMessage) -> Option<String> {
        match serde_json::to_string(message) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Failed to serialize outbound message");
                None
            }
        }
    }
}
