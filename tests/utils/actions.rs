use serde_json::json;

use codespace::{websockets::MessageHandler, ConnectionManager, MessageType, WebSocketMessage};

use super::setup::TestSetup;

/// Credentials handed out by a roomCreated message
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room_id: String,
    pub passcode: String,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed a raw text frame through the inbound handler
    pub async fn send_raw(&self, name: &str, frame: serde_json::Value) {
        self.input_handler
            .handle_message(self.id(name), frame.to_string())
            .await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    /// Create a room and return the credentials sent back to the creator.
    /// Recorded messages are cleared afterwards.
    pub async fn create_room(&self, name: &str) -> CreatedRoom {
        self.send_raw(name, json!({ "type": "createRoom" })).await;

        let messages = self.mock_conn_manager.get_messages_for(&self.id(name)).await;
        let created = messages
            .iter()
            .filter_map(|m| serde_json::from_str::<WebSocketMessage>(m).ok())
            .find(|m| m.message_type == MessageType::RoomCreated)
            .expect("creator should receive roomCreated");

        self.clear_messages().await;

        CreatedRoom {
            room_id: created.payload["roomId"].as_str().unwrap().to_string(),
            passcode: created.payload["passcode"].as_str().unwrap().to_string(),
        }
    }

    pub async fn send_join(&self, name: &str, room_id: &str, passcode: &str) {
        self.send_raw(
            name,
            json!({ "type": "joinRoom", "payload": { "roomId": room_id, "passcode": passcode } }),
        )
        .await;
    }

    /// Join with the room's own credentials
    pub async fn join(&self, name: &str, room: &CreatedRoom) {
        self.send_join(name, &room.room_id, &room.passcode).await;
    }

    pub async fn send_leave(&self, name: &str, room_id: &str, passcode: &str) {
        self.send_raw(
            name,
            json!({ "type": "leaveRoom", "payload": { "roomId": room_id, "passcode": passcode } }),
        )
        .await;
    }

    pub async fn send_code_change(&self, name: &str, code: &str) {
        self.send_raw(name, json!({ "type": "codeChange", "payload": code }))
            .await;
    }

    /// Simulate the transport closing the socket
    pub async fn disconnect(&self, name: &str) {
        let id = self.id(name);
        self.mock_conn_manager.remove_connection(&id).await;
        self.coordinator.disconnect(id).await;
    }
}
