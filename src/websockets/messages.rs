use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::room::errors::RoomError;

/// Outbound event names
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    RoomCreated,
    RoomCountUpdate,
    UserCountUpdate,
    CodeUpdate,
    Error,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Envelope for every server -> client message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Credentials carried by joinRoom / leaveRoom
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomCredentials {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub passcode: String,
}

/// Client -> server events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateRoom,
    JoinRoom(RoomCredentials),
    LeaveRoom(RoomCredentials),
    CodeChange(String),
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A joinRoom frame whose payload does not have the credential shape
    #[error("malformed joinRoom payload: {0}")]
    MalformedJoin(serde_json::Error),

    #[error("invalid message: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl ClientMessage {
    /// Decode a text frame, separating malformed joins from other garbage
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str::<ClientMessage>(text).map_err(|e| {
            let is_join = serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .and_then(|value| {
                    value
                        .get("type")
                        .and_then(|t| t.as_str())
                        .map(|t| t == "joinRoom")
                })
                .unwrap_or(false);

            if is_join {
                ProtocolError::MalformedJoin(e)
            } else {
                ProtocolError::Invalid(e)
            }
        })
    }
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    /// Create a roomCreated message
    pub fn room_created(room_id: &str, passcode: &str) -> Self {
        Self::new(
            MessageType::RoomCreated,
            json!({ "roomId": room_id, "passcode": passcode }),
        )
    }

    /// Create a roomCountUpdate message
    pub fn room_count_update(count: usize) -> Self {
        Self::new(MessageType::RoomCountUpdate, json!({ "count": count }))
    }

    /// Create a userCountUpdate message
    pub fn user_count_update(count: usize) -> Self {
        Self::new(MessageType::UserCountUpdate, json!({ "count": count }))
    }

    /// Create a codeUpdate message
    pub fn code_update(content: &str) -> Self {
        Self::new(MessageType::CodeUpdate, json!({ "content": content }))
    }

    /// Create an error message
    pub fn error(error: &RoomError) -> Self {
        Self::new(
            MessageType::Error,
            json!({ "kind": error.kind(), "message": error.to_string() }),
        )
    }
}
