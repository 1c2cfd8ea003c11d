// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{ClientMessage, MessageType, WebSocketMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};

/// Per-connection identity assigned when the socket is upgraded
pub type ConnectionId = uuid::Uuid;

// Internal modules
mod connection_manager;
mod handler;
pub mod messages;
mod socket;
