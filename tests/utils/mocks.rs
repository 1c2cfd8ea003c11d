use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use codespace::{ConnectionId, ConnectionManager};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every delivery per connection instead of writing to sockets
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<ConnectionId, Vec<String>>>>,
    connected: Arc<RwLock<Vec<ConnectionId>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn add_connected(&self, connection_id: ConnectionId) {
        self.connected.write().await.push(connection_id);
    }

    pub async fn get_messages_for(&self, connection_id: &ConnectionId) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(connection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Pop the oldest undelivered message for a connection
    pub async fn consume_message_for(&self, connection_id: &ConnectionId) -> Option<String> {
        let mut sent = self.sent_messages.write().await;
        let queue = sent.get_mut(connection_id)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection_id: ConnectionId, _sender: mpsc::UnboundedSender<String>) {
        self.add_connected(connection_id).await;
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) {
        self.connected.write().await.retain(|c| c != connection_id);
    }

    async fn send_to_connection(&self, connection_id: &ConnectionId, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(*connection_id)
            .or_default()
            .push(message.to_string());
    }

    async fn send_to_connections(&self, connection_ids: &[ConnectionId], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(connection_id, message).await;
        }
    }

    async fn broadcast(&self, message: &str) {
        let connected = self.connected.read().await.clone();
        for connection_id in &connected {
            self.send_to_connection(connection_id, message).await;
        }
    }

    async fn connection_count(&self) -> usize {
        self.connected.read().await.len()
    }
}
