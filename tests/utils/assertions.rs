//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use codespace::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    clients: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for every client in the setup
    pub fn for_all_clients(setup: &'a TestSetup) -> Self {
        let clients = setup.names.iter().map(|s| s.as_str()).collect();
        Self { setup, clients }
    }

    /// Create an assertion for specific clients
    pub fn for_clients(setup: &'a TestSetup, clients: Vec<&'a str>) -> Self {
        Self { setup, clients }
    }

    /// Assert that clients received a specific message type (consumes the message from queue)
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for client in &self.clients {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(&self.setup.id(client))
                .await;
            assert!(
                message.is_some(),
                "{} should have received a {:?} message",
                client,
                expected_type
            );

            let msg: WebSocketMessage = serde_json::from_str(&message.unwrap()).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                client
            );
            messages.push(msg);
        }

        // Everyone addressed by one emission sees the same payload
        let first_payload = &messages[0].payload;
        for (i, msg) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                &msg.payload, first_payload,
                "Client {} payload differs from client {}",
                self.clients[i], self.clients[0]
            );
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that clients have no pending messages
    pub async fn received_no_messages(self) {
        for client in &self.clients {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&self.setup.id(client))
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                client,
                messages
            );
        }
    }

    /// Assert that clients received a sequence of message types in order (non-consuming)
    pub async fn received_message_sequence(self, expected_types: Vec<MessageType>) {
        for client in &self.clients {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&self.setup.id(client))
                .await;
            assert_eq!(
                messages.len(),
                expected_types.len(),
                "{} received {:?}",
                client,
                messages
            );

            for (i, expected_type) in expected_types.iter().enumerate() {
                let msg: WebSocketMessage = serde_json::from_str(&messages[i])
                    .unwrap_or_else(|e| panic!("Failed to parse message {} for {}: {}", i, client, e));
                assert_eq!(
                    msg.message_type, *expected_type,
                    "{} message {} has wrong type",
                    client, i
                );
            }
        }
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    payload: serde_json::Value,
}

impl MessageContent {
    pub fn with_count(self, expected: u64) -> Self {
        assert_eq!(self.payload["count"], expected);
        self
    }

    pub fn with_content(self, expected: &str) -> Self {
        assert_eq!(self.payload["content"], expected);
        self
    }

    /// Assert the error message text and its kind
    pub fn with_error(self, expected_kind: &str, expected_message: &str) -> Self {
        assert_eq!(self.payload["kind"], expected_kind);
        assert_eq!(self.payload["message"], expected_message);
        self
    }
}
