use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use super::ConnectionId;

/// Text-frame transport for one collaborator.
///
/// Only text frames carry room events; everything else is handled or ignored
/// by the implementation.
#[async_trait]
pub trait SocketWrapper: Send {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// `Ok(None)` once the peer has closed the socket
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Consumer of raw inbound frames, one call per frame in arrival order
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, connection_id: ConnectionId, message: String);
}

#[derive(Error, Debug)]
pub enum SocketError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        while let Some(frame) = self.next().await {
            match frame.map_err(|e| SocketError::ReceiveFailed(e.to_string()))? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // axum answers pings itself; binary frames carry no room events
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// Why a collaborator's pump stopped
enum Exit {
    PeerClosed,
    Unregistered,
}

/// Pumps one collaborator's socket.
///
/// Room updates queued by the connection manager go out on the socket; room
/// events read from the socket go to the handler. The pump ends when the peer
/// closes or when the connection manager drops the outbound sender.
pub struct Connection {
    pub connection_id: ConnectionId,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        connection_id: ConnectionId,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    pub async fn run(mut self) -> Result<(), SocketError> {
        let exit = loop {
            tokio::select! {
                update = self.outbound_receiver.recv() => match update {
                    Some(frame) => self.socket.send_message(frame).await?,
                    None => break Exit::Unregistered,
                },
                event = self.socket.receive_message() => match event? {
                    Some(frame) => {
                        self.message_handler
                            .handle_message(self.connection_id, frame)
                            .await
                    }
                    None => break Exit::PeerClosed,
                },
            }
        };

        // A peer that already closed needs no close frame
        if matches!(exit, Exit::Unregistered) {
            let _ = self.socket.close().await;
        }
        Ok(())
    }
}
