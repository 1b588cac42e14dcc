//! [`ParticipantSink`] backed by the write half of a WebSocket.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::SinkExt;
use futures_util::stream::SplitSink;
use tokio::sync::Mutex;

use crate::domain::ParticipantSink;
use crate::error::GatewayError;

/// Write half of a client socket, shared between the connection loop and
/// any notifier delivering to participants registered on it.
#[derive(Clone)]
pub struct WsSink {
    tx: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

impl WsSink {
    /// Wraps the write half of a split socket.
    #[must_use]
    pub fn new(tx: SplitSink<WebSocket, Message>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(tx)),
        }
    }

    /// Sends a close frame. Errors are ignored; the peer may already be gone.
    pub async fn close(&self) {
        let _ = self.tx.lock().await.close().await;
    }
}

impl fmt::Debug for WsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsSink").finish_non_exhaustive()
    }
}

#[async_trait]
impl ParticipantSink for WsSink {
    async fn send_text(&self, text: &str) -> Result<(), GatewayError> {
        self.tx
            .lock()
            .await
            .send(Message::text(text.to_string()))
            .await
            .map_err(|e| GatewayError::DeliveryFailed(e.to_string()))
    }
}
