//! Per-connection read loop.
//!
//! Each text frame is a join request. Valid requests are acknowledged with a
//! `queued` reply, then queued and matched on a separate task, so a slow
//! pairing (lookups, retries) never stalls this socket's reads.
//! When the socket closes, the participants it registered leave the queue
//! and deliveries still retrying towards them are cancelled.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::messages::{ConnectionReply, JoinRequest};
use super::sink::WsSink;
use crate::domain::{Participant, ParticipantId, ParticipantSink};
use crate::service::PairingCoordinator;

/// Runs the read loop for a single WebSocket connection.
pub async fn run_connection(socket: WebSocket, coordinator: Arc<PairingCoordinator>) {
    let (ws_tx, mut ws_rx) = socket.split();
    let sink = Arc::new(WsSink::new(ws_tx));
    let connection_id = Uuid::new_v4();
    let closed = CancellationToken::new();
    let mut registered: HashSet<ParticipantId> = HashSet::new();

    tracing::debug!(%connection_id, "ws connection opened");

    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "ws read failed");
                break;
            }
        };

        let request = match JoinRequest::parse(&text) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(%connection_id, error = %err, "rejected request");
                if sink.send_text(&encode(&ConnectionReply::from(&err))).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let id = request.participant_id();
        let participant = Participant::new(
            id.clone(),
            request.tags,
            Arc::clone(&sink) as Arc<dyn ParticipantSink>,
        )
        .with_connection(connection_id, closed.clone());
        // Ack before queueing so a match notification can never overtake it.
        let queued = encode(&ConnectionReply::Queued { id: id.clone() });
        if sink.send_text(&queued).await.is_err() {
            break;
        }
        registered.insert(id.clone());
        coordinator.enqueue(participant).await;

        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            let _ = coordinator.try_match(&id).await;
        });
    }

    closed.cancel();
    for id in &registered {
        coordinator.leave(id, connection_id).await;
    }
    sink.close().await;

    tracing::debug!(%connection_id, "ws connection closed");
}

fn encode(reply: &ConnectionReply) -> String {
    serde_json::to_string(reply).unwrap_or_default()
}
