//! Waiting participant record and its outbound delivery handle.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::ParticipantId;
use crate::error::GatewayError;

/// Outbound channel to a participant.
///
/// Each call is one delivery attempt; implementations report success or
/// failure of that single write and never retry on their own. Retrying is
/// the job of [`crate::service::Notifier`].
#[async_trait]
pub trait ParticipantSink: Send + Sync + fmt::Debug {
    /// Writes one text frame to the participant.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DeliveryFailed`] if the write did not succeed.
    async fn send_text(&self, text: &str) -> Result<(), GatewayError>;
}

/// A participant waiting to be paired.
///
/// Immutable once created: the registry only ever inserts or removes whole
/// records. `tags` keeps the order and duplicates the client sent, since
/// both topic resolution (first tag) and scoring depend on them.
#[derive(Debug, Clone)]
pub struct Participant {
    id: ParticipantId,
    tags: Vec<String>,
    sink: Arc<dyn ParticipantSink>,
    connection_id: Uuid,
    closed: CancellationToken,
    joined_at: Instant,
}

impl Participant {
    /// Creates a participant bound to a fresh, never-closing connection.
    #[must_use]
    pub fn new(id: ParticipantId, tags: Vec<String>, sink: Arc<dyn ParticipantSink>) -> Self {
        Self {
            id,
            tags,
            sink,
            connection_id: Uuid::new_v4(),
            closed: CancellationToken::new(),
            joined_at: Instant::now(),
        }
    }

    /// Binds the participant to the connection that submitted it.
    ///
    /// `closed` is cancelled by the connection when it goes away, which
    /// stops any in-flight deliveries to this participant.
    #[must_use]
    pub fn with_connection(mut self, connection_id: Uuid, closed: CancellationToken) -> Self {
        self.connection_id = connection_id;
        self.closed = closed;
        self
    }

    /// Participant identity.
    #[must_use]
    pub const fn id(&self) -> &ParticipantId {
        &self.id
    }

    /// Interest tags in the order the client sent them.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// First tag, used as the participant's default metatopic.
    #[must_use]
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Outbound delivery handle.
    #[must_use]
    pub fn sink(&self) -> &dyn ParticipantSink {
        self.sink.as_ref()
    }

    /// Connection that registered this participant.
    #[must_use]
    pub const fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Token cancelled when the owning connection closes.
    #[must_use]
    pub const fn closed(&self) -> &CancellationToken {
        &self.closed
    }

    /// Instant the record was created.
    #[must_use]
    pub const fn joined_at(&self) -> Instant {
        self.joined_at
    }
}
