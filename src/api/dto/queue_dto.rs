//! Waiting-queue DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Current state of the waiting queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueueResponse {
    /// Number of waiting participants.
    pub waiting: usize,
    /// Waiting participant ids in arrival order.
    pub participants: Vec<String>,
}

/// A single waiting participant.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WaitingParticipantResponse {
    /// Participant id.
    pub id: String,
    /// Interest tags in submission order.
    pub tags: Vec<String>,
    /// Whole seconds spent waiting so far.
    pub waited_secs: u64,
}
