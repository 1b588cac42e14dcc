//! Operational events emitted by the matchmaking core.
//!
//! Events go through the [`super::EventBus`]. They are how conditions that
//! are recovered locally (a missing durable record, an abandoned delivery)
//! still reach an operator instead of disappearing into a log line.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ParticipantId, RoomId};

/// Event emitted by the registry/coordinator pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MatchEvent {
    /// A participant entered the waiting set.
    ParticipantQueued {
        /// Participant identity.
        participant: ParticipantId,
        /// Tags as sent by the client.
        tags: Vec<String>,
        /// Queue timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A waiting participant left because its connection closed.
    ParticipantLeft {
        /// Participant identity.
        participant: ParticipantId,
        /// Departure timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Two participants were paired.
    MatchCreated {
        /// Room token.
        room: RoomId,
        /// Requesting participant.
        participant_a: ParticipantId,
        /// Selected candidate.
        participant_b: ParticipantId,
        /// Tag overlap.
        score: usize,
        /// Whether the fallback candidate was used.
        fallback: bool,
        /// Resolved topic name, if any.
        topic: Option<String>,
        /// Pairing timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The match record could not be stored; the session has no durable row.
    PersistenceFailed {
        /// Room token of the unrecorded match.
        room: RoomId,
        /// Error message from the store.
        error: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A notification was given up on after exhausting its retries.
    DeliveryAbandoned {
        /// Room token, when the notification was a match announcement.
        room: Option<RoomId>,
        /// Intended recipient.
        participant: ParticipantId,
        /// Number of write attempts made.
        attempts: u32,
        /// Timestamp of the last attempt.
        timestamp: DateTime<Utc>,
    },

    /// A participant was evicted after waiting too long.
    WaitTimedOut {
        /// Participant identity.
        participant: ParticipantId,
        /// Whole seconds spent waiting.
        waited_secs: u64,
        /// Eviction timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MatchEvent {
    /// Returns the room this event belongs to, if any.
    #[must_use]
    pub const fn room(&self) -> Option<RoomId> {
        match self {
            Self::MatchCreated { room, .. } | Self::PersistenceFailed { room, .. } => Some(*room),
            Self::DeliveryAbandoned { room, .. } => *room,
            Self::ParticipantQueued { .. }
            | Self::ParticipantLeft { .. }
            | Self::WaitTimedOut { .. } => None,
        }
    }

    /// Returns `true` for events that need operator attention.
    #[must_use]
    pub const fn is_alert(&self) -> bool {
        matches!(
            self,
            Self::PersistenceFailed { .. } | Self::DeliveryAbandoned { .. }
        )
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ParticipantQueued { .. } => "participant_queued",
            Self::ParticipantLeft { .. } => "participant_left",
            Self::MatchCreated { .. } => "match_created",
            Self::PersistenceFailed { .. } => "persistence_failed",
            Self::DeliveryAbandoned { .. } => "delivery_abandoned",
            Self::WaitTimedOut { .. } => "wait_timed_out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_failure_is_alert() {
        let room = RoomId::new();
        let event = MatchEvent::PersistenceFailed {
            room,
            error: "connection refused".to_string(),
            timestamp: Utc::now(),
        };
        assert!(event.is_alert());
        assert_eq!(event.room(), Some(room));
        assert_eq!(event.event_type_str(), "persistence_failed");
    }

    #[test]
    fn queued_serializes_with_tag() {
        let event = MatchEvent::ParticipantQueued {
            participant: "1".into(),
            tags: vec!["go".to_string()],
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"participant_queued\""));
        assert!(!event.is_alert());
    }
}
