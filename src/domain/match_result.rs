//! Outcome of a successful pairing.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::topic::{Metatopic, Topic};
use super::{ParticipantId, RoomId};

/// Immutable record of one pairing, persisted once and then announced to
/// both participants.
///
/// `participant_a` is always the requester whose arrival (or re-scan)
/// triggered the match; `participant_b` is the selected candidate.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// Room token shared by both participants.
    pub room_id: RoomId,
    /// Requesting participant.
    pub participant_a: ParticipantId,
    /// Selected candidate.
    pub participant_b: ParticipantId,
    /// Resolved topic, if any lookup succeeded.
    pub topic: Option<Topic>,
    /// Metatopic of the requester's primary tag, if found.
    pub metatopic: Option<Metatopic>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MatchResult {
    /// Creates a record with a fresh room token stamped now.
    #[must_use]
    pub fn new(
        participant_a: ParticipantId,
        participant_b: ParticipantId,
        topic: Option<Topic>,
        metatopic: Option<Metatopic>,
    ) -> Self {
        Self {
            room_id: RoomId::new(),
            participant_a,
            participant_b,
            topic,
            metatopic,
            created_at: Utc::now(),
        }
    }

    /// Topic row id, if a topic was resolved.
    #[must_use]
    pub fn topic_id(&self) -> Option<i64> {
        self.topic.as_ref().map(|t| t.id)
    }

    /// Metatopic row id, if one was resolved.
    #[must_use]
    pub fn metatopic_id(&self) -> Option<i64> {
        self.metatopic.as_ref().map(|m| m.id)
    }

    /// Theme announced to players: the topic name, or empty when unresolved.
    #[must_use]
    pub fn theme(&self) -> &str {
        self.topic.as_ref().map_or("", |t| t.name.as_str())
    }

    /// Returns the other side of the pairing, or `None` if `id` is not part
    /// of this match.
    #[must_use]
    pub fn opponent_of(&self, id: &ParticipantId) -> Option<&ParticipantId> {
        if *id == self.participant_a {
            Some(&self.participant_b)
        } else if *id == self.participant_b {
            Some(&self.participant_a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(name: &str) -> Topic {
        Topic {
            id: 3,
            name: name.to_string(),
            status: "APPROVED".to_string(),
        }
    }

    #[test]
    fn theme_defaults_to_empty() {
        let result = MatchResult::new("1".into(), "2".into(), None, None);
        assert_eq!(result.theme(), "");
        assert_eq!(result.topic_id(), None);
    }

    #[test]
    fn theme_uses_topic_name() {
        let result = MatchResult::new("1".into(), "2".into(), Some(topic("Openings")), None);
        assert_eq!(result.theme(), "Openings");
        assert_eq!(result.topic_id(), Some(3));
    }

    #[test]
    fn opponent_is_symmetric() {
        let result = MatchResult::new("1".into(), "2".into(), None, None);
        assert_eq!(result.opponent_of(&"1".into()), Some(&ParticipantId::from("2")));
        assert_eq!(result.opponent_of(&"2".into()), Some(&ParticipantId::from("1")));
        assert_eq!(result.opponent_of(&"3".into()), None);
    }
}
