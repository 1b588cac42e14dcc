//! Payloads the gateway pushes to participants.
//!
//! Encoding is JSON text; the transport only frames it.

use serde::Serialize;

use super::{MatchResult, ParticipantId, RoomId};

/// Sent to each side of a pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchNotification {
    /// Room token shared by both players.
    pub room: RoomId,
    /// The recipient's own id.
    pub start_user_id: ParticipantId,
    /// The other player's id.
    pub opponent: ParticipantId,
    /// Topic name, empty when none was resolved.
    pub theme: String,
}

impl MatchNotification {
    /// Builds the notification for `recipient`, or `None` if the recipient
    /// is not part of `result`.
    #[must_use]
    pub fn for_recipient(result: &MatchResult, recipient: &ParticipantId) -> Option<Self> {
        let opponent = result.opponent_of(recipient)?;
        Some(Self {
            room: result.room_id,
            start_user_id: recipient.clone(),
            opponent: opponent.clone(),
            theme: result.theme().to_string(),
        })
    }
}

/// Sent to a participant evicted after waiting too long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "timeout")]
pub struct WaitTimeoutNotice {
    /// The evicted participant.
    pub id: ParticipantId,
    /// Whole seconds spent waiting.
    pub waited_secs: u64,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn notification_uses_wire_field_names() {
        let result = MatchResult::new("1".into(), "2".into(), None, None);
        let Some(note) = MatchNotification::for_recipient(&result, &"2".into()) else {
            panic!("recipient is part of the match");
        };
        let json = serde_json::to_value(&note).unwrap_or_default();
        assert_eq!(json.get("startUserId"), Some(&serde_json::json!("2")));
        assert_eq!(json.get("opponent"), Some(&serde_json::json!("1")));
        assert_eq!(json.get("theme"), Some(&serde_json::json!("")));
        assert_eq!(
            json.get("room"),
            Some(&serde_json::json!(result.room_id.to_string()))
        );
    }

    #[test]
    fn outsider_gets_no_notification() {
        let result = MatchResult::new("1".into(), "2".into(), None, None);
        assert!(MatchNotification::for_recipient(&result, &"9".into()).is_none());
    }

    #[test]
    fn timeout_notice_is_tagged() {
        let notice = WaitTimeoutNotice {
            id: "5".into(),
            waited_secs: 300,
        };
        let json = serde_json::to_value(&notice).unwrap_or_default();
        assert_eq!(json.get("type"), Some(&serde_json::json!("timeout")));
        assert_eq!(json.get("waited_secs"), Some(&serde_json::json!(300)));
    }
}
