//! WebSocket message shapes: join requests and connection replies.
//!
//! Match notifications and timeout notices are defined in
//! [`crate::domain::notification`]; they are produced by the core and only
//! framed here.

use serde::{Deserialize, Serialize};

use crate::domain::ParticipantId;
use crate::error::GatewayError;

/// Client → server request to be paired.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    /// Caller-supplied identity.
    pub id: String,
    /// Interest tags, most important first.
    #[serde(default, alias = "metatags")]
    pub tags: Vec<String>,
}

impl JoinRequest {
    /// Parses and validates a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for malformed JSON, a blank
    /// id, or an empty tag.
    pub fn parse(text: &str) -> Result<Self, GatewayError> {
        let request: Self = serde_json::from_str(text)
            .map_err(|e| GatewayError::InvalidRequest(format!("malformed JSON: {e}")))?;
        if request.id.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("id must not be empty".to_string()));
        }
        if request.tags.iter().any(|t| t.is_empty()) {
            return Err(GatewayError::InvalidRequest(
                "tags must not contain empty strings".to_string(),
            ));
        }
        Ok(request)
    }

    /// Participant identity from this request.
    #[must_use]
    pub fn participant_id(&self) -> ParticipantId {
        ParticipantId::new(self.id.trim())
    }
}

/// Server → client replies sent on the requesting connection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionReply {
    /// The participant is waiting for an opponent.
    Queued {
        /// Queued participant.
        id: ParticipantId,
    },
    /// The request was rejected.
    Error {
        /// Numeric error code.
        code: u32,
        /// Human-readable error message.
        message: String,
    },
}

impl From<&GatewayError> for ConnectionReply {
    fn from(err: &GatewayError) -> Self {
        Self::Error {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accepts_metatags_alias() {
        let Ok(request) = JoinRequest::parse(r#"{"id":"12","metatags":["go","art"]}"#) else {
            panic!("request should parse");
        };
        assert_eq!(request.participant_id().as_str(), "12");
        assert_eq!(request.tags, vec!["go".to_string(), "art".to_string()]);
    }

    #[test]
    fn tags_default_to_empty() {
        let Ok(request) = JoinRequest::parse(r#"{"id":"12"}"#) else {
            panic!("request should parse");
        };
        assert!(request.tags.is_empty());
    }

    #[test]
    fn rejects_blank_id_and_bad_json() {
        assert!(JoinRequest::parse(r#"{"id":"  ","tags":[]}"#).is_err());
        assert!(JoinRequest::parse("not json").is_err());
        assert!(JoinRequest::parse(r#"{"id":"1","tags":[""]}"#).is_err());
    }

    #[test]
    fn error_reply_carries_code() {
        let reply = ConnectionReply::from(&GatewayError::InvalidRequest("x".to_string()));
        let json = serde_json::to_value(&reply).unwrap_or_default();
        assert_eq!(json.get("type"), Some(&serde_json::json!("error")));
        assert_eq!(json.get("code"), Some(&serde_json::json!(1001)));
    }
}
