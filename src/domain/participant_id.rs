//! Caller-supplied participant identity.
//!
//! [`ParticipantId`] wraps the string a client sends in its join request.
//! The gateway never generates these; uniqueness across live connections is
//! enforced by the registry, which keeps at most one waiting record per id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a participant waiting to be paired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interprets the identifier as a numeric player id, as stored in the
    /// `games` table. Returns `None` for non-numeric identifiers.
    #[must_use]
    pub fn as_player_id(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_map_to_player_ids() {
        assert_eq!(ParticipantId::from("1024").as_player_id(), Some(1024));
        assert_eq!(ParticipantId::from("alice").as_player_id(), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&ParticipantId::from("7")).unwrap_or_default();
        assert_eq!(json, "\"7\"");
    }
}
