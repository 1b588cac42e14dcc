//! Externally owned reference data naming the subject of a match.

use serde::{Deserialize, Serialize};

/// Status value of reference rows that may be used for matches.
pub const APPROVED: &str = "APPROVED";

/// A discussion topic, reachable from one or more metatopics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Row id in the `topics` table.
    pub id: i64,
    /// Topic name, sent to both players as the match theme.
    pub name: String,
    /// Moderation status (only `APPROVED` rows are returned by lookups).
    pub status: String,
}

/// A metatopic: the interest tag a participant selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metatopic {
    /// Row id in the `metatopics` table.
    pub id: i64,
    /// Metatopic name, identical to the tag string clients send.
    pub name: String,
    /// Moderation status.
    pub status: String,
}

impl Topic {
    /// Returns `true` if the topic may be used for a match.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == APPROVED
    }
}

impl Metatopic {
    /// Returns `true` if the metatopic may be used for a match.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == APPROVED
    }
}
