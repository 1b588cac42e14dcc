//! Database row models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::MatchResult;
use crate::error::GatewayError;

/// A row of the `games` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Requesting player.
    pub first_player_id: i64,
    /// Paired opponent.
    pub second_player_id: i64,
    /// Winner, unknown when the game is created.
    pub winner_id: Option<i64>,
    /// Room token as text.
    pub room_uid: String,
    /// Metatopic of the requester's primary tag.
    pub metatopic_id: Option<i64>,
    /// Topic the players will discuss.
    pub topic_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<&MatchResult> for GameRecord {
    type Error = GatewayError;

    fn try_from(result: &MatchResult) -> Result<Self, Self::Error> {
        let player_id = |id: &crate::domain::ParticipantId| {
            id.as_player_id().ok_or_else(|| {
                GatewayError::PersistenceError(format!("participant id {id} is not numeric"))
            })
        };
        Ok(Self {
            first_player_id: player_id(&result.participant_a)?,
            second_player_id: player_id(&result.participant_b)?,
            winner_id: None,
            room_uid: result.room_id.to_string(),
            metatopic_id: result.metatopic_id(),
            topic_id: result.topic_id(),
            created_at: result.created_at,
        })
    }
}
