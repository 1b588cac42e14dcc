//! PostgreSQL implementation of [`MatchStore`].

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::MatchStore;
use super::models::GameRecord;
use crate::config::GatewayConfig;
use crate::domain::{MatchResult, Metatopic, Topic};
use crate::error::GatewayError;

const TOPIC_BY_METATOPIC_SQL: &str = "SELECT t.id, t.name, t.status FROM topics t \
     JOIN metatopics_topics mt ON mt.topics_id = t.id \
     JOIN metatopics m ON m.id = mt.metatopics_id \
     WHERE m.name = $1 AND t.status = 'APPROVED' LIMIT 1";

const METATOPIC_BY_NAME_SQL: &str = "SELECT id, name, status FROM metatopics \
     WHERE name = $1 AND status = 'APPROVED' LIMIT 1";

const INSERT_GAME_SQL: &str = "INSERT INTO games \
     (first_player_id, second_player_id, winner_id, room_uid, metatopic_id, topic_id, created_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7)";

/// PostgreSQL-backed match store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresMatchStore {
    pool: PgPool,
}

impl PostgresMatchStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily-connecting pool from the gateway configuration.
    ///
    /// No connection is opened until the first query, so the gateway can
    /// start while the database is unreachable; lookups then fail and are
    /// treated as "not found".
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if `DATABASE_URL` cannot be
    /// parsed.
    pub fn connect_lazy(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let options = PgConnectOptions::from_str(&config.database_url)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?
            .application_name(&format!("[{}]", config.database_app_name));

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect_lazy_with(options);

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl MatchStore for PostgresMatchStore {
    async fn find_approved_topic_by_metatopic_name(
        &self,
        name: &str,
    ) -> Result<Option<Topic>, GatewayError> {
        tracing::debug!(sql = TOPIC_BY_METATOPIC_SQL, metatopic = name, "query");
        let row = sqlx::query_as::<_, (i64, String, String)>(TOPIC_BY_METATOPIC_SQL)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(sql = TOPIC_BY_METATOPIC_SQL, error = %e, "query failed");
                GatewayError::LookupError(e.to_string())
            })?;

        Ok(row.map(|(id, name, status)| Topic { id, name, status }))
    }

    async fn find_approved_metatopic_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Metatopic>, GatewayError> {
        tracing::debug!(sql = METATOPIC_BY_NAME_SQL, metatopic = name, "query");
        let row = sqlx::query_as::<_, (i64, String, String)>(METATOPIC_BY_NAME_SQL)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(sql = METATOPIC_BY_NAME_SQL, error = %e, "query failed");
                GatewayError::LookupError(e.to_string())
            })?;

        Ok(row.map(|(id, name, status)| Metatopic { id, name, status }))
    }

    async fn insert_match_record(&self, record: &MatchResult) -> Result<(), GatewayError> {
        let game = GameRecord::try_from(record)?;
        tracing::debug!(sql = INSERT_GAME_SQL, room = %game.room_uid, "query");

        sqlx::query(INSERT_GAME_SQL)
            .bind(game.first_player_id)
            .bind(game.second_player_id)
            .bind(game.winner_id)
            .bind(&game.room_uid)
            .bind(game.metatopic_id)
            .bind(game.topic_id)
            .bind(game.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(sql = INSERT_GAME_SQL, error = %e, "query failed");
                GatewayError::PersistenceError(e.to_string())
            })?;

        Ok(())
    }
}
