//! Persistence layer: reference-data lookups and match records.
//!
//! [`MatchStore`] is the boundary the pairing coordinator talks to. The
//! PostgreSQL implementation uses `sqlx::PgPool`; the in-memory one backs
//! tests and deployments running with persistence disabled.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::domain::{MatchResult, Metatopic, Topic};
use crate::error::GatewayError;

pub use memory::{DEFAULT_RECORD_CAPACITY, InMemoryMatchStore};
pub use postgres::PostgresMatchStore;

/// Topic/metatopic resolution and match-record storage.
#[async_trait]
pub trait MatchStore: Send + Sync + fmt::Debug {
    /// Finds an approved topic linked to the metatopic named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::LookupError`] if the store cannot be queried.
    async fn find_approved_topic_by_metatopic_name(
        &self,
        name: &str,
    ) -> Result<Option<Topic>, GatewayError>;

    /// Finds the approved metatopic named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::LookupError`] if the store cannot be queried.
    async fn find_approved_metatopic_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Metatopic>, GatewayError>;

    /// Stores the record of a new match.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] if the record could not be
    /// written.
    async fn insert_match_record(&self, record: &MatchResult) -> Result<(), GatewayError>;
}
