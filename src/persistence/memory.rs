//! In-memory implementation of [`MatchStore`].
//!
//! Used when `PERSISTENCE_ENABLED=false` and as the store in tests. Reference
//! data is seeded explicitly; nothing survives a restart. Only the most
//! recent match records are retained.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::MatchStore;
use crate::domain::{MatchResult, Metatopic, Topic};
use crate::error::GatewayError;

/// Records kept when no capacity is given.
pub const DEFAULT_RECORD_CAPACITY: usize = 1_024;

/// Match store kept in process memory.
#[derive(Debug)]
pub struct InMemoryMatchStore {
    /// Topics keyed by the metatopic name they are reachable from.
    topics: RwLock<HashMap<String, Topic>>,
    metatopics: RwLock<HashMap<String, Metatopic>>,
    /// Newest at the back; the oldest is dropped once `capacity` is reached.
    records: RwLock<VecDeque<MatchResult>>,
    capacity: usize,
    insert_calls: AtomicUsize,
    fail_inserts: AtomicBool,
}

impl Default for InMemoryMatchStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECORD_CAPACITY)
    }
}

impl InMemoryMatchStore {
    /// Creates an empty store retaining [`DEFAULT_RECORD_CAPACITY`] records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store retaining at most `capacity` match records.
    /// A capacity of 0 keeps no records; inserts are still counted.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: RwLock::default(),
            metatopics: RwLock::default(),
            records: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_RECORD_CAPACITY))),
            capacity,
            insert_calls: AtomicUsize::new(0),
            fail_inserts: AtomicBool::new(false),
        }
    }

    /// Maximum number of retained match records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Links `topic` to the metatopic named `metatopic_name`.
    pub async fn add_topic(&self, metatopic_name: &str, topic: Topic) {
        self.topics
            .write()
            .await
            .insert(metatopic_name.to_string(), topic);
    }

    /// Adds a metatopic, keyed by its name.
    pub async fn add_metatopic(&self, metatopic: Metatopic) {
        self.metatopics
            .write()
            .await
            .insert(metatopic.name.clone(), metatopic);
    }

    /// Makes every subsequent insert fail (or succeed again).
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Returns the retained match records, oldest first.
    pub async fn records(&self) -> Vec<MatchResult> {
        self.records.read().await.iter().cloned().collect()
    }

    /// Number of insert calls, successful or not.
    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn find_approved_topic_by_metatopic_name(
        &self,
        name: &str,
    ) -> Result<Option<Topic>, GatewayError> {
        Ok(self
            .topics
            .read()
            .await
            .get(name)
            .filter(|t| t.is_approved())
            .cloned())
    }

    async fn find_approved_metatopic_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Metatopic>, GatewayError> {
        Ok(self
            .metatopics
            .read()
            .await
            .get(name)
            .filter(|m| m.is_approved())
            .cloned())
    }

    async fn insert_match_record(&self, record: &MatchResult) -> Result<(), GatewayError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(GatewayError::PersistenceError(
                "inserts disabled".to_string(),
            ));
        }
        if self.capacity == 0 {
            return Ok(());
        }
        let mut records = self.records.write().await;
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }
}
