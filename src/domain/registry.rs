//! Concurrent waiting-participant storage.
//!
//! [`ParticipantRegistry`] is the only shared mutable state in the
//! matchmaking core. Every read and write goes through one
//! [`tokio::sync::Mutex`], so selection and claiming can run as a single
//! critical section and no participant is ever handed to two pairings.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use super::selector::{MatchCandidate, MatchKind, select_candidate};
use super::{Participant, ParticipantId};

/// Two participants removed from the registry together.
#[derive(Debug, Clone)]
pub struct ClaimedPair {
    /// The participant that initiated the attempt.
    pub requester: Participant,
    /// The opponent chosen for it.
    pub candidate: Participant,
    /// Tag overlap between the two.
    pub score: usize,
    /// Whether the candidate was a scored match or the fallback.
    pub kind: MatchKind,
}

/// Result of trying to claim a pair.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// Both participants were removed.
    Claimed(ClaimedPair),
    /// No other participant is waiting. The requester stays queued.
    NoCandidate,
    /// The requester is no longer waiting (already paired or withdrawn).
    RequesterGone,
    /// The candidate is no longer waiting. The requester stays queued.
    CandidateGone,
}

/// Waiting set ordered by arrival.
#[derive(Debug, Default)]
struct WaitingSet {
    next_seq: u64,
    by_arrival: BTreeMap<u64, Participant>,
    seq_of: HashMap<ParticipantId, u64>,
}

impl WaitingSet {
    fn insert(&mut self, participant: Participant) -> Option<Participant> {
        let previous = self.remove(participant.id());
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.seq_of.insert(participant.id().clone(), seq);
        self.by_arrival.insert(seq, participant);
        previous
    }

    fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        let seq = self.seq_of.remove(id)?;
        self.by_arrival.remove(&seq)
    }

    fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.seq_of.get(id).and_then(|seq| self.by_arrival.get(seq))
    }

    fn claim(&mut self, requester: &ParticipantId, candidate: MatchCandidate) -> ClaimOutcome {
        if !self.seq_of.contains_key(requester) {
            return ClaimOutcome::RequesterGone;
        }
        let candidate_id = candidate.participant.id();
        if candidate_id == requester || !self.seq_of.contains_key(candidate_id) {
            return ClaimOutcome::CandidateGone;
        }
        match (self.remove(requester), self.remove(candidate_id)) {
            (Some(requester), Some(candidate_record)) => ClaimOutcome::Claimed(ClaimedPair {
                requester,
                candidate: candidate_record,
                score: candidate.score,
                kind: candidate.kind,
            }),
            _ => ClaimOutcome::CandidateGone,
        }
    }
}

/// Registry of participants waiting to be paired.
///
/// Keyed by [`ParticipantId`]; at most one record per id. Iteration order is
/// arrival order, which makes selection tie-breaks deterministic.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    waiting: Mutex<WaitingSet>,
}

impl ParticipantRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the waiting record for the participant's id.
    ///
    /// A replaced record loses its place in the arrival order. Returns the
    /// record that was replaced, if any.
    pub async fn register(&self, participant: Participant) -> Option<Participant> {
        self.waiting.lock().await.insert(participant)
    }

    /// Removes the waiting record for `id`. Absent ids are a no-op.
    pub async fn remove(&self, id: &ParticipantId) -> Option<Participant> {
        self.waiting.lock().await.remove(id)
    }

    /// Removes `id` only if its waiting record was registered by
    /// `connection_id`. Used when a connection closes, so a newer record
    /// submitted over another connection survives.
    pub async fn withdraw(&self, id: &ParticipantId, connection_id: Uuid) -> Option<Participant> {
        let mut waiting = self.waiting.lock().await;
        let owned = waiting
            .get(id)
            .is_some_and(|p| p.connection_id() == connection_id);
        if owned { waiting.remove(id) } else { None }
    }

    /// Returns the waiting record for `id`, if any.
    pub async fn get(&self, id: &ParticipantId) -> Option<Participant> {
        self.waiting.lock().await.get(id).cloned()
    }

    /// Returns every waiting participant in arrival order.
    pub async fn snapshot(&self) -> Vec<Participant> {
        self.waiting.lock().await.by_arrival.values().cloned().collect()
    }

    /// Returns the ids of all waiting participants in arrival order.
    pub async fn waiting_ids(&self) -> Vec<ParticipantId> {
        self.waiting
            .lock()
            .await
            .by_arrival
            .values()
            .map(|p| p.id().clone())
            .collect()
    }

    /// Returns `true` if `id` is currently waiting.
    pub async fn contains(&self, id: &ParticipantId) -> bool {
        self.waiting.lock().await.seq_of.contains_key(id)
    }

    /// Returns the number of waiting participants.
    pub async fn len(&self) -> usize {
        self.waiting.lock().await.seq_of.len()
    }

    /// Returns `true` if nobody is waiting.
    pub async fn is_empty(&self) -> bool {
        self.waiting.lock().await.seq_of.is_empty()
    }

    /// Removes `requester` and the proposed candidate together.
    ///
    /// Either both are removed or neither is: if the candidate has already
    /// been claimed elsewhere, the requester remains queued.
    pub async fn claim(&self, requester: &ParticipantId, candidate: MatchCandidate) -> ClaimOutcome {
        self.waiting.lock().await.claim(requester, candidate)
    }

    /// Selects an opponent for `requester` and claims both under one lock
    /// acquisition.
    pub async fn select_and_claim(&self, requester: &ParticipantId) -> ClaimOutcome {
        let mut waiting = self.waiting.lock().await;
        let Some(me) = waiting.get(requester) else {
            return ClaimOutcome::RequesterGone;
        };
        let Some(candidate) = select_candidate(me, waiting.by_arrival.values()) else {
            return ClaimOutcome::NoCandidate;
        };
        waiting.claim(requester, candidate)
    }

    /// Removes and returns every participant that has waited at least
    /// `max_wait` as of `now`, in arrival order.
    pub async fn evict_expired(&self, max_wait: Duration, now: Instant) -> Vec<Participant> {
        let mut waiting = self.waiting.lock().await;
        let expired: Vec<ParticipantId> = waiting
            .by_arrival
            .values()
            .filter(|p| now.saturating_duration_since(p.joined_at()) >= max_wait)
            .map(|p| p.id().clone())
            .collect();
        expired
            .iter()
            .filter_map(|id| waiting.remove(id))
            .collect()
    }
}
