//! Pairing coordinator: turns a claimed pair into a persisted, announced
//! match.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use super::notifier::{DeliveryReport, Notifier};
use crate::domain::selector::shared_tags;
use crate::domain::{
    ClaimOutcome, ClaimedPair, EventBus, MatchEvent, MatchKind, MatchNotification, MatchResult,
    Metatopic, Participant, ParticipantId, ParticipantRegistry, RoomId, Topic, WaitTimeoutNotice,
};
use crate::error::GatewayError;
use crate::persistence::MatchStore;

/// Everything that happened for one claimed pair.
#[derive(Debug)]
pub struct PairingReport {
    /// The persisted (or attempted) match record.
    pub result: MatchResult,
    /// Tag overlap of the pair.
    pub score: usize,
    /// Whether the opponent was a scored match or the fallback.
    pub kind: MatchKind,
    /// Outcome of the single persistence call.
    pub persisted: Result<(), GatewayError>,
    /// Delivery outcome for the requester.
    pub delivery_a: Result<DeliveryReport, GatewayError>,
    /// Delivery outcome for the candidate.
    pub delivery_b: Result<DeliveryReport, GatewayError>,
}

/// Outcome of one matching attempt.
#[derive(Debug)]
pub enum PairingOutcome {
    /// Nobody else is waiting; the requester stays queued.
    NoCandidate,
    /// The attempt lost a race: the requester was already claimed or
    /// withdrawn, or its chosen candidate vanished. Nothing was persisted or
    /// sent.
    Aborted,
    /// A pair was claimed and processed.
    Paired(Box<PairingReport>),
}

/// Orchestrates claiming, topic resolution, persistence and notification.
///
/// Only the claim runs under the registry lock; lookups, the insert and both
/// deliveries happen after it is released, so slow I/O never blocks other
/// participants from registering or matching.
#[derive(Debug, Clone)]
pub struct PairingCoordinator {
    registry: Arc<ParticipantRegistry>,
    store: Arc<dyn MatchStore>,
    notifier: Notifier,
    event_bus: EventBus,
}

impl PairingCoordinator {
    /// Creates a new `PairingCoordinator`.
    #[must_use]
    pub fn new(
        registry: Arc<ParticipantRegistry>,
        store: Arc<dyn MatchStore>,
        notifier: Notifier,
        event_bus: EventBus,
    ) -> Self {
        Self {
            registry,
            store,
            notifier,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`ParticipantRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ParticipantRegistry> {
        &self.registry
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Queues `participant` and immediately tries to pair it.
    pub async fn join(&self, participant: Participant) -> PairingOutcome {
        let id = self.enqueue(participant).await;
        self.try_match(&id).await
    }

    /// Adds `participant` to the waiting set without attempting a match,
    /// replacing any earlier record with the same id.
    pub async fn enqueue(&self, participant: Participant) -> ParticipantId {
        let id = participant.id().clone();
        let tags = participant.tags().to_vec();

        if self.registry.register(participant).await.is_some() {
            tracing::debug!(participant = %id, "replaced earlier waiting record");
        }
        tracing::info!(participant = %id, ?tags, "participant wants a game");
        let _ = self.event_bus.publish(MatchEvent::ParticipantQueued {
            participant: id.clone(),
            tags,
            timestamp: Utc::now(),
        });
        id
    }

    /// Removes a waiting participant whose connection closed.
    ///
    /// Only the record registered by `connection_id` is removed.
    pub async fn leave(&self, id: &ParticipantId, connection_id: uuid::Uuid) -> bool {
        let removed = self.registry.withdraw(id, connection_id).await.is_some();
        if removed {
            tracing::info!(participant = %id, "participant left the queue");
            let _ = self.event_bus.publish(MatchEvent::ParticipantLeft {
                participant: id.clone(),
                timestamp: Utc::now(),
            });
        }
        removed
    }

    /// Runs one matching attempt for a waiting participant.
    pub async fn try_match(&self, id: &ParticipantId) -> PairingOutcome {
        tracing::debug!(participant = %id, stage = "selecting", "matching attempt");
        match self.registry.select_and_claim(id).await {
            ClaimOutcome::Claimed(pair) => PairingOutcome::Paired(Box::new(self.complete(pair).await)),
            ClaimOutcome::NoCandidate => {
                tracing::debug!(participant = %id, "no opponent available yet");
                PairingOutcome::NoCandidate
            }
            ClaimOutcome::RequesterGone | ClaimOutcome::CandidateGone => {
                tracing::debug!(participant = %id, stage = "aborted", "claim lost a race");
                PairingOutcome::Aborted
            }
        }
    }

    /// Re-runs matching for every waiting participant, in arrival order.
    ///
    /// Pairs are claimed one lock acquisition at a time; participants paired
    /// earlier in the pass are skipped. Resolution, persistence and delivery
    /// for the claimed pairs then run concurrently, so a pair stuck in
    /// delivery retries does not hold back the rest. Returns the pairs made.
    pub async fn rescan(&self) -> Vec<PairingReport> {
        let mut claimed = Vec::new();
        for id in self.registry.waiting_ids().await {
            match self.registry.select_and_claim(&id).await {
                ClaimOutcome::Claimed(pair) => claimed.push(pair),
                ClaimOutcome::NoCandidate
                | ClaimOutcome::RequesterGone
                | ClaimOutcome::CandidateGone => {}
            }
        }
        tracing::debug!(pairs = claimed.len(), stage = "claimed", "rescan pass");

        futures_util::future::join_all(claimed.into_iter().map(|pair| self.complete(pair))).await
    }

    /// Evicts participants that have waited at least `max_wait` and tells
    /// each one it timed out. Returns the evicted ids.
    pub async fn expire_waiting(&self, max_wait: Duration) -> Vec<ParticipantId> {
        let now = Instant::now();
        let expired = self.registry.evict_expired(max_wait, now).await;

        let notices = expired.iter().map(|participant| async move {
            let waited_secs = now.saturating_duration_since(participant.joined_at()).as_secs();
            tracing::info!(participant = %participant.id(), waited_secs, "wait timed out");
            let _ = self.event_bus.publish(MatchEvent::WaitTimedOut {
                participant: participant.id().clone(),
                waited_secs,
                timestamp: Utc::now(),
            });

            let notice = WaitTimeoutNotice {
                id: participant.id().clone(),
                waited_secs,
            };
            match serde_json::to_string(&notice) {
                Ok(payload) => {
                    let outcome = self.notifier.deliver_to(participant, &payload).await;
                    self.report_delivery(None, participant.id(), &outcome);
                }
                Err(e) => tracing::error!(error = %e, "failed to encode timeout notice"),
            }
        });
        futures_util::future::join_all(notices).await;

        expired.iter().map(|p| p.id().clone()).collect()
    }

    /// Resolves, persists and announces a claimed pair.
    async fn complete(&self, pair: ClaimedPair) -> PairingReport {
        let ClaimedPair {
            requester,
            candidate,
            score,
            kind,
        } = pair;
        tracing::info!(
            participant = %requester.id(),
            opponent = %candidate.id(),
            score,
            ?kind,
            stage = "claimed",
            "pair found"
        );

        let (topic, metatopic) = self.resolve_topic(&requester, &candidate).await;

        let result = MatchResult::new(
            requester.id().clone(),
            candidate.id().clone(),
            topic,
            metatopic,
        );
        let _ = self.event_bus.publish(MatchEvent::MatchCreated {
            room: result.room_id,
            participant_a: result.participant_a.clone(),
            participant_b: result.participant_b.clone(),
            score,
            fallback: kind == MatchKind::Fallback,
            topic: result.topic.as_ref().map(|t| t.name.clone()),
            timestamp: result.created_at,
        });

        tracing::debug!(room = %result.room_id, stage = "persisting", "storing match");
        let persisted = self.store.insert_match_record(&result).await;
        if let Err(e) = &persisted {
            tracing::error!(room = %result.room_id, error = %e, "match record not stored");
            let _ = self.event_bus.publish(MatchEvent::PersistenceFailed {
                room: result.room_id,
                error: e.to_string(),
                timestamp: Utc::now(),
            });
        }

        tracing::debug!(room = %result.room_id, stage = "notifying", "announcing match");
        let (delivery_a, delivery_b) = tokio::join!(
            self.announce(&result, &requester),
            self.announce(&result, &candidate)
        );

        tracing::info!(room = %result.room_id, theme = result.theme(), stage = "done", "match started");
        PairingReport {
            result,
            score,
            kind,
            persisted,
            delivery_a,
            delivery_b,
        }
    }

    /// Looks up the requester's default topic, preferring a topic of the
    /// first shared tag when the pair has one.
    async fn resolve_topic(
        &self,
        requester: &Participant,
        candidate: &Participant,
    ) -> (Option<Topic>, Option<Metatopic>) {
        tracing::debug!(participant = %requester.id(), stage = "resolving", "resolving topic");
        let Some(primary) = requester.primary_tag() else {
            return (None, None);
        };

        let mut topic = self.lookup_topic(primary).await;
        let shared = shared_tags(requester.tags(), candidate.tags());
        if let Some(first_shared) = shared.first()
            && let Some(shared_topic) = self.lookup_topic(first_shared).await
        {
            topic = Some(shared_topic);
        }

        let metatopic = match self.store.find_approved_metatopic_by_name(primary).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(metatopic = primary, error = %e, "can't get metatopic by name");
                None
            }
        };

        (topic, metatopic)
    }

    async fn lookup_topic(&self, metatopic: &str) -> Option<Topic> {
        match self.store.find_approved_topic_by_metatopic_name(metatopic).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(metatopic, error = %e, "can't get topic by metatopic");
                None
            }
        }
    }

    async fn announce(
        &self,
        result: &MatchResult,
        recipient: &Participant,
    ) -> Result<DeliveryReport, GatewayError> {
        let notification = MatchNotification::for_recipient(result, recipient.id()).ok_or_else(
            || GatewayError::Internal(format!("{} is not part of room {}", recipient.id(), result.room_id)),
        )?;
        let payload = serde_json::to_string(&notification)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        let outcome = self.notifier.deliver_to(recipient, &payload).await;
        self.report_delivery(Some(result.room_id), recipient.id(), &outcome);
        outcome
    }

    fn report_delivery(
        &self,
        room: Option<RoomId>,
        recipient: &ParticipantId,
        outcome: &Result<DeliveryReport, GatewayError>,
    ) {
        match outcome {
            Ok(report) => {
                tracing::debug!(participant = %recipient, attempts = report.attempts, "delivered");
            }
            Err(GatewayError::DeliveryAbandoned { attempts, .. }) => {
                let _ = self.event_bus.publish(MatchEvent::DeliveryAbandoned {
                    room,
                    participant: recipient.clone(),
                    attempts: *attempts,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                tracing::info!(participant = %recipient, error = %e, "delivery stopped");
            }
        }
    }
}
