//! Test doubles shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Participant, ParticipantSink};
use crate::error::GatewayError;

/// Sink that records delivered frames and can be told to fail.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    sent: Mutex<Vec<String>>,
    attempts: AtomicU32,
    failures_left: AtomicU32,
}

impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fails the first `failures` attempts, then succeeds.
    pub(crate) fn failing(failures: u32) -> Arc<Self> {
        let sink = Self::default();
        sink.failures_left.store(failures, Ordering::SeqCst);
        Arc::new(sink)
    }

    /// Never succeeds.
    pub(crate) fn broken() -> Arc<Self> {
        Self::failing(u32::MAX)
    }

    pub(crate) async fn sent(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ParticipantSink for RecordingSink {
    async fn send_text(&self, text: &str) -> Result<(), GatewayError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(GatewayError::DeliveryFailed("socket closed".to_string()));
        }
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }
}

/// Participant with a fresh recording sink.
pub(crate) fn participant(id: &str, tags: &[&str]) -> Participant {
    participant_with_sink(id, tags, &RecordingSink::new())
}

/// Participant delivering into `sink`.
pub(crate) fn participant_with_sink(
    id: &str,
    tags: &[&str],
    sink: &Arc<RecordingSink>,
) -> Participant {
    let sink: Arc<dyn ParticipantSink> = Arc::clone(sink) as Arc<dyn ParticipantSink>;
    Participant::new(
        id.into(),
        tags.iter().map(|t| (*t).to_string()).collect(),
        sink,
    )
}
