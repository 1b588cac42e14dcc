//! Retrying delivery of payloads to participant sinks.
//!
//! Failed writes are retried with exponential backoff: the delay starts at
//! [`BackoffPolicy::initial_delay`] and doubles after every failure. Once the
//! doubled delay would reach the cap, one last attempt is made after the
//! capped delay and the delivery is abandoned. Abandonment is returned to
//! the caller as [`GatewayError::DeliveryAbandoned`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::domain::{Participant, ParticipantId, ParticipantSink};
use crate::error::GatewayError;

/// Exponential backoff schedule for notification retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// No retry waits longer than this.
    pub max_delay: Duration,
}

impl BackoffPolicy {
    /// Smallest delay used when `initial_delay` is zero.
    const MIN_DELAY: Duration = Duration::from_millis(1);

    /// Creates a policy with the given bounds.
    #[must_use]
    pub const fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
        }
    }

    /// Delays to wait before each retry, in order.
    ///
    /// With the defaults this is 1s, 2s, 4s, 8s, 10s.
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay.max(Self::MIN_DELAY);
        loop {
            if delay >= self.max_delay {
                delays.push(self.max_delay);
                return delays;
            }
            delays.push(delay);
            delay = delay.saturating_mul(2);
        }
    }

    /// Total number of write attempts, the first one included.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        u32::try_from(self.delays().len())
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10))
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Write attempts made, the successful one included.
    pub attempts: u32,
}

/// Delivers text payloads with retry and backoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct Notifier {
    policy: BackoffPolicy,
}

impl Notifier {
    /// Creates a notifier using `policy`.
    #[must_use]
    pub const fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    /// Returns the backoff policy.
    #[must_use]
    pub const fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Delivers `payload` to the participant's own sink, stopping early if
    /// its connection closes.
    ///
    /// # Errors
    ///
    /// See [`Notifier::deliver`].
    pub async fn deliver_to(
        &self,
        participant: &Participant,
        payload: &str,
    ) -> Result<DeliveryReport, GatewayError> {
        self.deliver(participant.id(), participant.sink(), payload, participant.closed())
            .await
    }

    /// Writes `payload` to `sink`, retrying failed writes on the backoff
    /// schedule.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::DeliveryAbandoned`] when every attempt failed.
    /// - [`GatewayError::DeliveryCancelled`] when `cancel` fires first.
    pub async fn deliver(
        &self,
        recipient: &ParticipantId,
        sink: &dyn ParticipantSink,
        payload: &str,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReport, GatewayError> {
        let mut delays = self.policy.delays().into_iter();
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(GatewayError::DeliveryCancelled(recipient.clone()));
            }
            attempts = attempts.saturating_add(1);

            let err = match sink.send_text(payload).await {
                Ok(()) => return Ok(DeliveryReport { attempts }),
                Err(err) => err,
            };

            let Some(delay) = delays.next() else {
                tracing::error!(participant = %recipient, attempts, error = %err, "delivery abandoned");
                return Err(GatewayError::DeliveryAbandoned {
                    participant: recipient.clone(),
                    attempts,
                });
            };
            tracing::warn!(
                participant = %recipient,
                attempts,
                retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "delivery failed, retrying"
            );

            tokio::select! {
                () = cancel.cancelled() => {
                    return Err(GatewayError::DeliveryCancelled(recipient.clone()));
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
