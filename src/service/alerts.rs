//! Logs operational events from the [`EventBus`].
//!
//! Persistence failures and abandoned deliveries are recovered locally by
//! the coordinator; this consumer is where they become `error` level
//! alerts.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::{EventBus, MatchEvent};

/// Spawns a task that logs every event published on `event_bus`.
#[must_use]
pub fn spawn_alert_logger(event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    log_event(&event);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "alert logger lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Logs one event; alerts at `error`, everything else at `debug`.
/// Returns whether the event was treated as an alert.
fn log_event(event: &MatchEvent) -> bool {
    let kind = event.event_type_str();
    let payload = serde_json::to_string(event).unwrap_or_default();
    if event.is_alert() {
        tracing::error!(event = kind, room = ?event.room(), %payload, "match needs attention");
        true
    } else {
        tracing::debug!(event = kind, %payload, "match event");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::RoomId;

    #[test]
    fn alerts_follow_event_classification() {
        let abandoned = MatchEvent::DeliveryAbandoned {
            room: Some(RoomId::new()),
            participant: "1".into(),
            attempts: 6,
            timestamp: Utc::now(),
        };
        let left = MatchEvent::ParticipantLeft {
            participant: "1".into(),
            timestamp: Utc::now(),
        };
        assert!(log_event(&abandoned));
        assert!(!log_event(&left));
    }

    #[tokio::test]
    async fn logger_exits_when_bus_is_dropped() {
        let bus = EventBus::new(8);
        let handle = spawn_alert_logger(&bus);
        let _ = bus.publish(MatchEvent::ParticipantLeft {
            participant: "1".into(),
            timestamp: Utc::now(),
        });
        drop(bus);
        assert!(handle.await.is_ok());
    }
}
