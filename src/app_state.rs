//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::PairingCoordinator;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pairing coordinator for all matchmaking logic.
    pub coordinator: Arc<PairingCoordinator>,
    /// Event bus carrying match and alert events.
    pub event_bus: EventBus,
}
