//! Service layer: pairing orchestration, delivery, and background tasks.
//!
//! [`PairingCoordinator`] claims pairs from the registry, resolves topics,
//! persists matches, and hands notifications to the [`Notifier`].

pub mod alerts;
pub mod coordinator;
pub mod notifier;
pub mod scheduler;

pub use coordinator::{PairingCoordinator, PairingOutcome, PairingReport};
pub use notifier::{BackoffPolicy, DeliveryReport, Notifier};
pub use scheduler::{SchedulerConfig, spawn_scheduler};
