//! # matchmaking-gateway
//!
//! WebSocket gateway that pairs waiting participants by overlapping
//! interest tags, records each pairing, and notifies both sides with
//! retrying delivery.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler (ws/)
//!     ├── REST Handlers (api/)
//!     │
//!     ├── PairingCoordinator (service/)
//!     │     ├── Notifier (retry + backoff)
//!     │     └── Scheduler (re-scan, wait timeout)
//!     ├── EventBus (domain/)
//!     │
//!     ├── ParticipantRegistry + selector (domain/)
//!     │
//!     └── MatchStore: PostgreSQL / in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod router;
pub mod service;
pub mod ws;

#[cfg(test)]
mod test_support;
