//! WebSocket layer: upgrade, per-connection loop, message shapes, and the
//! socket-backed participant sink.
//!
//! The endpoint at `/ws` accepts join requests and pushes match
//! notifications back on the same socket.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod sink;
