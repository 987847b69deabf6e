//! Sync client for the bansou board sync server.
//!
//! `SyncSession` owns one persistent WebSocket connection, joins one team
//! room at a time, translates local board mutations into outbound events
//! and hands inbound events to registered callbacks. Incoming
//! `task-updated` / `columns-updated` events are invalidation signals: the
//! application is expected to re-fetch authoritative board state through
//! `reconcile::BoardApi` rather than apply the payload directly.

pub mod callbacks;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod reconcile;
pub mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
pub use session::{SessionConfig, SessionState, SyncSession};
