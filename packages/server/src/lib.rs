//! Real-time Kanban board synchronization server.
//!
//! This library implements the event broker that keeps every browser tab
//! editing the same team board in sync: team rooms, presence tracking and
//! fan-out of board events to everyone in the room except the sender.
//! Board state itself is owned by the REST API; the events relayed here are
//! wake-up signals, not replicated state.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
