//! Data Transfer Objects for the sync server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: event envelopes exchanged over the WebSocket
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
