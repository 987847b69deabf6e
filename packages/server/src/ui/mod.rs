//! UI layer: axum HTTP + WebSocket surface of the sync server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
