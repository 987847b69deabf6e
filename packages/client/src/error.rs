//! Error types for the sync client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The WebSocket connection could not be established or was lost
    #[error("connection error: {0}")]
    Connection(String),

    /// An operation required an open connection
    #[error("not connected to the sync server")]
    NotConnected,

    /// An emit required a joined team room
    #[error("not joined to a team")]
    NotJoined,

    /// `connect` was called on a session that is already connected
    #[error("session is already connected")]
    AlreadyConnected,

    /// The board re-fetch against the REST API failed
    #[error("board api request failed: {0}")]
    Api(#[from] reqwest::Error),
}
