//! Error types for the domain layer.

use thiserror::Error;

/// Validation errors raised by value object constructors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The value was empty after trimming
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// The value exceeded the allowed length
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Errors raised when pushing events to connections.
#[derive(Debug, Error)]
pub enum PushError {
    /// The target connection is not registered with the pusher
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),

    /// The transport-level write failed
    #[error("failed to push event: {0}")]
    PushFailed(String),
}
