//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,
}

/// Errors raised by the persistent message log
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Any I/O, constraint or driver failure of the underlying store
    #[error("storage error: {0}")]
    Storage(String),

    /// Schema could not be created at startup
    #[error("failed to initialize storage schema: {0}")]
    SchemaInit(String),
}

/// Errors raised while writing to a single client connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The connection was already closed
    #[error("connection closed")]
    Closed,

    /// The write did not complete within the send timeout
    #[error("send timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Transport level failure
    #[error("transport error: {0}")]
    Transport(String),
}
