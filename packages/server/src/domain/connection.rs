//! Outbound side of a client connection, as seen by the domain.

use async_trait::async_trait;

use super::error::DeliveryError;

/// Opaque send/close capability of one live connection.
///
/// Implementations must make `close` idempotent; after it returns every
/// further `send` fails with [`DeliveryError::Closed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientConnection: Send + Sync {
    /// Write one text frame to the peer
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;

    /// Close the connection
    fn close(&self);

    fn is_closed(&self) -> bool;
}
