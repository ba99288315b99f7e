//! Domain layer for the chat relay.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod connection;
pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use connection::ClientConnection;
#[cfg(test)]
pub use connection::MockClientConnection;
pub use entity::{ChatMessage, Client, NewChatMessage, RelayedMessage};
pub use error::{DeliveryError, RepositoryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use registry::RoomRegistry;
pub use repository::MessageRepository;
#[cfg(test)]
pub use repository::MockMessageRepository;
pub use value_object::{
    ConnectionId, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MessageId, Pagination, RoomId, Timestamp,
    Username,
};
