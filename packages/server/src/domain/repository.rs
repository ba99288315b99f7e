//! Repository traits defined by the domain layer.
//!
//! Infrastructure provides the implementations (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, NewChatMessage},
    error::RepositoryError,
    value_object::{MessageId, Pagination, RoomId},
};

/// Append-only, room-partitioned message log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a message and return the identifier assigned to it.
    ///
    /// Identifiers are strictly increasing and unique across concurrent callers.
    async fn append(&self, message: &NewChatMessage) -> Result<MessageId, RepositoryError>;

    /// Messages of `room` ordered by timestamp ascending, windowed by `pagination`.
    ///
    /// An empty room or an offset past the end yields an empty vector.
    async fn query(
        &self,
        room: &RoomId,
        pagination: Pagination,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}
