//! Live room membership, as seen by the domain.

use async_trait::async_trait;

use super::{
    entity::Client,
    value_object::{ConnectionId, RoomId},
};

/// Concurrent mapping from room to the clients currently connected to it.
///
/// All membership reads and writes go through this trait. Operations on the
/// same room are linearizable; operations on different rooms do not contend.
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Register `client` in its room, creating the room on first sight
    async fn join(&self, client: Client);

    /// Remove a client from `room`.
    ///
    /// Returns `false` when it was already gone; double removal is expected
    /// when a failed delivery and the session's own cleanup race.
    async fn leave(&self, room: &RoomId, client_id: &ConnectionId) -> bool;

    /// Point-in-time copy of the room's members, safe to iterate while
    /// other callers join or leave
    async fn snapshot(&self, room: &RoomId) -> Vec<Client>;

    /// Every non-empty room with its members, sorted by room id
    async fn rooms(&self) -> Vec<(RoomId, Vec<Client>)>;

    async fn member_count(&self, room: &RoomId) -> usize {
        self.snapshot(room).await.len()
    }
}
