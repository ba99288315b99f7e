//! Core domain models for the chat application.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{
    connection::ClientConnection,
    value_object::{ConnectionId, MessageId, RoomId, Timestamp, Username},
};

/// A chat message received from a connection but not yet appended to the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub room: RoomId,
    pub sender: Username,
    /// Arbitrary text; the relay does not bound or interpret it
    pub content: String,
    /// Receipt time, assigned by the connection session
    pub timestamp: Timestamp,
}

impl NewChatMessage {
    pub fn new(room: RoomId, sender: Username, content: String, timestamp: Timestamp) -> Self {
        Self {
            room,
            sender,
            content,
            timestamp,
        }
    }

    /// Attach the identifier assigned by the log
    pub fn into_persisted(self, id: MessageId) -> ChatMessage {
        ChatMessage {
            id,
            room: self.room,
            sender: self.sender,
            content: self.content,
            timestamp: self.timestamp,
        }
    }
}

/// Represents a persisted chat message in the domain model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Identifier assigned exactly once by the log
    pub id: MessageId,
    pub room: RoomId,
    pub sender: Username,
    pub content: String,
    pub timestamp: Timestamp,
}

/// A message as it is fanned out to a room.
///
/// `id` is `None` when the log rejected the message and it was delivered anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedMessage {
    pub id: Option<MessageId>,
    pub room: RoomId,
    pub sender: Username,
    pub content: String,
    pub timestamp: Timestamp,
}

impl From<ChatMessage> for RelayedMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: Some(message.id),
            room: message.room,
            sender: message.sender,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

impl From<NewChatMessage> for RelayedMessage {
    fn from(message: NewChatMessage) -> Self {
        Self {
            id: None,
            room: message.room,
            sender: message.sender,
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

/// A live connection's participation in one room.
///
/// The connection session that created it owns its lifecycle; the registry
/// only keeps a clone for lookup and delivery.
#[derive(Clone)]
pub struct Client {
    pub id: ConnectionId,
    pub username: Username,
    pub room: RoomId,
    pub connected_at: Timestamp,
    connection: Arc<dyn ClientConnection>,
}

impl Client {
    pub fn new(
        id: ConnectionId,
        username: Username,
        room: RoomId,
        connected_at: Timestamp,
        connection: Arc<dyn ClientConnection>,
    ) -> Self {
        Self {
            id,
            username,
            room,
            connected_at,
            connection,
        }
    }

    /// Send/close capability of this client
    pub fn connection(&self) -> &Arc<dyn ClientConnection> {
        &self.connection
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("room", &self.room)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Client {}
