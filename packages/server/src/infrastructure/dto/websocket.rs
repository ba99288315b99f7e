//! WebSocket message DTOs for the chat relay.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, RelayedMessage};

/// A chat message as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    /// `None` when the message was delivered without being persisted
    pub id: Option<i64>,
    pub room: String,
    pub sender: String,
    pub content: String,
    /// Unix timestamp (milliseconds since epoch)
    pub ts: i64,
}

impl From<&ChatMessage> for MessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: Some(message.id.value()),
            room: message.room.as_str().to_string(),
            sender: message.sender.as_str().to_string(),
            content: message.content.clone(),
            ts: message.timestamp.value(),
        }
    }
}

impl From<&RelayedMessage> for MessageDto {
    fn from(message: &RelayedMessage) -> Self {
        Self {
            id: message.id.map(|id| id.value()),
            room: message.room.as_str().to_string(),
            sender: message.sender.as_str().to_string(),
            content: message.content.clone(),
            ts: message.timestamp.value(),
        }
    }
}

/// Events pushed from the server to a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// A chat message fanned out to the whole room
    Message { message: MessageDto },
    /// A notice for this connection only; never persisted
    System { text: String, ts: i64 },
}
