//! HTTP API response DTOs for the chat relay.

use serde::{Deserialize, Serialize};

/// Active room summary for the room list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub participants: Vec<ParticipantDetailDto>,
}

/// Participant detail for the room list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub username: String,
    pub connected_at: String, // ISO 8601
}
