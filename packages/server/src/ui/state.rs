//! Server state and request parameters.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    config::SessionSettings,
    domain::{MessageRepository, RoomId, RoomRegistry, Username, ValueObjectError},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub username: Option<String>,
    pub room: Option<String>,
}

impl ConnectQuery {
    /// Both parameters must be non-blank after trimming
    pub fn validate(&self) -> Result<(Username, RoomId), ValueObjectError> {
        let username = Username::new(self.username.clone().unwrap_or_default())?;
        let room = RoomId::new(self.room.clone().unwrap_or_default())?;
        Ok((username, room))
    }
}

/// Query parameters for the history endpoint.
///
/// `page` and `limit` stay raw strings so that garbage falls back to the
/// defaults instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub room: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Live membership (in-memory)
    pub registry: Arc<dyn RoomRegistry>,
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn MessageRepository>,
    pub settings: SessionSettings,
}

impl AppState {
    pub fn new(
        registry: Arc<dyn RoomRegistry>,
        repository: Arc<dyn MessageRepository>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            registry,
            repository,
            settings,
        }
    }
}
