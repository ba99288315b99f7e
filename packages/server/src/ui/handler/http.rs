//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use heya_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{Pagination, RoomId},
    infrastructure::dto::{
        http::{ParticipantDetailDto, RoomSummaryDto},
        websocket::MessageDto,
    },
    ui::state::{AppState, HistoryQuery},
    usecase::GetHistoryUseCase,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of active rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.registry.rooms().await;

    let summaries = rooms
        .into_iter()
        .map(|(room, mut members)| {
            members.sort_by(|a, b| {
                a.connected_at
                    .cmp(&b.connected_at)
                    .then_with(|| a.username.as_str().cmp(b.username.as_str()))
            });
            RoomSummaryDto {
                id: room.into_string(),
                participants: members
                    .iter()
                    .map(|client| ParticipantDetailDto {
                        username: client.username.as_str().to_string(),
                        connected_at: timestamp_to_rfc3339(client.connected_at.value())
                            .unwrap_or_default(),
                    })
                    .collect(),
            }
        })
        .collect();

    Json(summaries)
}

/// `GET /history?room=&page=&limit=`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MessageDto>>, (StatusCode, &'static str)> {
    let room = RoomId::new(query.room.unwrap_or_default()).map_err(|e| {
        tracing::warn!("Rejecting history request: {}", e);
        (StatusCode::BAD_REQUEST, "room is required")
    })?;
    let pagination = Pagination::new(
        parse_number(query.page.as_deref()),
        parse_number(query.limit.as_deref()),
    );

    GetHistoryUseCase::new(state.repository.clone())
        .execute(&room, pagination)
        .await
        .map(|messages| Json(messages.iter().map(MessageDto::from).collect()))
        .map_err(|e| {
            tracing::error!("History query for room '{}' failed: {}", room, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        })
}

/// Non-numeric input is treated as absent
fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}
