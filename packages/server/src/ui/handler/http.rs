//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{
            ErrorResponse, HealthResponse, NoticeKind, NoticeRequest, PresenceResponse,
            RoomMemberDto,
        },
        websocket::ServerEvent,
    },
    ui::state::AppState,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Accounts with at least one live connection
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceResponse> {
    let user_ids = state
        .coordinator
        .hub()
        .online_account_ids()
        .await
        .into_iter()
        .map(|id| id.value())
        .collect();
    Json(PresenceResponse { user_ids })
}

/// Live members of a room
pub async fn get_room_members(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<RoomMemberDto>>, ApiError> {
    let room_id: RoomId = room_id.parse().map_err(|_| bad_request("Invalid roomId"))?;
    let members = state.coordinator.hub().room_members(room_id).await;

    // Domain Model から DTO への変換
    Ok(Json(members.iter().map(RoomMemberDto::from).collect()))
}

/// Push a notice to every live member of a group room
pub async fn post_room_notice(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(notice): Json<NoticeRequest>,
) -> Result<StatusCode, ApiError> {
    let room_id: RoomId = room_id.parse().map_err(|_| bad_request("Invalid roomId"))?;
    if room_id.is_presence() {
        return Err(bad_request("Notices can only target group rooms"));
    }

    let event = match notice.kind {
        NoticeKind::ForbiddenWordAdded => ServerEvent::ForbiddenWordAdded { word: notice.word },
        NoticeKind::ForbiddenWordRemoved => ServerEvent::ForbiddenWordRemoved { word: notice.word },
    };
    let delivered = state.coordinator.hub().notify_room(room_id, &event).await;
    tracing::info!("Notice for room {} delivered to {} connection(s)", room_id, delivered);

    Ok(StatusCode::NO_CONTENT)
}
