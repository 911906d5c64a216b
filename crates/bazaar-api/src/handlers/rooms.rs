//! Room handlers
//!
//! Room listing, lookup, and creation of direct and group rooms.

use axum::{extract::State, Json};
use bazaar_service::dto::{CreateRoomRequest, RoomResponse};
use bazaar_service::RoomService;
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Rooms the caller can read, most recently active first
///
/// GET /rooms
pub async fn list_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RoomResponse>>> {
    let service = RoomService::new(state.service_context());
    let rooms = service.list_rooms(&auth.identity).await?;
    Ok(Json(rooms))
}

/// GET /rooms/{room_id}
pub async fn get_room(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
) -> ApiResult<Json<RoomResponse>> {
    let service = RoomService::new(state.service_context());
    let room = service.get_room(room_id, &auth.identity).await?;
    Ok(Json(room))
}

/// Create a direct or group room
///
/// POST /rooms
pub async fn create_room(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateRoomRequest>,
) -> ApiResult<Created<Json<RoomResponse>>> {
    let service = RoomService::new(state.service_context());
    let room = service.create_room(request, &auth.identity).await?;
    Ok(Created(Json(room)))
}
