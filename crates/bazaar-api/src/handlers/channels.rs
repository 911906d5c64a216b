//! Channel handlers
//!
//! Staff management of channels and their blacklists.

use axum::{extract::State, Json};
use bazaar_core::entities::BlacklistEntry;
use bazaar_service::dto::{
    BlacklistRequest, ChannelOverviewResponse, CreateChannelRequest, RoomResponse,
    UpdateChannelRequest,
};
use bazaar_service::{BlacklistService, RoomService};
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create channel
///
/// POST /channels
pub async fn create_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChannelRequest>,
) -> ApiResult<Created<Json<RoomResponse>>> {
    let service = RoomService::new(state.service_context());
    let room = service.create_channel(request, &auth.identity).await?;
    Ok(Created(Json(room)))
}

/// Update channel
///
/// PATCH /channels/{room_id}
pub async fn update_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateChannelRequest>,
) -> ApiResult<Json<RoomResponse>> {
    let service = RoomService::new(state.service_context());
    let room = service.update_channel(room_id, request, &auth.identity).await?;
    Ok(Json(room))
}

/// Delete channel
///
/// DELETE /channels/{room_id}
pub async fn delete_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
) -> ApiResult<NoContent> {
    let service = RoomService::new(state.service_context());
    service.delete_channel(room_id, &auth.identity).await?;
    Ok(NoContent)
}

/// Channel statistics and blacklist
///
/// GET /channels/{room_id}/overview
pub async fn get_overview(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
) -> ApiResult<Json<ChannelOverviewResponse>> {
    let service = RoomService::new(state.service_context());
    let overview = service.overview(room_id, &auth.identity).await?;
    Ok(Json(overview))
}

/// Add or remove a blacklist entry
///
/// POST /channels/{room_id}/blacklist
pub async fn update_blacklist(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<BlacklistRequest>,
) -> ApiResult<Json<Vec<BlacklistEntry>>> {
    let service = BlacklistService::new(state.service_context());
    let blacklist = service.set_blacklist(room_id, request, &auth.identity).await?;
    Ok(Json(blacklist))
}
