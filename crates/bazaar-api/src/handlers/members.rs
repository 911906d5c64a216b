//! Member handlers
//!
//! Endpoints for room membership.

use axum::{extract::State, Json};
use bazaar_service::dto::{AddMemberRequest, MemberResponse, UpdateMemberRoleRequest};
use bazaar_service::MemberService;
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /rooms/{room_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let members = service.list_members(room_id, &auth.identity).await?;
    Ok(Json(members))
}

/// POST /rooms/{room_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let member = service.add_member(room_id, request, &auth.identity).await?;
    Ok(Created(Json(member)))
}

/// PATCH /rooms/{room_id}/members/{user_id}
pub async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath((room_id, user_id)): IdPath<(Uuid, Uuid)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MemberService::new(state.service_context());
    let member = service
        .set_member_role(room_id, user_id, request, &auth.identity)
        .await?;
    Ok(Json(member))
}

/// Remove a member, or leave when `user_id` is the caller
///
/// DELETE /rooms/{room_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath((room_id, user_id)): IdPath<(Uuid, Uuid)>,
) -> ApiResult<NoContent> {
    let service = MemberService::new(state.service_context());
    service.remove_member(room_id, user_id, &auth.identity).await?;
    Ok(NoContent)
}
