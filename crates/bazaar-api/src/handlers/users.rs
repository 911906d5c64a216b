//! User handlers
//!
//! Profile lookup and global role management.

use axum::{extract::State, Json};
use bazaar_service::dto::{SetUserRoleRequest, UserResponse};
use bazaar_service::UserService;
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Get current user
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.get_current_user(&auth.identity).await?;
    Ok(Json(user))
}

/// List users (staff)
///
/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let users = service.list_users(&auth.identity).await?;
    Ok(Json(users))
}

/// Change a user's global role
///
/// PUT /users/{user_id}/role
pub async fn set_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(user_id): IdPath<Uuid>,
    Json(request): Json<SetUserRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    let user = service.set_role(user_id, request.role, &auth.identity).await?;
    Ok(Json(user))
}
