//! Message handlers
//!
//! Endpoints for message operations.

use axum::{
    extract::{Query, State},
    Json,
};
use bazaar_service::dto::{
    CreateMessageRequest, DeleteMessageQuery, MessageResponse, MessagesQuery, UpdateMessageRequest,
};
use bazaar_service::MessageService;
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Get messages in room, oldest first
///
/// GET /rooms/{room_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
    ValidatedQuery(query): ValidatedQuery<MessagesQuery>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let messages = service.get_messages(room_id, query, &auth.identity).await?;
    Ok(Json(messages))
}

/// Create message
///
/// POST /rooms/{room_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(room_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateMessageRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = MessageService::new(state.service_context());
    let response = service.post_message(room_id, request, &auth.identity).await?;
    Ok(Created(Json(response)))
}

/// Update message
///
/// PATCH /messages/{message_id}
pub async fn update_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMessageRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = MessageService::new(state.service_context());
    let response = service.edit_message(message_id, request, &auth.identity).await?;
    Ok(Json(response))
}

/// Delete message for everyone, or hide it for the caller with `?scope=me`
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<Uuid>,
    query: Result<Query<DeleteMessageQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<NoContent> {
    let Query(query) = query.map_err(|e| ApiError::invalid_query(e.body_text()))?;

    let service = MessageService::new(state.service_context());
    service
        .delete_message(message_id, query.scope, &auth.identity)
        .await?;
    Ok(NoContent)
}
