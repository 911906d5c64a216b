//! Catalog handlers
//!
//! Submission, moderation, and publication of catalog items.

use axum::{
    extract::{Query, State},
    Json,
};
use bazaar_service::dto::{
    CatalogItemResponse, PendingQueueQuery, PostRoomResponse, PublishQueueRequest, PublishResponse,
    QueueEntryResponse, SearchCatalogQuery, SubmitCatalogItemRequest,
};
use bazaar_service::CatalogService;
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath, ValidatedJson, ValidatedQuery};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Queue a new item for publication
///
/// POST /catalog/items
pub async fn submit_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SubmitCatalogItemRequest>,
) -> ApiResult<Created<Json<QueueEntryResponse>>> {
    let service = CatalogService::new(state.service_context());
    let entry = service.submit(request, &auth.identity).await?;
    Ok(Created(Json(entry)))
}

/// GET /catalog/items/{item_id}
pub async fn get_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    IdPath(item_id): IdPath<Uuid>,
) -> ApiResult<Json<CatalogItemResponse>> {
    let service = CatalogService::new(state.service_context());
    let item = service.get_item(item_id).await?;
    Ok(Json(item))
}

/// Queue an existing item again with fresh details
///
/// POST /catalog/items/{item_id}/requeue
pub async fn requeue_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath<Uuid>,
    ValidatedJson(request): ValidatedJson<SubmitCatalogItemRequest>,
) -> ApiResult<Created<Json<QueueEntryResponse>>> {
    let service = CatalogService::new(state.service_context());
    let entry = service.requeue(item_id, request, &auth.identity).await?;
    Ok(Created(Json(entry)))
}

/// Archive an item; its code becomes reusable later
///
/// POST /catalog/items/{item_id}/archive
pub async fn archive_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(item_id): IdPath<Uuid>,
) -> ApiResult<Json<CatalogItemResponse>> {
    let service = CatalogService::new(state.service_context());
    let item = service.archive(item_id, &auth.identity).await?;
    Ok(Json(item))
}

/// GET /catalog/search?q=
pub async fn search_items(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<SearchCatalogQuery>,
) -> ApiResult<Json<Vec<CatalogItemResponse>>> {
    let service = CatalogService::new(state.service_context());
    let items = service.search(&query.q, &auth.identity).await?;
    Ok(Json(items))
}

/// Rooms the caller may target with a submission
///
/// GET /catalog/post-rooms
pub async fn post_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<PostRoomResponse>>> {
    let service = CatalogService::new(state.service_context());
    let rooms = service.allowed_post_rooms(&auth.identity).await?;
    Ok(Json(rooms))
}

/// GET /catalog/queue
pub async fn pending_queue(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PendingQueueQuery>,
) -> ApiResult<Json<Vec<QueueEntryResponse>>> {
    let service = CatalogService::new(state.service_context());
    let entries = service.pending(query, &auth.identity).await?;
    Ok(Json(entries))
}

/// Publish queued entries by id or by room
///
/// POST /catalog/queue/publish
pub async fn publish_queue(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<PublishQueueRequest>,
) -> ApiResult<Json<PublishResponse>> {
    let service = CatalogService::new(state.service_context());
    let published = service.publish(request, &auth.identity).await?;
    Ok(Json(published))
}
