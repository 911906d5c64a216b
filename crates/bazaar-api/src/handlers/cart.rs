//! Cart handlers
//!
//! Client cart and reservation entry points.

use axum::{extract::State, Json};
use bazaar_service::dto::{
    AddToCartRequest, AddToCartResponse, CancelCartResponse, CartItemResponse, CartResponse,
    CartSummaryResponse, SetCartStatusRequest,
};
use bazaar_service::{CartService, SupportService};
use uuid::Uuid;

use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /cart
pub async fn get_cart(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<CartResponse>> {
    let service = CartService::new(state.service_context());
    let cart = service.list(&auth.identity).await?;
    Ok(Json(cart))
}

/// Reserve stock from a published item
///
/// POST /cart/items
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<AddToCartRequest>,
) -> ApiResult<Json<AddToCartResponse>> {
    let service = CartService::new(state.service_context());
    let response = service.add(request, &auth.identity).await?;
    Ok(Json(response))
}

/// Cancel a cart line and return its stock
///
/// DELETE /cart/items/{cart_item_id}
pub async fn cancel_item(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(cart_item_id): IdPath<Uuid>,
) -> ApiResult<Json<CancelCartResponse>> {
    let service = CartService::new(state.service_context());
    let response = service.cancel(cart_item_id, &auth.identity).await?;
    Ok(Json(response))
}

/// PUT /cart/items/{cart_item_id}/status
pub async fn set_item_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(cart_item_id): IdPath<Uuid>,
    Json(request): Json<SetCartStatusRequest>,
) -> ApiResult<Json<CartItemResponse>> {
    let service = CartService::new(state.service_context());
    let item = service.set_status(cart_item_id, request, &auth.identity).await?;
    Ok(Json(item))
}

/// Cart totals as the support bot phrases them
///
/// GET /cart/summary
pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CartSummaryResponse>> {
    let service = SupportService::new(state.service_context());
    let summary = service.cart_summary(&auth.identity).await?;
    Ok(Json(summary))
}
