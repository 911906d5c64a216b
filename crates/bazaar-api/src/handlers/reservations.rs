//! Reservation handlers
//!
//! Staff fulfillment: dispatch to the operational room and shelf placement.

use axum::{extract::State, Json};
use bazaar_service::dto::{DispatchResponse, MarkPlacedRequest, PlacementResponse};
use bazaar_service::ReservationService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /reservations/dispatch
pub async fn dispatch(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DispatchResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.dispatch(&auth.identity).await?;
    Ok(Json(response))
}

/// POST /reservations/placed
pub async fn mark_placed(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<MarkPlacedRequest>,
) -> ApiResult<Json<PlacementResponse>> {
    let service = ReservationService::new(state.service_context());
    let response = service.mark_placed(request, &auth.identity).await?;
    Ok(Json(response))
}
