//! Support handlers

use axum::{extract::State, Json};
use bazaar_service::dto::{BugReportRequest, MessageResponse};
use bazaar_service::SupportService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// File a bug report into the bug reports room
///
/// POST /support/bug-reports
pub async fn submit_bug_report(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<BugReportRequest>,
) -> ApiResult<Created<Json<MessageResponse>>> {
    let service = SupportService::new(state.service_context());
    let message = service.submit_bug_report(request, &auth.identity).await?;
    Ok(Created(Json(message)))
}
