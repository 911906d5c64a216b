//! Support service
//!
//! Staff bug reports and the client cart summary.

use bazaar_core::entities::{BugReportMeta, CartSummary, Message, SystemMeta, BUG_REPORT_TEXT_MAX};
use bazaar_core::{Identity, RoomEvent, SystemKey};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{BugReportRequest, CartSummaryResponse, MessageResponse};

use super::access::require_staff;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::message::clean_text;
use super::system_room::SystemRoomService;
use super::user::UserService;

/// Origin recorded on reports filed through the API
const REPORT_SOURCE: &str = "app";

/// Support service
pub struct SupportService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SupportService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// File a bug report into the bug-report room
    #[instrument(skip(self, request))]
    pub async fn submit_bug_report(
        &self,
        request: BugReportRequest,
        caller: &Identity,
    ) -> ServiceResult<MessageResponse> {
        require_staff(caller)?;

        let text = clean_text(&request.text, BUG_REPORT_TEXT_MAX)?;
        let reporter = UserService::new(self.ctx).get_user_entity(caller.user_id).await?;
        let room = SystemRoomService::new(self.ctx).ensure(SystemKey::BugReports).await?;

        let meta = SystemMeta::BugReport(BugReportMeta {
            reporter_id: reporter.id,
            reporter_email: Some(reporter.email.clone()),
            reporter_role: reporter.role,
            reporter_name: reporter.name.clone(),
            source: REPORT_SOURCE.to_string(),
        });

        let message = Message {
            id: Uuid::new_v4(),
            room_id: room.id,
            sender_id: Some(caller.user_id),
            text,
            meta: meta.to_value(),
            client_msg_id: None,
            created_at: Utc::now(),
        };
        let stored = self.ctx.message_repo().create(&message).await?;
        let response = MessageResponse::from(&stored);

        info!(message_id = %stored.id, room_id = %room.id, "Bug report filed");
        self.ctx
            .publish(&[RoomEvent::message_new(room.id, stored.id, response.to_value())])
            .await;

        Ok(response)
    }

    /// Cart totals with a ready-to-send reply line
    #[instrument(skip(self))]
    pub async fn cart_summary(&self, caller: &Identity) -> ServiceResult<CartSummaryResponse> {
        let lines = self.ctx.cart_repo().list(caller.user_id).await?;
        let summary = CartSummary::from_lines(&lines);

        Ok(CartSummaryResponse {
            total_sum: summary.total_sum,
            processed_sum: summary.processed_sum,
            reply: summary.reply_text(),
        })
    }
}
