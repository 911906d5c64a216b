//! Blacklist service

use bazaar_core::entities::BlacklistEntry;
use bazaar_core::traits::BlacklistChange;
use bazaar_core::{DomainError, Identity, RoomEvent};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{BlacklistAction, BlacklistRequest};

use super::access::require_staff;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Blacklist service
pub struct BlacklistService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BlacklistService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add or remove a user on a channel's blacklist
    ///
    /// Adding also drops the user's membership. Staff cannot be blacklisted.
    #[instrument(skip(self, request))]
    pub async fn set_blacklist(
        &self,
        room_id: Uuid,
        request: BlacklistRequest,
        caller: &Identity,
    ) -> ServiceResult<Vec<BlacklistEntry>> {
        require_staff(caller)?;

        let change = match request.action {
            BlacklistAction::Add => {
                let target = self
                    .ctx
                    .user_repo()
                    .find_by_id(request.user_id)
                    .await?
                    .ok_or(DomainError::UserNotFound(request.user_id))?;
                if target.role.is_staff() {
                    return Err(DomainError::Forbidden("staff cannot be blacklisted".into()).into());
                }
                BlacklistChange::Add(BlacklistEntry::new(
                    request.user_id,
                    Some(caller.user_id),
                    request.reason.as_deref(),
                ))
            }
            BlacklistAction::Remove => BlacklistChange::Remove(request.user_id),
        };

        let room = self.ctx.room_repo().update_blacklist(room_id, change).await?;

        info!(room_id = %room_id, user_id = %request.user_id, action = ?request.action, "Blacklist updated");
        self.ctx.publish(&[RoomEvent::room_updated(room.id, room.kind)]).await;

        Ok(room.config.shared().blacklist.clone())
    }
}
