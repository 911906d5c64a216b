//! Member service
//!
//! Room membership management, gated by the caller's membership role.

use bazaar_core::entities::Membership;
use bazaar_core::{DomainError, Identity, MemberRole, Room, RoomEvent};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{AddMemberRequest, MemberResponse, UpdateMemberRoleRequest};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Membership changes a caller may attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    Add(MemberRole),
    Remove,
    ChangeRole,
}

/// Decide whether `caller` may perform `action` given their membership
///
/// Admins and creators bypass room roles. Owners and moderators add and
/// remove; granting anything above `member` and changing roles is owner-only.
pub fn check_member_action(
    caller: &Identity,
    membership: Option<MemberRole>,
    action: MemberAction,
) -> Result<(), DomainError> {
    if caller.is_staff() {
        return Ok(());
    }

    let allowed = match (membership, action) {
        (Some(MemberRole::Owner), _) => true,
        (Some(MemberRole::Moderator), MemberAction::Add(MemberRole::Member) | MemberAction::Remove) => true,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::Forbidden("insufficient room role".into()))
    }
}

fn ensure_unmanaged(room: &Room) -> Result<(), DomainError> {
    if room.is_system() {
        return Err(DomainError::SystemRoomProtected);
    }
    Ok(())
}

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    /// Create a new MemberService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List members of a room the caller can read
    #[instrument(skip(self))]
    pub async fn list_members(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<Vec<MemberResponse>> {
        AccessService::new(self.ctx).require_read(room_id, caller).await?;
        let members = self.ctx.member_repo().list(room_id).await?;
        Ok(members.iter().map(MemberResponse::from).collect())
    }

    /// Add a user to a room
    #[instrument(skip(self, request))]
    pub async fn add_member(
        &self,
        room_id: Uuid,
        request: AddMemberRequest,
        caller: &Identity,
    ) -> ServiceResult<MemberResponse> {
        let gate = AccessService::new(self.ctx).gate(room_id, caller).await?;
        check_member_action(caller, gate.membership, MemberAction::Add(request.role))?;
        ensure_unmanaged(&gate.room)?;

        if self.ctx.user_repo().find_by_id(request.user_id).await?.is_none() {
            return Err(DomainError::UserNotFound(request.user_id).into());
        }
        if gate.room.config.is_blacklisted(request.user_id) {
            return Err(DomainError::Forbidden("user is blacklisted in this room".into()).into());
        }
        if self.ctx.member_repo().find(room_id, request.user_id).await?.is_some() {
            return Err(DomainError::AlreadyMember.into());
        }

        let membership = Membership::new(room_id, request.user_id, request.role);
        self.ctx.member_repo().add(&membership).await?;

        info!(room_id = %room_id, user_id = %request.user_id, role = request.role.as_str(), "Member added");
        self.ctx.publish(&[RoomEvent::room_updated(room_id, gate.room.kind)]).await;

        Ok(MemberResponse::from(&membership))
    }

    /// Remove a user from a room; any member may leave on their own
    #[instrument(skip(self))]
    pub async fn remove_member(&self, room_id: Uuid, user_id: Uuid, caller: &Identity) -> ServiceResult<()> {
        let gate = AccessService::new(self.ctx).gate(room_id, caller).await?;
        if user_id != caller.user_id {
            check_member_action(caller, gate.membership, MemberAction::Remove)?;
        }
        ensure_unmanaged(&gate.room)?;

        if !self.ctx.member_repo().remove(room_id, user_id).await? {
            return Err(DomainError::MemberNotFound.into());
        }

        info!(room_id = %room_id, user_id = %user_id, "Member removed");
        self.ctx.publish(&[RoomEvent::room_updated(room_id, gate.room.kind)]).await;
        Ok(())
    }

    /// Change a member's room role
    #[instrument(skip(self, request))]
    pub async fn set_member_role(
        &self,
        room_id: Uuid,
        user_id: Uuid,
        request: UpdateMemberRoleRequest,
        caller: &Identity,
    ) -> ServiceResult<MemberResponse> {
        let gate = AccessService::new(self.ctx).gate(room_id, caller).await?;
        check_member_action(caller, gate.membership, MemberAction::ChangeRole)?;
        ensure_unmanaged(&gate.room)?;

        if !self.ctx.member_repo().set_role(room_id, user_id, request.role).await? {
            return Err(DomainError::MemberNotFound.into());
        }
        let membership = self
            .ctx
            .member_repo()
            .find(room_id, user_id)
            .await?
            .ok_or(DomainError::MemberNotFound)?;

        info!(room_id = %room_id, user_id = %user_id, role = request.role.as_str(), "Member role changed");
        self.ctx.publish(&[RoomEvent::room_updated(room_id, gate.room.kind)]).await;

        Ok(MemberResponse::from(&membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::Role;

    fn who(role: Role) -> Identity {
        Identity::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_staff_bypass_room_roles() {
        let admin = who(Role::Admin);
        assert!(check_member_action(&admin, None, MemberAction::ChangeRole).is_ok());
        assert!(check_member_action(&admin, None, MemberAction::Add(MemberRole::Owner)).is_ok());
    }

    #[test]
    fn test_moderator_limits() {
        let worker = who(Role::Worker);
        let moderator = Some(MemberRole::Moderator);

        assert!(check_member_action(&worker, moderator, MemberAction::Add(MemberRole::Member)).is_ok());
        assert!(check_member_action(&worker, moderator, MemberAction::Remove).is_ok());
        assert!(check_member_action(&worker, moderator, MemberAction::Add(MemberRole::Moderator)).is_err());
        assert!(check_member_action(&worker, moderator, MemberAction::ChangeRole).is_err());
    }

    #[test]
    fn test_owner_and_member() {
        let client = who(Role::Client);
        assert!(check_member_action(&client, Some(MemberRole::Owner), MemberAction::ChangeRole).is_ok());
        assert!(matches!(
            check_member_action(&client, Some(MemberRole::Member), MemberAction::Remove),
            Err(DomainError::Forbidden(_))
        ));
        assert!(check_member_action(&client, None, MemberAction::Add(MemberRole::Member)).is_err());
    }
}
