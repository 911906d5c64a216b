//! Access gates
//!
//! Loads room state for a caller and runs it through the access engine.

use bazaar_core::{decide, AccessDecision, DomainError, Identity, MemberRole, Role, Room, RoomAccess};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A room together with the caller's standing in it
#[derive(Debug, Clone)]
pub struct RoomGate {
    pub room: Room,
    pub membership: Option<MemberRole>,
    pub decision: AccessDecision,
}

/// Require admin or creator
pub fn require_staff(caller: &Identity) -> ServiceResult<()> {
    if caller.is_staff() {
        Ok(())
    } else {
        Err(ServiceError::permission_denied("admin or creator"))
    }
}

/// Require worker or above
pub fn require_worker(caller: &Identity) -> ServiceResult<()> {
    if caller.role.is_worker_or_above() {
        Ok(())
    } else {
        Err(ServiceError::permission_denied("worker"))
    }
}

/// Only a creator may hand out or take away the creator role
pub fn require_role_change_allowed(caller: &Identity, current: Role, next: Role) -> ServiceResult<()> {
    require_staff(caller)?;
    if (current == Role::Creator || next == Role::Creator) && caller.role != Role::Creator {
        return Err(ServiceError::permission_denied("creator"));
    }
    Ok(())
}

/// Access gate service
pub struct AccessService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AccessService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn load_room(&self, room_id: Uuid) -> ServiceResult<Room> {
        self.ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(room_id).into())
    }

    /// Evaluate an already loaded room
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    pub async fn evaluate(&self, room: Room, caller: &Identity) -> ServiceResult<RoomGate> {
        let membership = self
            .ctx
            .member_repo()
            .find(room.id, caller.user_id)
            .await?
            .map(|m| m.role);
        let has_members = membership.is_some() || self.ctx.member_repo().has_members(room.id).await?;

        let decision = decide(
            &RoomAccess::for_user(&room, caller.user_id, membership, has_members),
            caller.role,
        );

        Ok(RoomGate {
            room,
            membership,
            decision,
        })
    }

    pub async fn gate(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<RoomGate> {
        let room = self.load_room(room_id).await?;
        self.evaluate(room, caller).await
    }

    /// Load the room and fail with `CannotReadRoom` unless the caller can read it
    pub async fn require_read(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<RoomGate> {
        let gate = self.gate(room_id, caller).await?;
        if !gate.decision.can_read {
            debug!(room_id = %room_id, user_id = %caller.user_id, "Read denied");
            return Err(DomainError::CannotReadRoom.into());
        }
        Ok(gate)
    }

    /// Load the room and fail with `CannotPostInRoom` unless the caller can post in it
    pub async fn require_post(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<RoomGate> {
        let gate = self.gate(room_id, caller).await?;
        if !gate.decision.can_post {
            debug!(room_id = %room_id, user_id = %caller.user_id, "Post denied");
            return Err(DomainError::CannotPostInRoom.into());
        }
        Ok(gate)
    }

    /// Read check for subscriptions; a missing room simply cannot be read
    pub async fn can_read(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<bool> {
        match self.ctx.room_repo().find_by_id(room_id).await? {
            Some(room) => Ok(self.evaluate(room, caller).await?.decision.can_read),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who(role: Role) -> Identity {
        Identity::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_require_staff() {
        assert!(require_staff(&who(Role::Admin)).is_ok());
        assert!(require_staff(&who(Role::Creator)).is_ok());
        assert_eq!(require_staff(&who(Role::Worker)).unwrap_err().status_code(), 403);
    }

    #[test]
    fn test_require_worker() {
        assert!(require_worker(&who(Role::Worker)).is_ok());
        assert!(require_worker(&who(Role::Client)).is_err());
    }

    #[test]
    fn test_creator_role_changes() {
        let admin = who(Role::Admin);
        let creator = who(Role::Creator);

        assert!(require_role_change_allowed(&admin, Role::Client, Role::Worker).is_ok());
        assert!(require_role_change_allowed(&admin, Role::Client, Role::Creator).is_err());
        assert!(require_role_change_allowed(&admin, Role::Creator, Role::Admin).is_err());
        assert!(require_role_change_allowed(&creator, Role::Creator, Role::Admin).is_ok());
        assert!(require_role_change_allowed(&who(Role::Worker), Role::Client, Role::Worker).is_err());
    }
}
