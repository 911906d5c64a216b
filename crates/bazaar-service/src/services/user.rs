//! User service
//!
//! Profile lookup and global role administration.

use bazaar_core::entities::User;
use bazaar_core::{DomainError, Identity, Role};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::UserResponse;

use super::access::{require_role_change_allowed, require_staff};
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::system_room::SystemRoomService;

const USER_LIST_LIMIT: i64 = 500;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get user entity by ID
    #[instrument(skip(self))]
    pub async fn get_user_entity(&self, user_id: Uuid) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id).into())
    }

    /// Get the caller's profile
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, caller: &Identity) -> ServiceResult<UserResponse> {
        let user = self.get_user_entity(caller.user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// List users (admin/creator)
    #[instrument(skip(self))]
    pub async fn list_users(&self, caller: &Identity) -> ServiceResult<Vec<UserResponse>> {
        require_staff(caller)?;
        let users = self.ctx.user_repo().list(USER_LIST_LIMIT).await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Change a user's global role
    ///
    /// System room staffing follows the new role immediately.
    #[instrument(skip(self))]
    pub async fn set_role(&self, user_id: Uuid, role: Role, caller: &Identity) -> ServiceResult<UserResponse> {
        let target = self.get_user_entity(user_id).await?;
        require_role_change_allowed(caller, target.role, role)?;

        if target.role == role {
            return Ok(UserResponse::from(&target));
        }

        let updated = self.ctx.user_repo().set_role(user_id, role).await?;
        info!(user_id = %user_id, from = target.role.as_str(), to = role.as_str(), "User role changed");

        SystemRoomService::new(self.ctx).sync_staff().await?;

        Ok(UserResponse::from(&updated))
    }
}
