//! Room membership

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{MemberRole, Role};

/// A user's membership in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    #[must_use]
    pub fn new(room_id: Uuid, user_id: Uuid, role: MemberRole) -> Self {
        Self {
            room_id,
            user_id,
            role,
            joined_at: Utc::now(),
        }
    }
}

/// Membership role a staff user should hold in a reconciled system room
///
/// Creators own the room, admins moderate it, and workers are plain members
/// when the room admits them. Everyone else has no place there.
#[must_use]
pub fn staff_member_role(role: Role, include_workers: bool) -> Option<MemberRole> {
    match role {
        Role::Creator => Some(MemberRole::Owner),
        Role::Admin => Some(MemberRole::Moderator),
        Role::Worker if include_workers => Some(MemberRole::Member),
        Role::Worker | Role::Client => None,
    }
}

/// Global roles admitted to a reconciled system room
#[must_use]
pub fn staff_roles(include_workers: bool) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|r| staff_member_role(*r, include_workers).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_member_role() {
        assert_eq!(staff_member_role(Role::Creator, false), Some(MemberRole::Owner));
        assert_eq!(staff_member_role(Role::Admin, false), Some(MemberRole::Moderator));
        assert_eq!(staff_member_role(Role::Worker, false), None);
        assert_eq!(staff_member_role(Role::Worker, true), Some(MemberRole::Member));
        assert_eq!(staff_member_role(Role::Client, true), None);
    }

    #[test]
    fn test_staff_roles() {
        assert_eq!(staff_roles(false), vec![Role::Admin, Role::Creator]);
        assert_eq!(staff_roles(true), vec![Role::Worker, Role::Admin, Role::Creator]);
    }
}
