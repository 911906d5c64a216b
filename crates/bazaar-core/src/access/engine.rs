use serde::Serialize;
use uuid::Uuid;

use crate::entities::{Room, Visibility};
use crate::value_objects::{MemberRole, Role};

/// Everything the engine needs to know about one room and one caller
#[derive(Debug, Clone, Copy)]
pub struct RoomAccess<'a> {
    pub room: &'a Room,
    /// The caller's membership, if any
    pub membership: Option<MemberRole>,
    /// Whether the room has any membership rows at all
    pub has_members: bool,
    /// Whether the caller is on the room's blacklist
    pub blacklisted: bool,
}

impl<'a> RoomAccess<'a> {
    /// Build the context for `user_id`, reading the blacklist from the room config
    #[must_use]
    pub fn for_user(room: &'a Room, user_id: Uuid, membership: Option<MemberRole>, has_members: bool) -> Self {
        Self {
            room,
            membership,
            has_members: has_members || membership.is_some(),
            blacklisted: room.config.is_blacklisted(user_id),
        }
    }

    #[inline]
    fn is_member(&self) -> bool {
        self.membership.is_some()
    }
}

/// Read and post permission for one caller in one room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AccessDecision {
    pub can_read: bool,
    pub can_post: bool,
}

impl AccessDecision {
    const DENY: Self = Self {
        can_read: false,
        can_post: false,
    };

    const fn both(allowed: bool) -> Self {
        Self {
            can_read: allowed,
            can_post: allowed,
        }
    }
}

/// Decide read and post together
///
/// Channels go through an ordered rule list; the first matching rule wins:
/// blacklist, then the staff-only reserved-orders room, then admin-only rooms,
/// then visibility. Other rooms are closed to non-members once they have any
/// members, and otherwise readable by all and writable by workers and above.
#[must_use]
pub fn decide(access: &RoomAccess<'_>, role: Role) -> AccessDecision {
    if !access.room.is_channel() {
        if access.has_members {
            return AccessDecision::both(access.is_member());
        }
        return AccessDecision {
            can_read: true,
            can_post: role.is_worker_or_above(),
        };
    }

    if access.blacklisted && !role.is_staff() {
        return AccessDecision::DENY;
    }

    if access.room.is_reserved_orders() && role == Role::Client {
        return AccessDecision::DENY;
    }

    if access.room.is_admin_only() {
        return AccessDecision::both(role.is_staff());
    }

    match access.room.visibility() {
        Visibility::Public => AccessDecision {
            can_read: true,
            can_post: role.is_staff(),
        },
        Visibility::Private => AccessDecision::both(role.is_worker_or_above() || access.is_member()),
    }
}

#[must_use]
pub fn can_read(access: &RoomAccess<'_>, role: Role) -> bool {
    decide(access, role).can_read
}

#[must_use]
pub fn can_post(access: &RoomAccess<'_>, role: Role) -> bool {
    decide(access, role).can_post
}
