//! Global and per-room roles

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Global role of a user, in ascending privilege order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Client,
    Worker,
    Admin,
    Creator,
}

impl Role {
    /// All roles, lowest privilege first
    pub const ALL: [Role; 4] = [Role::Client, Role::Worker, Role::Admin, Role::Creator];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Worker => "worker",
            Self::Admin => "admin",
            Self::Creator => "creator",
        }
    }

    /// Admin or creator
    #[inline]
    #[must_use]
    pub fn is_staff(self) -> bool {
        self >= Self::Admin
    }

    /// Worker, admin, or creator
    #[inline]
    #[must_use]
    pub fn is_worker_or_above(self) -> bool {
        self >= Self::Worker
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "worker" => Ok(Self::Worker),
            "admin" => Ok(Self::Admin),
            "creator" => Ok(Self::Creator),
            other => Err(DomainError::ValidationError(format!("unknown role: {other}"))),
        }
    }
}

/// Role of a member inside one room
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    Moderator,
    Owner,
}

impl MemberRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Moderator => "moderator",
            Self::Member => "member",
        }
    }

    /// Owners and moderators may add and remove members
    #[inline]
    #[must_use]
    pub fn can_manage_members(self) -> bool {
        matches!(self, Self::Owner | Self::Moderator)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "moderator" => Ok(Self::Moderator),
            "member" => Ok(Self::Member),
            other => Err(DomainError::ValidationError(format!("unknown member role: {other}"))),
        }
    }
}

/// Verified caller identity attached to every inbound operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    #[inline]
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Client < Role::Worker);
        assert!(Role::Worker < Role::Admin);
        assert!(Role::Admin < Role::Creator);
    }

    #[test]
    fn test_role_predicates() {
        assert!(!Role::Client.is_worker_or_above());
        assert!(Role::Worker.is_worker_or_above());
        assert!(!Role::Worker.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(Role::Creator.is_staff());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" worker ".parse::<Role>().unwrap(), Role::Worker);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_member_role_management() {
        assert!(MemberRole::Owner.can_manage_members());
        assert!(MemberRole::Moderator.can_manage_members());
        assert!(!MemberRole::Member.can_manage_members());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Creator).unwrap(), "\"creator\"");
        let parsed: MemberRole = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(parsed, MemberRole::Moderator);
    }
}
