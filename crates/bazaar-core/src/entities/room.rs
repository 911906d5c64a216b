//! Room entity - channels, direct chats, and group chats

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::room_config::{RoomConfig, SystemKey, Visibility, BUG_REPORTS_TITLE, RESERVED_ORDERS_TITLE};
use crate::error::DomainError;

/// Kind of room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Broadcast-oriented room
    #[default]
    Channel,
    /// One-to-one chat
    Direct,
    /// Multi-user chat
    Group,
}

impl RoomKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Direct => "direct",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "channel" => Ok(Self::Channel),
            "direct" => Ok(Self::Direct),
            "group" => Ok(Self::Group),
            other => Err(DomainError::ValidationError(format!("unknown room kind: {other}"))),
        }
    }
}

/// Room entity
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub title: Option<String>,
    pub kind: RoomKind,
    /// User who created the room; `None` for rooms created by the reconciler at boot
    pub created_by: Option<Uuid>,
    pub config: RoomConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    #[must_use]
    pub fn new(id: Uuid, title: Option<String>, kind: RoomKind, created_by: Option<Uuid>, config: RoomConfig) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            kind,
            created_by,
            config,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_channel(&self) -> bool {
        matches!(self.kind, RoomKind::Channel)
    }

    #[inline]
    #[must_use]
    pub fn system_key(&self) -> Option<SystemKey> {
        self.config.system_key()
    }

    #[inline]
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.system_key().is_some()
    }

    /// Visibility for channels; other rooms are treated as private
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        if self.is_channel() {
            self.config.visibility()
        } else {
            Visibility::Private
        }
    }

    /// The staff-only operational room
    #[must_use]
    pub fn is_reserved_orders(&self) -> bool {
        self.system_key() == Some(SystemKey::ReservedOrders)
            || title_matches(self.title.as_deref(), RESERVED_ORDERS_TITLE)
    }

    /// Explicitly flagged, or the bug-report room by key or title
    #[must_use]
    pub fn is_admin_only(&self) -> bool {
        self.config.admin_only() || title_matches(self.title.as_deref(), BUG_REPORTS_TITLE)
    }

    /// Title shown to users
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or_else(|| self.system_key().map(SystemKey::default_title))
            .unwrap_or("")
    }
}

/// Case-insensitive, whitespace-trimmed title comparison
#[must_use]
pub fn title_matches(title: Option<&str>, expected: &str) -> bool {
    title.is_some_and(|t| t.trim().to_lowercase() == expected.to_lowercase())
}
