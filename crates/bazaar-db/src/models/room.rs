//! Room database models

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for rooms table
#[derive(Debug, Clone, FromRow)]
pub struct RoomModel {
    pub id: Uuid,
    pub title: Option<String>,
    pub kind: String,
    pub created_by: Option<Uuid>,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomModel {
    /// `settings.system_key` as stored, if any
    pub fn system_key(&self) -> Option<&str> {
        self.settings.get("system_key").and_then(Value::as_str)
    }
}

/// A room joined with one viewer's membership
#[derive(Debug, Clone, FromRow)]
pub struct RoomListingModel {
    #[sqlx(flatten)]
    pub room: RoomModel,
    pub member_role: Option<String>,
    pub has_members: bool,
}

/// Aggregated channel counters
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ChannelStatsModel {
    pub member_count: i64,
    pub message_count: i64,
    pub pending_queue: i64,
}
