//! Room entity <-> model mapper

use bazaar_core::entities::{Room, RoomConfig};
use bazaar_core::traits::{ChannelStats, RoomListing};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{ChannelStatsModel, RoomListingModel, RoomModel};

/// Convert RoomModel to Room entity
///
/// Settings are parsed leniently; unknown keys survive in the config.
impl From<RoomModel> for Room {
    fn from(model: RoomModel) -> Self {
        Room {
            id: model.id,
            title: model.title,
            kind: model.kind.parse().unwrap_or_default(),
            created_by: model.created_by,
            config: RoomConfig::from_settings(&model.settings),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<RoomListingModel> for RoomListing {
    fn from(model: RoomListingModel) -> Self {
        RoomListing {
            room: Room::from(model.room),
            membership: model.member_role.and_then(|r| r.parse().ok()),
            has_members: model.has_members,
        }
    }
}

impl From<ChannelStatsModel> for ChannelStats {
    fn from(model: ChannelStatsModel) -> Self {
        ChannelStats {
            member_count: model.member_count,
            message_count: model.message_count,
            pending_queue: model.pending_queue,
        }
    }
}

/// Convert Room entity reference to values for database insertion/update
pub struct RoomInsert<'a> {
    pub id: Uuid,
    pub title: Option<&'a str>,
    pub kind: &'static str,
    pub created_by: Option<Uuid>,
    pub settings: Value,
}

impl<'a> RoomInsert<'a> {
    pub fn new(room: &'a Room) -> Self {
        Self {
            id: room.id,
            title: room.title.as_deref(),
            kind: room.kind.as_str(),
            created_by: room.created_by,
            settings: room.config.to_settings(),
        }
    }
}
