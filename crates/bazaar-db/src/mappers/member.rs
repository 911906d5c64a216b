//! Membership entity <-> model mapper

use bazaar_core::entities::Membership;

use crate::models::MemberModel;

/// Convert MemberModel to Membership entity
impl From<MemberModel> for Membership {
    fn from(model: MemberModel) -> Self {
        Membership {
            room_id: model.room_id,
            user_id: model.user_id,
            role: model.role.parse().unwrap_or_default(),
            joined_at: model.joined_at,
        }
    }
}
