//! Message entity <-> model mapper

use bazaar_core::entities::Message;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: model.id,
            room_id: model.room_id,
            sender_id: model.sender_id,
            text: model.text,
            meta: model.meta,
            client_msg_id: model.client_msg_id,
            created_at: model.created_at,
        }
    }
}
