//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use bazaar_core::entities::{
    CartItem, CartLine, CatalogItem, Membership, Message, QueueEntry, Reservation, Room,
};
use bazaar_core::traits::{Placement, PublishedEntry, RoomListing};
use bazaar_core::AccessDecision;
use serde_json::Value;

use super::responses::{
    CartItemResponse, CartLineResponse, CatalogItemResponse, MemberResponse, MessageResponse,
    PlacementResponse, PublishedEntryResponse, QueueEntryResponse, ReservationResponse,
    RoomResponse, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&bazaar_core::User> for UserResponse {
    fn from(user: &bazaar_core::User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Room Mappers
// ============================================================================

impl From<&Room> for RoomResponse {
    fn from(room: &Room) -> Self {
        let shared = room.config.shared();
        Self {
            id: room.id,
            title: room.title.clone(),
            kind: room.kind,
            system_key: room.system_key(),
            visibility: room.visibility(),
            admin_only: room.is_admin_only(),
            is_post_channel: room.config.is_post_channel(),
            description: shared.description.clone(),
            avatar: shared.avatar.clone(),
            member_role: None,
            can_read: false,
            can_post: false,
            last_message: None,
            created_at: room.created_at,
            updated_at: room.updated_at,
        }
    }
}

impl RoomResponse {
    /// Listing row with the viewer's membership and access
    #[must_use]
    pub fn from_listing(listing: &RoomListing, decision: AccessDecision) -> Self {
        let mut response = Self::from(&listing.room).with_access(decision);
        response.member_role = listing.membership;
        response
    }
}

impl From<&Membership> for MemberResponse {
    fn from(m: &Membership) -> Self {
        Self {
            room_id: m.room_id,
            user_id: m.user_id,
            role: m.role,
            joined_at: m.joined_at,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        let meta = match &message.meta {
            Value::Object(map) => {
                let mut map = map.clone();
                map.remove("hidden_for");
                Value::Object(map)
            }
            _ => Value::Object(serde_json::Map::new()),
        };

        Self {
            id: message.id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            text: message.text.clone(),
            kind: message.kind().map(ToString::to_string),
            meta,
            client_msg_id: message.client_msg_id.clone(),
            edited: message.is_edited(),
            created_at: message.created_at,
        }
    }
}

impl MessageResponse {
    /// Body carried by message events
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ============================================================================
// Catalog Mappers
// ============================================================================

impl From<&CatalogItem> for CatalogItemResponse {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            code: item.code,
            title: item.title.clone(),
            description: item.description.clone(),
            price: item.price,
            quantity: item.quantity,
            image_url: item.image_url.clone(),
            status: item.status,
            reusable_at: item.reusable_at,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<&QueueEntry> for QueueEntryResponse {
    fn from(entry: &QueueEntry) -> Self {
        Self {
            id: entry.id,
            catalog_item_id: entry.catalog_item_id,
            room_id: entry.room_id,
            queued_by: entry.queued_by,
            status: entry.status,
            payload: entry.payload.clone(),
            published_message_id: entry.published_message_id,
            approved_by: entry.approved_by,
            approved_at: entry.approved_at,
            created_at: entry.created_at,
        }
    }
}

impl From<&PublishedEntry> for PublishedEntryResponse {
    fn from(published: &PublishedEntry) -> Self {
        Self {
            queue_id: published.entry.id,
            item: CatalogItemResponse::from(&published.item),
            message: MessageResponse::from(&published.message),
        }
    }
}

// ============================================================================
// Cart Mappers
// ============================================================================

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            catalog_item_id: item.catalog_item_id,
            quantity: item.quantity,
            status: item.status,
            reserved_sent_at: item.reserved_sent_at,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            item: CartItemResponse::from(&line.item),
            title: line.title.clone(),
            product_code: line.product_code,
            price: line.price,
            image_url: line.image_url.clone(),
            line_total: line.line_total(),
        }
    }
}

impl From<&Reservation> for ReservationResponse {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            catalog_item_id: r.catalog_item_id,
            cart_item_id: r.cart_item_id,
            quantity: r.quantity,
            state: r.state(),
            is_sent: r.is_sent,
            is_fulfilled: r.is_fulfilled,
            reserved_message_id: r.reserved_message_id,
            sent_at: r.sent_at,
            fulfilled_at: r.fulfilled_at,
            created_at: r.created_at,
        }
    }
}

impl From<&Placement> for PlacementResponse {
    fn from(p: &Placement) -> Self {
        Self {
            reservation: ReservationResponse::from(&p.reservation),
            shelf_number: p.shelf_number,
            message_id: p.message.as_ref().map(|m| m.id),
        }
    }
}
