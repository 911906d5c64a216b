//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use bazaar_core::entities::{CartStatus, ChannelPatch, DeleteScope, QueuePayload, Visibility};
use bazaar_core::traits::{PlacementTarget, PublishSelection};
use bazaar_core::{DomainError, MemberRole, Role};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

fn default_quantity() -> i32 {
    1
}

// ============================================================================
// Room Requests
// ============================================================================

/// Create a direct or group chat
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(max = 100, message = "Title must be at most 100 characters"))]
    pub title: Option<String>,

    /// Users to add besides the caller
    #[validate(length(min = 1, max = 100, message = "A room needs 1-100 members"))]
    pub members: Vec<Uuid>,
}

/// Create a channel
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel title must be 1-100 characters"))]
    pub title: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Update channel settings; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateChannelRequest {
    #[validate(length(min = 1, max = 100, message = "Channel title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub visibility: Option<Visibility>,

    pub admin_only: Option<bool>,

    #[validate(length(max = 2048, message = "Avatar URL must be at most 2048 characters"))]
    pub avatar_url: Option<String>,

    pub avatar_focus_x: Option<f64>,
    pub avatar_focus_y: Option<f64>,
    pub avatar_zoom: Option<f64>,
}

impl From<UpdateChannelRequest> for ChannelPatch {
    fn from(req: UpdateChannelRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            visibility: req.visibility,
            admin_only: req.admin_only,
            avatar_url: req.avatar_url,
            avatar_focus_x: req.avatar_focus_x,
            avatar_focus_y: req.avatar_focus_y,
            avatar_zoom: req.avatar_zoom,
        }
    }
}

/// Add a room member
#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: MemberRole,
}

/// Change a member's room role
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: MemberRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlacklistAction {
    Add,
    Remove,
}

/// Add or remove a blacklist entry
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BlacklistRequest {
    pub user_id: Uuid,
    pub action: BlacklistAction,
    /// Stored trimmed and cut to 240 characters
    #[validate(length(max = 2000, message = "Reason must be at most 2000 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Message history page
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MessagesQuery {
    /// Only messages created before this instant
    pub before: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 200, message = "Limit must be between 1 and 200"))]
    pub limit: Option<i64>,
}

/// Post a message
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub text: String,

    /// Idempotency key; repeating it returns the original message
    #[validate(length(min = 1, max = 128, message = "Client message id must be 1-128 characters"))]
    pub client_msg_id: Option<String>,
}

/// Edit a message
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DeleteMessageQuery {
    #[serde(default)]
    pub scope: DeleteScope,
}

// ============================================================================
// Catalog Requests
// ============================================================================

/// Offer a catalog item for publication
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitCatalogItemRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 2048, message = "Image is required"))]
    pub image_url: String,

    /// Room the item should be posted into
    pub room_id: Uuid,
}

impl SubmitCatalogItemRequest {
    #[must_use]
    pub fn payload(&self) -> QueuePayload {
        QueuePayload {
            title: self.title.trim().to_string(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(ToString::to_string),
            price: self.price,
            quantity: self.quantity,
            image_url: Some(self.image_url.trim().to_string()),
        }
    }
}

/// Publish pending entries, either every entry of a room or exactly the listed ones
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishQueueRequest {
    pub room_id: Option<Uuid>,
    #[serde(default)]
    pub queue_ids: Vec<Uuid>,
}

impl TryFrom<PublishQueueRequest> for PublishSelection {
    type Error = DomainError;

    fn try_from(req: PublishQueueRequest) -> Result<Self, Self::Error> {
        if !req.queue_ids.is_empty() {
            return Ok(Self::Entries(req.queue_ids));
        }
        req.room_id
            .map(Self::Room)
            .ok_or_else(|| DomainError::ValidationError("room_id or queue_ids is required".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingQueueQuery {
    pub room_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchCatalogQuery {
    /// Title fragment or item code; blank yields no results
    #[serde(default)]
    #[validate(length(max = 100, message = "Query must be at most 100 characters"))]
    pub q: String,
}

// ============================================================================
// Cart Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub item_id: Uuid,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 10000, message = "Quantity must be between 1 and 10000"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetCartStatusRequest {
    pub status: CartStatus,
}

/// Put a dispatched reservation on the client's shelf
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MarkPlacedRequest {
    pub reservation_id: Option<Uuid>,
    pub cart_item_id: Option<Uuid>,

    /// Needed only when the client has no shelf yet
    #[validate(range(min = 1, max = 100_000, message = "Shelf number must be positive"))]
    pub shelf_number: Option<i32>,
}

impl MarkPlacedRequest {
    /// The reservation id wins when both ids are present
    pub fn target(&self) -> Result<PlacementTarget, DomainError> {
        match (self.reservation_id, self.cart_item_id) {
            (Some(id), _) => Ok(PlacementTarget::Reservation(id)),
            (None, Some(id)) => Ok(PlacementTarget::CartItem(id)),
            (None, None) => Err(DomainError::ValidationError(
                "reservation_id or cart_item_id is required".into(),
            )),
        }
    }
}

// ============================================================================
// Support and User Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BugReportRequest {
    #[validate(length(min = 1, max = 5000, message = "Report must be 1-5000 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetUserRoleRequest {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::entities::MESSAGE_TEXT_MAX;

    fn submission() -> SubmitCatalogItemRequest {
        SubmitCatalogItemRequest {
            title: "  Lamp ".into(),
            description: Some("   ".into()),
            price: 10.0,
            quantity: 2,
            image_url: "https://cdn/lamp.png".into(),
            room_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_submission_validation() {
        assert!(submission().validate().is_ok());

        let mut bad = submission();
        bad.price = -1.0;
        assert!(bad.validate().is_err());

        let mut bad = submission();
        bad.quantity = 0;
        assert!(bad.validate().is_err());

        let mut bad = submission();
        bad.image_url = String::new();
        assert!(bad.validate().is_err());

        let mut bad = submission();
        bad.title = "x".repeat(201);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_submission_payload_is_trimmed() {
        let payload = submission().payload();
        assert_eq!(payload.title, "Lamp");
        assert!(payload.description.is_none());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let req: AddToCartRequest =
            serde_json::from_value(serde_json::json!({ "item_id": Uuid::new_v4() })).unwrap();
        assert_eq!(req.quantity, 1);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_message_length() {
        let ok = CreateMessageRequest {
            text: "hi".into(),
            client_msg_id: None,
        };
        assert!(ok.validate().is_ok());

        let long = CreateMessageRequest {
            text: "x".repeat(MESSAGE_TEXT_MAX + 1),
            client_msg_id: None,
        };
        assert!(long.validate().is_err());

        let empty = UpdateMessageRequest { text: String::new() };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_publish_selection() {
        let room = Uuid::new_v4();
        let ids = vec![Uuid::new_v4()];

        let by_ids = PublishQueueRequest {
            room_id: Some(room),
            queue_ids: ids.clone(),
        };
        assert_eq!(PublishSelection::try_from(by_ids).unwrap(), PublishSelection::Entries(ids));

        let by_room = PublishQueueRequest {
            room_id: Some(room),
            queue_ids: vec![],
        };
        assert_eq!(PublishSelection::try_from(by_room).unwrap(), PublishSelection::Room(room));

        assert!(PublishSelection::try_from(PublishQueueRequest::default()).is_err());
    }

    #[test]
    fn test_mark_placed_target() {
        let cart = Uuid::new_v4();
        let req = MarkPlacedRequest {
            cart_item_id: Some(cart),
            ..MarkPlacedRequest::default()
        };
        assert_eq!(req.target().unwrap(), PlacementTarget::CartItem(cart));
        assert!(MarkPlacedRequest::default().target().is_err());

        let bad_shelf = MarkPlacedRequest {
            cart_item_id: Some(cart),
            shelf_number: Some(0),
            ..MarkPlacedRequest::default()
        };
        assert!(bad_shelf.validate().is_err());
    }
}
