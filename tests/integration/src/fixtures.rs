//! Test fixtures and data generators
//!
//! Provides reusable request bodies and the response shapes tests read back.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreateChannelRequest {
    pub title: String,
    pub visibility: String,
    pub description: Option<String>,
}

impl CreateChannelRequest {
    pub fn public() -> Self {
        Self {
            title: format!("Channel {}", unique_suffix()),
            visibility: "public".to_string(),
            description: None,
        }
    }

    pub fn private() -> Self {
        Self {
            visibility: "private".to_string(),
            ..Self::public()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRoomRequest {
    pub title: Option<String>,
    pub members: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreateMessageRequest {
    pub text: String,
    pub client_msg_id: Option<String>,
}

impl CreateMessageRequest {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            client_msg_id: None,
        }
    }

    pub fn idempotent(text: &str) -> Self {
        Self {
            text: text.to_string(),
            client_msg_id: Some(format!("cm-{}", Uuid::new_v4())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitCatalogItemRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: String,
    pub room_id: Uuid,
}

impl SubmitCatalogItemRequest {
    pub fn new(room_id: Uuid, quantity: i32) -> Self {
        Self {
            title: format!("Item {}", unique_suffix()),
            description: Some("Test item".to_string()),
            price: 250.0,
            quantity,
            image_url: "https://img.example.com/item.png".to_string(),
            room_id,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PublishQueueRequest {
    pub room_id: Option<Uuid>,
    pub queue_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AddToCartRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Default, Serialize)]
pub struct MarkPlacedRequest {
    pub reservation_id: Option<Uuid>,
    pub cart_item_id: Option<Uuid>,
    pub shelf_number: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct BugReportRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SetUserRoleRequest {
    pub role: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub kind: String,
    pub system_key: Option<String>,
    pub can_read: bool,
    pub can_post: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub text: String,
    pub kind: Option<String>,
    pub meta: serde_json::Value,
    pub edited: bool,
}

#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct PostRoomResponse {
    pub id: Uuid,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueEntryResponse {
    pub id: Uuid,
    pub catalog_item_id: Uuid,
    pub room_id: Uuid,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItemResponse {
    pub id: Uuid,
    pub code: Option<i32>,
    pub title: String,
    pub quantity: i32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct PublishedEntryResponse {
    pub queue_id: Uuid,
    pub item: CatalogItemResponse,
    pub message: MessageResponse,
}

#[derive(Debug, Deserialize)]
pub struct PublishResponse {
    pub published: Vec<PublishedEntryResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub catalog_item_id: Uuid,
    pub quantity: i32,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub quantity: i32,
    pub is_sent: bool,
    pub is_fulfilled: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartResponse {
    pub cart_item: CartItemResponse,
    pub reservation: ReservationResponse,
    pub available: i32,
}

#[derive(Debug, Deserialize)]
pub struct CartSummaryResponse {
    pub total_sum: f64,
    pub processed_sum: f64,
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct DispatchResponse {
    pub room_id: Uuid,
    pub dispatched: usize,
}

#[derive(Debug, Deserialize)]
pub struct PlacementResponse {
    pub reservation: ReservationResponse,
    pub shelf_number: i32,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}
