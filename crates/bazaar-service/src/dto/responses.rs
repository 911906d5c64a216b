//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use bazaar_core::entities::{
    AvatarSettings, BlacklistEntry, CartStatus, ItemStatus, QueuePayload, QueueStatus,
    ReservationState, RoomKind, SystemKey, Visibility,
};
use bazaar_core::{AccessDecision, MemberRole, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Room Responses
// ============================================================================

/// A room as one viewer sees it
#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub kind: RoomKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_key: Option<SystemKey>,
    pub visibility: Visibility,
    pub admin_only: bool,
    pub is_post_channel: bool,
    pub description: Option<String>,
    pub avatar: AvatarSettings,
    pub member_role: Option<MemberRole>,
    pub can_read: bool,
    pub can_post: bool,
    pub last_message: Option<MessageResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomResponse {
    #[must_use]
    pub fn with_access(mut self, decision: AccessDecision) -> Self {
        self.can_read = decision.can_read;
        self.can_post = decision.can_post;
        self
    }

    #[must_use]
    pub fn with_last_message(mut self, message: Option<MessageResponse>) -> Self {
        self.last_message = message;
        self
    }
}

/// Staff view of a channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelOverviewResponse {
    pub room: RoomResponse,
    pub member_count: i64,
    pub message_count: i64,
    pub pending_queue: i64,
    pub blacklist: Vec<BlacklistEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub text: String,
    /// `meta.kind` of system messages
    pub kind: Option<String>,
    /// Metadata without the per-user hidden list
    pub meta: Value,
    pub client_msg_id: Option<String>,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Catalog Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CatalogItemResponse {
    pub id: Uuid,
    pub code: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub status: ItemStatus,
    pub reusable_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueEntryResponse {
    pub id: Uuid,
    pub catalog_item_id: Uuid,
    pub room_id: Uuid,
    pub queued_by: Option<Uuid>,
    pub status: QueueStatus,
    pub payload: QueuePayload,
    pub published_message_id: Option<Uuid>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedEntryResponse {
    pub queue_id: Uuid,
    pub item: CatalogItemResponse,
    pub message: MessageResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishResponse {
    pub published: Vec<PublishedEntryResponse>,
}

/// Rooms a worker may submit catalog items to
#[derive(Debug, Clone, Serialize)]
pub struct PostRoomResponse {
    pub id: Uuid,
    pub title: Option<String>,
}

// ============================================================================
// Cart Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub catalog_item_id: Uuid,
    pub quantity: i32,
    pub status: CartStatus,
    pub reserved_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLineResponse {
    #[serde(flatten)]
    pub item: CartItemResponse,
    pub title: String,
    pub product_code: Option<i32>,
    pub price: f64,
    pub image_url: Option<String>,
    pub line_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total_sum: f64,
    pub processed_sum: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub catalog_item_id: Uuid,
    pub cart_item_id: Option<Uuid>,
    pub quantity: i32,
    pub state: ReservationState,
    pub is_sent: bool,
    pub is_fulfilled: bool,
    pub reserved_message_id: Option<Uuid>,
    pub sent_at: Option<DateTime<Utc>>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddToCartResponse {
    pub cart_item: CartItemResponse,
    pub reservation: ReservationResponse,
    /// Stock left on the item after this reservation
    pub available: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelCartResponse {
    pub cart_item_id: Uuid,
    pub available: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartSummaryResponse {
    pub total_sum: f64,
    pub processed_sum: f64,
    pub reply: String,
}

// ============================================================================
// Reservation Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    pub room_id: Uuid,
    pub dispatched: usize,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacementResponse {
    pub reservation: ReservationResponse,
    pub shelf_number: i32,
    pub message_id: Option<Uuid>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}
