//! Catalog and publication queue database models

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for catalog_items table
#[derive(Debug, Clone, FromRow)]
pub struct CatalogItemModel {
    pub id: Uuid,
    pub code: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub status: String,
    pub reusable_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for publish_queue table
#[derive(Debug, Clone, FromRow)]
pub struct QueueEntryModel {
    pub id: Uuid,
    pub catalog_item_id: Uuid,
    pub room_id: Uuid,
    pub queued_by: Option<Uuid>,
    pub status: String,
    pub payload: Value,
    pub published_message_id: Option<Uuid>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
