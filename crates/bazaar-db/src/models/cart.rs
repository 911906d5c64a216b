//! Cart, reservation, and shelf database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for cart_items table
#[derive(Debug, Clone, FromRow)]
pub struct CartItemModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub catalog_item_id: Uuid,
    pub quantity: i32,
    pub status: String,
    pub reserved_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cart item joined with its catalog item
#[derive(Debug, Clone, FromRow)]
pub struct CartLineModel {
    #[sqlx(flatten)]
    pub item: CartItemModel,
    pub title: String,
    pub product_code: Option<i32>,
    pub price: f64,
    pub image_url: Option<String>,
}

/// Database model for reservations table
#[derive(Debug, Clone, FromRow)]
pub struct ReservationModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub catalog_item_id: Uuid,
    pub cart_item_id: Option<Uuid>,
    pub quantity: i32,
    pub is_fulfilled: bool,
    pub is_sent: bool,
    pub reserved_message_id: Option<Uuid>,
    pub sent_at: Option<DateTime<Utc>>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Undispatched reservation joined with the product, client, and shelf
#[derive(Debug, Clone, FromRow)]
pub struct ReservedOrderModel {
    #[sqlx(flatten)]
    pub reservation: ReservationModel,
    pub product_code: Option<i32>,
    pub product_title: String,
    pub product_description: Option<String>,
    pub product_price: f64,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub shelf_number: Option<i32>,
}
