//! Catalog items and the publication queue

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::message::{CatalogProductMeta, SystemMeta};
use crate::error::DomainError;

/// Default cooldown before an archived item's code can be handed out again
pub const DEFAULT_CODE_REUSE_DAYS: i64 = 60;

/// Lifecycle status of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ItemStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::ValidationError(format!("unknown item status: {other}"))),
        }
    }
}

/// Catalog item entity
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: Uuid,
    pub code: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub status: ItemStatus,
    pub reusable_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    #[inline]
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ItemStatus::Published
    }

    /// Text of the catalog post for this item
    #[must_use]
    pub fn listing_text(&self) -> String {
        let code = self.code.map_or_else(|| "—".to_string(), |c| c.to_string());
        let mut lines = vec![format!("🛒 {}", self.title)];
        if let Some(description) = self.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            lines.push(description.to_string());
        }
        lines.push(format!("ID товара: {code}"));
        lines.push(format!("Цена: {} RUB", format_price(self.price)));
        lines.push(format!("Количество в наличии: {}", self.quantity));
        lines.push("Нажмите \"Купить\", чтобы добавить в корзину".to_string());
        lines.join("\n")
    }

    /// Metadata of the catalog post for this item
    #[must_use]
    pub fn listing_meta(&self) -> SystemMeta {
        SystemMeta::CatalogProduct(CatalogProductMeta {
            product_id: self.id,
            product_code: self.code,
            price: self.price,
            quantity: self.quantity,
            image_url: self.image_url.clone(),
        })
    }

    /// Merge the current listing fields into an existing post's metadata
    ///
    /// Keys the listing does not own, such as the hidden-for list, are kept.
    #[must_use]
    pub fn refresh_listing_meta(&self, existing: &Value) -> Value {
        let mut map = existing.as_object().cloned().unwrap_or_default();
        if let Value::Object(fresh) = self.listing_meta().to_value() {
            map.extend(fresh);
        }
        Value::Object(map)
    }

    /// Validate that `requested` units can be taken from this item right now
    pub fn ensure_available(&self, requested: i32) -> Result<(), DomainError> {
        if !self.is_published() {
            return Err(DomainError::ItemNotAvailable);
        }
        check_stock(self.quantity, requested)
    }
}

/// Stock check shared by every flow that takes units
pub fn check_stock(available: i32, requested: i32) -> Result<(), DomainError> {
    if requested <= 0 {
        return Err(DomainError::ValidationError("quantity must be positive".into()));
    }
    if available <= 0 || requested > available {
        return Err(DomainError::OutOfStock {
            available: available.max(0),
            requested,
        });
    }
    Ok(())
}

/// Instant at which an item archived at `archived_at` releases its code
#[must_use]
pub fn code_reusable_at(archived_at: DateTime<Utc>, cooldown_days: i64) -> DateTime<Utc> {
    archived_at + Duration::days(cooldown_days)
}

/// Whole prices render without a fractional part
#[must_use]
pub fn format_price(price: f64) -> String {
    if price.fract().abs() < f64::EPSILON && price.abs() < 1e15 {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

// =============================================================================
// Queue
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    #[default]
    Pending,
    Published,
}

impl QueueStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Published => "published",
        }
    }
}

impl FromStr for QueueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "published" => Ok(Self::Published),
            other => Err(DomainError::ValidationError(format!("unknown queue status: {other}"))),
        }
    }
}

/// Snapshot of the submitted fields, applied to the item on publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuePayload {
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl QueuePayload {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::ValidationError("title is required".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::ValidationError("price must be a non-negative number".into()));
        }
        if self.quantity <= 0 {
            return Err(DomainError::ValidationError("quantity must be a positive integer".into()));
        }
        if self.image_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(DomainError::ValidationError("image is required".into()));
        }
        Ok(())
    }
}

/// Pending publication of a catalog item into a room
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
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
