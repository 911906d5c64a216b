//! Cart items, reservations, and shelf assignments

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::format_price;
use super::message::{ReservedOrderMeta, SystemMeta};
use crate::error::DomainError;

/// Name written into reservation messages when the staff member has none
pub const DEFAULT_PROCESSOR_NAME: &str = "Staff";

/// Placeholder for missing client details
pub const MISSING_DETAIL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    #[default]
    PendingProcessing,
    Processed,
    InDelivery,
}

impl CartStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingProcessing => "pending_processing",
            Self::Processed => "processed",
            Self::InDelivery => "in_delivery",
        }
    }

    /// Counts toward the processed sum
    #[must_use]
    pub fn is_processed(self) -> bool {
        matches!(self, Self::Processed | Self::InDelivery)
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending_processing" => Ok(Self::PendingProcessing),
            "processed" => Ok(Self::Processed),
            "in_delivery" => Ok(Self::InDelivery),
            other => Err(DomainError::ValidationError(format!("unknown cart status: {other}"))),
        }
    }
}

/// Cart item entity; one per (user, item)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub catalog_item_id: Uuid,
    pub quantity: i32,
    pub status: CartStatus,
    pub reserved_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart item joined with the price of its catalog item
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    pub title: String,
    pub product_code: Option<i32>,
    pub price: f64,
    pub image_url: Option<String>,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.item.quantity)
    }
}

/// Totals over a user's cart
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CartSummary {
    pub total_sum: f64,
    pub processed_sum: f64,
}

impl CartSummary {
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        lines.iter().fold(Self::default(), |mut acc, line| {
            let total = line.line_total();
            acc.total_sum += total;
            if line.item.status.is_processed() {
                acc.processed_sum += total;
            }
            acc
        })
    }

    /// Support reply describing the totals
    #[must_use]
    pub fn reply_text(&self) -> String {
        format!(
            "Сумма корзины: {} RUB. Обработано: {} RUB.",
            format_price(self.total_sum),
            format_price(self.processed_sum)
        )
    }
}

// =============================================================================
// Reservation state machine
// =============================================================================

/// Where a reservation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Cart item written, reservation row not yet created
    CartPending,
    /// Stock taken, cart item pending, not yet seen by staff
    Reserved,
    /// Posted into the operational room
    Dispatched,
    /// Placed on a shelf
    Fulfilled,
    /// Cart item removed and stock restored
    Cancelled,
}

/// Transitions a reservation can undergo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationAction {
    /// Add-to-cart; re-adding the same item restarts the lifecycle
    Reserve,
    Dispatch,
    Place,
    Cancel,
}

impl ReservationState {
    /// Apply `action`, returning the next state or the reason it is refused
    pub fn apply(self, action: ReservationAction) -> Result<Self, DomainError> {
        use ReservationAction as A;
        use ReservationState as S;

        match (self, action) {
            (S::Cancelled, _) => Err(DomainError::ReservationNotFound),
            (_, A::Reserve) => Ok(S::Reserved),
            (S::CartPending, A::Cancel) => Ok(S::Cancelled),
            (S::CartPending, _) => Err(DomainError::ReservationNotFound),
            (S::Reserved, A::Dispatch) => Ok(S::Dispatched),
            (S::Reserved | S::Dispatched, A::Place) => Ok(S::Fulfilled),
            (S::Reserved, A::Cancel) => Ok(S::Cancelled),
            (S::Dispatched, A::Dispatch) => Err(DomainError::AlreadyDispatched),
            (S::Dispatched, A::Cancel) => Err(DomainError::NotCancellable),
            (S::Fulfilled, A::Cancel) => Err(DomainError::NotCancellable),
            (S::Fulfilled, _) => Err(DomainError::AlreadyProcessed),
        }
    }
}

/// Reservation entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
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

impl Reservation {
    #[must_use]
    pub fn state(&self) -> ReservationState {
        if self.is_fulfilled {
            ReservationState::Fulfilled
        } else if self.is_sent {
            ReservationState::Dispatched
        } else {
            ReservationState::Reserved
        }
    }
}

/// A cart item may be cancelled only while pending and not yet dispatched
pub fn ensure_cancellable(cart: &CartItem, reservation: Option<&Reservation>) -> Result<(), DomainError> {
    if cart.status != CartStatus::PendingProcessing {
        return Err(DomainError::NotCancellable);
    }
    if let Some(reservation) = reservation {
        reservation.state().apply(ReservationAction::Cancel)?;
    }
    Ok(())
}

/// Snapshot used to render a dispatched reservation
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedOrder {
    pub reservation: Reservation,
    pub product_code: Option<i32>,
    pub product_title: String,
    pub product_description: Option<String>,
    pub product_price: f64,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub shelf_number: Option<i32>,
}

impl ReservedOrder {
    #[must_use]
    pub fn message_text(&self) -> String {
        let mut lines = vec![format!("📦 {}", self.product_title)];
        if let Some(description) = self
            .product_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            lines.push(format!("Описание: {description}"));
        }
        lines.push(format!("Клиент: {}", detail_or_dash(self.client_name.as_deref())));
        lines.push(format!("Телефон: {}", detail_or_dash(self.client_phone.as_deref())));
        lines.push(format!(
            "ID товара: {}",
            self.product_code.map_or_else(|| MISSING_DETAIL.to_string(), |c| c.to_string())
        ));
        lines.push(format!("Цена: {} RUB", format_price(self.product_price)));
        lines.push(format!("Куплено: {}", self.reservation.quantity));
        lines.push(format!(
            "Полка: {}",
            self.shelf_number.map_or_else(|| "не назначена".to_string(), |s| s.to_string())
        ));
        lines.push("Статус: ожидание обработки".to_string());
        lines.join("\n")
    }

    #[must_use]
    pub fn message_meta(&self) -> SystemMeta {
        SystemMeta::ReservedOrderItem(ReservedOrderMeta {
            reservation_id: self.reservation.id,
            cart_item_id: self.reservation.cart_item_id,
            user_id: self.reservation.user_id,
            product_id: self.reservation.catalog_item_id,
            product_code: self.product_code,
            product_title: self.product_title.clone(),
            product_description: self.product_description.clone(),
            product_price: self.product_price,
            quantity: self.reservation.quantity,
            client_name: detail_or_dash(self.client_name.as_deref()).to_string(),
            client_phone: detail_or_dash(self.client_phone.as_deref()).to_string(),
            shelf_number: self.shelf_number,
            placed: false,
            processed_by_id: None,
            processed_by_name: None,
        })
    }
}

fn detail_or_dash(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(MISSING_DETAIL)
}

/// Name recorded as the processor of a reservation
#[must_use]
pub fn processor_name(name: Option<&str>, email: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| email.map(str::trim).filter(|e| !e.is_empty()))
        .unwrap_or(DEFAULT_PROCESSOR_NAME)
        .to_string()
}

// =============================================================================
// Shelves
// =============================================================================

/// One shelf per user, assigned on first fulfillment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfAssignment {
    pub user_id: Uuid,
    pub shelf_number: i32,
}

/// Outcome of resolving the shelf for a fulfillment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfResolution {
    /// The user already has this shelf
    Existing(i32),
    /// Assign this shelf to the user
    Assign(i32),
}

impl ShelfResolution {
    #[must_use]
    pub fn number(self) -> i32 {
        match self {
            Self::Existing(n) | Self::Assign(n) => n,
        }
    }
}

/// Reuse the user's shelf, or take the one supplied by staff
///
/// With neither available the caller must ask for a shelf number.
pub fn resolve_shelf(existing: Option<i32>, supplied: Option<i32>) -> Result<ShelfResolution, DomainError> {
    match (existing, supplied) {
        (Some(shelf), _) => Ok(ShelfResolution::Existing(shelf)),
        (None, Some(shelf)) if shelf > 0 => Ok(ShelfResolution::Assign(shelf)),
        (None, _) => Err(DomainError::ShelfRequired),
    }
}
