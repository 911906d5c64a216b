//! Cart item and reservation <-> model mappers

use bazaar_core::entities::{CartItem, CartLine, Reservation, ReservedOrder};

use crate::models::{CartItemModel, CartLineModel, ReservationModel, ReservedOrderModel};

/// Convert CartItemModel to CartItem entity
impl From<CartItemModel> for CartItem {
    fn from(model: CartItemModel) -> Self {
        CartItem {
            id: model.id,
            user_id: model.user_id,
            catalog_item_id: model.catalog_item_id,
            quantity: model.quantity,
            status: model.status.parse().unwrap_or_default(),
            reserved_sent_at: model.reserved_sent_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<CartLineModel> for CartLine {
    fn from(model: CartLineModel) -> Self {
        CartLine {
            item: CartItem::from(model.item),
            title: model.title,
            product_code: model.product_code,
            price: model.price,
            image_url: model.image_url,
        }
    }
}

/// Convert ReservationModel to Reservation entity
impl From<ReservationModel> for Reservation {
    fn from(model: ReservationModel) -> Self {
        Reservation {
            id: model.id,
            user_id: model.user_id,
            catalog_item_id: model.catalog_item_id,
            cart_item_id: model.cart_item_id,
            quantity: model.quantity,
            is_fulfilled: model.is_fulfilled,
            is_sent: model.is_sent,
            reserved_message_id: model.reserved_message_id,
            sent_at: model.sent_at,
            fulfilled_at: model.fulfilled_at,
            created_at: model.created_at,
        }
    }
}

impl From<ReservedOrderModel> for ReservedOrder {
    fn from(model: ReservedOrderModel) -> Self {
        ReservedOrder {
            reservation: Reservation::from(model.reservation),
            product_code: model.product_code,
            product_title: model.product_title,
            product_description: model.product_description,
            product_price: model.product_price,
            client_name: model.client_name,
            client_phone: model.client_phone,
            shelf_number: model.shelf_number,
        }
    }
}
