//! Cart service
//!
//! Adding to and cancelling from the cart, each with its reservation and the
//! live catalog post kept in step.

use bazaar_core::entities::CartSummary;
use bazaar_core::{Identity, RoomEvent};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{
    AddToCartRequest, AddToCartResponse, CancelCartResponse, CartItemResponse, CartLineResponse, CartResponse,
    MessageResponse, ReservationResponse, SetCartStatusRequest,
};

use super::access::require_staff;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Cart service
pub struct CartService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CartService<'a> {
    /// Create a new CartService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reserve stock for the caller
    #[instrument(skip(self, request))]
    pub async fn add(&self, request: AddToCartRequest, caller: &Identity) -> ServiceResult<AddToCartResponse> {
        let update = self
            .ctx
            .cart_repo()
            .add(caller.user_id, request.item_id, request.quantity)
            .await?;

        info!(
            item_id = %request.item_id,
            cart_item_id = %update.cart_item.id,
            quantity = request.quantity,
            available = update.item.quantity,
            "Added to cart"
        );

        if let Some(message) = &update.catalog_message {
            let body = MessageResponse::from(message).to_value();
            self.ctx
                .publish(&[RoomEvent::message_updated(message.room_id, message.id, body)])
                .await;
        }

        Ok(AddToCartResponse {
            cart_item: CartItemResponse::from(&update.cart_item),
            reservation: ReservationResponse::from(&update.reservation),
            available: update.item.quantity,
        })
    }

    /// Cancel a cart item that staff has not seen yet
    #[instrument(skip(self))]
    pub async fn cancel(&self, cart_item_id: Uuid, caller: &Identity) -> ServiceResult<CancelCartResponse> {
        let cancellation = self.ctx.cart_repo().cancel(caller.user_id, cart_item_id).await?;

        info!(cart_item_id = %cart_item_id, available = cancellation.item.quantity, "Cart item cancelled");

        let mut events = Vec::with_capacity(2);
        if let Some(message) = &cancellation.catalog_message {
            let body = MessageResponse::from(message).to_value();
            events.push(RoomEvent::message_updated(message.room_id, message.id, body));
        }
        if let Some(removed) = &cancellation.removed_message {
            events.push(RoomEvent::message_deleted(removed.room_id, removed.id));
        }
        self.ctx.publish(&events).await;

        Ok(CancelCartResponse {
            cart_item_id: cancellation.cart_item_id,
            available: cancellation.item.quantity,
        })
    }

    /// The caller's cart with totals
    #[instrument(skip(self))]
    pub async fn list(&self, caller: &Identity) -> ServiceResult<CartResponse> {
        let lines = self.ctx.cart_repo().list(caller.user_id).await?;
        let summary = CartSummary::from_lines(&lines);

        Ok(CartResponse {
            items: lines.iter().map(CartLineResponse::from).collect(),
            total_sum: summary.total_sum,
            processed_sum: summary.processed_sum,
        })
    }

    /// Move a cart item along its delivery status (admin/creator)
    #[instrument(skip(self, request))]
    pub async fn set_status(
        &self,
        cart_item_id: Uuid,
        request: SetCartStatusRequest,
        caller: &Identity,
    ) -> ServiceResult<CartItemResponse> {
        require_staff(caller)?;

        let item = self.ctx.cart_repo().set_status(cart_item_id, request.status).await?;
        info!(cart_item_id = %cart_item_id, status = request.status.as_str(), "Cart item status changed");

        Ok(CartItemResponse::from(&item))
    }
}
