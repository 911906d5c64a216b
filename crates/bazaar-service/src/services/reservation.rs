//! Reservation service
//!
//! Dispatch into the reserved-orders room and shelf placement.

use bazaar_core::{Identity, RoomEvent, SystemKey};
use tracing::{info, instrument};

use crate::dto::{DispatchResponse, MarkPlacedRequest, MessageResponse, PlacementResponse};

use super::access::require_staff;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::system_room::SystemRoomService;

/// Reservation service
pub struct ReservationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReservationService<'a> {
    /// Create a new ReservationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post every undispatched reservation into the reserved-orders room
    #[instrument(skip(self))]
    pub async fn dispatch(&self, caller: &Identity) -> ServiceResult<DispatchResponse> {
        require_staff(caller)?;

        let room = SystemRoomService::new(self.ctx).ensure(SystemKey::ReservedOrders).await?;
        let orders = self.ctx.reservation_repo().dispatch(&room).await?;

        let mut messages = Vec::with_capacity(orders.len());
        let mut events = Vec::with_capacity(orders.len());
        for order in &orders {
            let response = MessageResponse::from(&order.message);
            let body = response.to_value();
            events.push(if order.is_new {
                RoomEvent::message_new(room.id, order.message.id, body)
            } else {
                RoomEvent::message_updated(room.id, order.message.id, body)
            });
            messages.push(response);
        }

        info!(room_id = %room.id, dispatched = orders.len(), "Reservations dispatched");
        self.ctx.publish(&events).await;

        Ok(DispatchResponse {
            room_id: room.id,
            dispatched: messages.len(),
            messages,
        })
    }

    /// Mark one reservation as placed on the client's shelf
    ///
    /// Fails with `SHELF_REQUIRED` when the client has no shelf yet and the
    /// request does not supply one.
    #[instrument(skip(self, request))]
    pub async fn mark_placed(&self, request: MarkPlacedRequest, caller: &Identity) -> ServiceResult<PlacementResponse> {
        require_staff(caller)?;

        let target = request.target()?;
        let placement = self
            .ctx
            .reservation_repo()
            .mark_placed(target, request.shelf_number, caller.user_id)
            .await?;

        info!(
            reservation_id = %placement.reservation.id,
            shelf = placement.shelf_number,
            "Reservation placed"
        );

        if let Some(message) = &placement.message {
            let body = MessageResponse::from(message).to_value();
            self.ctx
                .publish(&[RoomEvent::message_updated(message.room_id, message.id, body)])
                .await;
        }

        Ok(PlacementResponse::from(&placement))
    }
}
