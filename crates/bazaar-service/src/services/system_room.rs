//! System room service
//!
//! Keeps the main channel, the reserved-orders room, and the bug-report room
//! present and correctly staffed.

use bazaar_core::traits::Reconciled;
use bazaar_core::{Room, RoomEvent, SystemKey};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// System room service
pub struct SystemRoomService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SystemRoomService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Startup pass: tag legacy rooms once, then reconcile every key
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> ServiceResult<Vec<Room>> {
        let tagged = self.ctx.system_room_repo().backfill_keys().await?;
        if tagged > 0 {
            info!(tagged, "Backfilled system keys onto legacy rooms");
        }

        let mut rooms = Vec::with_capacity(SystemKey::ALL.len());
        for key in SystemKey::ALL {
            let Reconciled { room, created } = self.ctx.system_room_repo().reconcile(key).await?;
            info!(key = key.as_str(), room_id = %room.id, created, "System room reconciled");
            rooms.push(room);
        }
        Ok(rooms)
    }

    /// The room for `key`, reconciled on every call
    ///
    /// Users can gain or lose staff roles outside this service, so the
    /// configuration and staff membership are re-applied each time.
    #[instrument(skip(self))]
    pub async fn ensure(&self, key: SystemKey) -> ServiceResult<Room> {
        let Reconciled { room, created } = self.ctx.system_room_repo().reconcile(key).await?;
        if created {
            info!(key = key.as_str(), room_id = %room.id, "System room recreated");
            self.ctx.publish(&[RoomEvent::room_created(room.id, room.kind)]).await;
        }
        Ok(room)
    }

    /// Re-run staff reconciliation after a role change
    #[instrument(skip(self))]
    pub async fn sync_staff(&self) -> ServiceResult<()> {
        let mut events = Vec::with_capacity(SystemKey::ALL.len());
        for key in SystemKey::ALL {
            let Reconciled { room, created } = self.ctx.system_room_repo().reconcile(key).await?;
            events.push(if created {
                RoomEvent::room_created(room.id, room.kind)
            } else {
                RoomEvent::room_updated(room.id, room.kind)
            });
        }
        self.ctx.publish(&events).await;
        Ok(())
    }
}
